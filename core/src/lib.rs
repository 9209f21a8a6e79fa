pub mod api;
pub mod bus;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod events_out;
pub mod runner;
pub mod session;
pub mod state;
