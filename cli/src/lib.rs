//! sessionctl CLI library, exposed for unit tests.

pub mod commands;
pub mod error;
