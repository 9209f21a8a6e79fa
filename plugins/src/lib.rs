pub mod engine;
pub mod factory;
pub mod notifier;
pub mod services;
