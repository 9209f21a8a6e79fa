mod traits;
pub mod types;

pub use traits::{ExecutionEngine, Notifier};
pub use types::SessionRun;
