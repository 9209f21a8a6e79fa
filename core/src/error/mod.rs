#[allow(clippy::module_inception)]
pub mod error;
pub mod validation;

pub use error::{BusError, InitError, SessionError};
pub use validation::{DispatchError, ValidationError, ValidationErrorKind};
