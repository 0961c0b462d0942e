pub mod errors;
pub mod http;
pub mod models;
pub mod password;
pub mod validation;

pub use errors::AlumniServerError;
pub use validation::{Validate, ValidationError};
