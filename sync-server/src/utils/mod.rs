pub mod error;
pub mod logger;

pub use error::{ok, ok_with_message, AppError, AppResponse};

/// Result alias used across the server
pub type AppResult<T> = Result<T, AppError>;
