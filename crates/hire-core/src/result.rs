//! Result type aliases

use crate::error::HireError;

/// Standard Result type for Hire RS operations
pub type HireResult<T> = Result<T, HireError>;
