//! # hire-core
//!
//! Core types shared by every Hire RS crate.
//!
//! - Common error type (`HireError`) and its HTTP mapping
//! - Result type alias
//! - Application configuration

pub mod error;
pub mod result;
pub mod config;

pub use error::*;
pub use result::*;
