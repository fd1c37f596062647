//! # hire-api
//!
//! HTTP handlers for Hire RS.
//!
//! Every response uses the platform envelope: `{ status, message, Results }`
//! on success and `{ status, message }` on failure.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod representers;
pub mod routes;

pub use extractors::AppState;
pub use routes::router;
