//! # hire-services
//!
//! Business logic services for Hire RS.
//!
//! Services sit between the HTTP handlers and the repositories. They scope
//! searches (a user listing only ever sees one company) and decide which
//! fields leave the system.

pub mod companies;
pub mod users;

pub use companies::CompanyService;
pub use users::UserService;
