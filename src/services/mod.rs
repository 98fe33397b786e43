//! Business logic shared by the HTML routes and the JSON API.
//!
//! Services are plain async functions generic over the repository traits.
//! Store failures are logged here and reported as [`ServiceError::Internal`].

pub mod api;
pub mod categories;
pub mod errors;
pub mod listings;
pub mod main;

pub use errors::{ServiceError, ServiceResult};
