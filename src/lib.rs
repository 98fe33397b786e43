//! Core library exports for the Lalafo Mini classifieds service.
//!
//! The `data` feature exposes the domain model, the document store backends
//! and the repositories. The `server` feature adds forms, services, routes
//! and the view models rendered by the web application.

pub mod domain;
pub mod error_conversions;
pub mod models;
pub mod repository;
pub mod store;

#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;
