//! Objective Service Client
//!
//! The remote service computes burn rates and alert states; this crate only
//! asks for them. [`ObjectiveService`] is the seam the dashboard controllers
//! are written against, with an HTTP implementation for the connect JSON
//! protocol and a scripted mock for tests and offline runs.

mod error;
mod http;
mod mock;
mod service;

pub use error::ServiceError;
pub use http::{HttpConfig, HttpObjectiveService};
pub use mock::MockObjectiveService;
pub use service::ObjectiveService;

/// Fully-qualified service name used in request paths
pub const SERVICE_NAME: &str = "objectives.v1alpha1.ObjectiveService";
