//! Mallbots stores HTTP API.
//!
//! Exposes the library parts of the server binary so that integration tests
//! can build the same router `main` serves.

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;
pub mod telemetry;
