//! Mallbots Core: shared domain abstractions.
//!
//! This crate defines the traits and types the stores context and its
//! adapters depend on: aggregates, domain events, the in-process event
//! dispatcher, the integration-event publisher seam, and the per-call
//! unit of work. It contains no infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod publisher;
pub mod scope;
