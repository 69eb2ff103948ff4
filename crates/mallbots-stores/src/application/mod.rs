//! Application services for the Stores & Catalog context.

pub mod command_handlers;
pub mod integration_handlers;
pub mod query_handlers;
pub mod scope;
