//! Domain model for the Stores & Catalog context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod repository;
