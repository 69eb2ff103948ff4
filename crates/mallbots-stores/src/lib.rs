//! Mallbots: Stores & Catalog bounded context.
//!
//! Owns mall stores and the products in each store's catalog, and relays
//! every change to them as integration events on the `store` and `product`
//! channels.

pub mod application;
pub mod domain;
pub mod integration;
pub mod memory;
