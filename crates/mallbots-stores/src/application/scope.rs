//! The per-call collaborators bound to one unit of work.

use std::sync::Arc;

use mallbots_core::clock::Clock;
use mallbots_core::dispatcher::EventDispatcher;

use crate::domain::events::StoresEvent;
use crate::domain::repository::{CatalogRepository, StoreRepository};

/// Everything a command or query needs for a single call.
///
/// Built by a scope provider around a fresh transaction; never shared between
/// calls.
pub struct StoresScope {
    /// Stores, read and written through the scope's transaction.
    pub stores: Box<dyn StoreRepository>,
    /// Products, read and written through the scope's transaction.
    pub catalog: Box<dyn CatalogRepository>,
    /// Dispatcher for events recorded during the call.
    pub dispatcher: EventDispatcher<StoresEvent>,
    /// Time source for event metadata.
    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for StoresScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoresScope")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}
