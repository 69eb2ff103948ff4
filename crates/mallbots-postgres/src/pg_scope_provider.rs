//! Scope provider that binds the stores context to a database transaction.

use std::sync::Arc;

use async_trait::async_trait;
use mallbots_core::clock::Clock;
use mallbots_core::dispatcher::{EventDispatcher, HandlerRegistry};
use mallbots_core::error::DomainError;
use mallbots_core::scope::{Scope, ScopeProvider};
use mallbots_stores::application::scope::StoresScope;
use mallbots_stores::domain::events::StoresEvent;
use sqlx::PgPool;

use crate::pg_catalog_repository::PgCatalogRepository;
use crate::pg_store_repository::PgStoreRepository;
use crate::pg_transaction::PgTransaction;

/// Opens one database transaction per scope and wires fresh repositories and
/// a fresh dispatcher to it.
#[derive(Clone)]
pub struct PgScopeProvider {
    pool: PgPool,
    registry: Arc<HandlerRegistry<StoresEvent>>,
    clock: Arc<dyn Clock>,
}

impl PgScopeProvider {
    /// Creates a provider over `pool`.
    #[must_use]
    pub fn new(
        pool: PgPool,
        registry: Arc<HandlerRegistry<StoresEvent>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pool,
            registry,
            clock,
        }
    }
}

impl std::fmt::Debug for PgScopeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgScopeProvider")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ScopeProvider for PgScopeProvider {
    type Context = StoresScope;

    async fn scoped(&self) -> Result<Scope<StoresScope>, DomainError> {
        let transaction = PgTransaction::begin(&self.pool).await?;
        let context = StoresScope {
            stores: Box::new(PgStoreRepository::new(transaction.shared())),
            catalog: Box::new(PgCatalogRepository::new(transaction.shared())),
            dispatcher: EventDispatcher::new(Arc::clone(&self.registry)),
            clock: Arc::clone(&self.clock),
        };
        Ok(Scope {
            transaction: Box::new(transaction),
            context,
        })
    }
}
