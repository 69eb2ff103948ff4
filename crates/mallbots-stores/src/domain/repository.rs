//! Repository abstractions for the Stores & Catalog context.
//!
//! Implementations are bound to one unit of work: every read and write goes
//! through that scope's transaction and becomes visible to other scopes only
//! when it commits.

use async_trait::async_trait;
use mallbots_core::error::DomainError;
use uuid::Uuid;

use super::aggregates::{CatalogProduct, MallStore};

/// Persistence for mall stores.
#[async_trait]
pub trait StoreRepository: Send + Sync {
    /// Inserts a newly created store.
    async fn insert(&self, store: &MallStore) -> Result<(), DomainError>;

    /// Writes the current state of an existing store.
    async fn update(&self, store: &MallStore) -> Result<(), DomainError>;

    /// Loads a store, or `None` if it does not exist.
    async fn find(&self, store_id: Uuid) -> Result<Option<MallStore>, DomainError>;

    /// Loads every store, ordered by name.
    async fn find_all(&self) -> Result<Vec<MallStore>, DomainError>;

    /// Loads the participating stores, ordered by name.
    async fn find_participating(&self) -> Result<Vec<MallStore>, DomainError>;
}

/// Persistence for catalog products.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Inserts a newly added product.
    async fn insert(&self, product: &CatalogProduct) -> Result<(), DomainError>;

    /// Writes the mutable state of an existing product. The owning store is
    /// never changed.
    async fn update(&self, product: &CatalogProduct) -> Result<(), DomainError>;

    /// Deletes a product.
    async fn delete(&self, product_id: Uuid) -> Result<(), DomainError>;

    /// Loads a product, or `None` if it does not exist.
    async fn find(&self, product_id: Uuid) -> Result<Option<CatalogProduct>, DomainError>;

    /// Loads the catalog of one store, ordered by name.
    async fn find_by_store(&self, store_id: Uuid) -> Result<Vec<CatalogProduct>, DomainError>;
}
