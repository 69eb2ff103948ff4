//! Query handlers for the Stores & Catalog context.
//!
//! Queries read through the same scoped repositories as commands and return
//! read-only view DTOs.

use mallbots_core::error::DomainError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::scope::StoresScope;
use crate::domain::aggregates::{CatalogProduct, MallStore};

/// Read-only view of a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreView {
    /// The store identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Location inside the mall.
    pub location: String,
    /// Whether the store takes part in automated shopping.
    pub participating: bool,
}

impl From<&MallStore> for StoreView {
    fn from(store: &MallStore) -> Self {
        Self {
            id: store.id,
            name: store.name().to_owned(),
            location: store.location().to_owned(),
            participating: store.participating(),
        }
    }
}

/// Read-only view of a catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductView {
    /// The product identifier.
    pub id: Uuid,
    /// The owning store.
    pub store_id: Uuid,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Stock keeping unit.
    pub sku: String,
    /// Current price.
    pub price: f64,
}

impl From<&CatalogProduct> for ProductView {
    fn from(product: &CatalogProduct) -> Self {
        Self {
            id: product.id,
            store_id: product.store_id(),
            name: product.name().to_owned(),
            description: product.description().to_owned(),
            sku: product.sku().to_owned(),
            price: product.price(),
        }
    }
}

/// Retrieves a store by its ID.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no store has the ID, and any
/// persistence failure.
pub async fn get_store(store_id: Uuid, scope: &StoresScope) -> Result<StoreView, DomainError> {
    scope
        .stores
        .find(store_id)
        .await?
        .map(|store| StoreView::from(&store))
        .ok_or(DomainError::AggregateNotFound(store_id))
}

/// Lists every store.
///
/// # Errors
///
/// Returns any persistence failure.
pub async fn get_stores(scope: &StoresScope) -> Result<Vec<StoreView>, DomainError> {
    let stores = scope.stores.find_all().await?;
    Ok(stores.iter().map(StoreView::from).collect())
}

/// Lists the stores currently participating.
///
/// # Errors
///
/// Returns any persistence failure.
pub async fn get_participating_stores(
    scope: &StoresScope,
) -> Result<Vec<StoreView>, DomainError> {
    let stores = scope.stores.find_participating().await?;
    Ok(stores.iter().map(StoreView::from).collect())
}

/// Retrieves a product by its ID.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no product has the ID, and
/// any persistence failure.
pub async fn get_product(
    product_id: Uuid,
    scope: &StoresScope,
) -> Result<ProductView, DomainError> {
    scope
        .catalog
        .find(product_id)
        .await?
        .map(|product| ProductView::from(&product))
        .ok_or(DomainError::AggregateNotFound(product_id))
}

/// Lists the products in one store's catalog. An unknown store has an empty
/// catalog.
///
/// # Errors
///
/// Returns any persistence failure.
pub async fn get_catalog(
    store_id: Uuid,
    scope: &StoresScope,
) -> Result<Vec<ProductView>, DomainError> {
    let products = scope.catalog.find_by_store(store_id).await?;
    Ok(products.iter().map(ProductView::from).collect())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mallbots_core::dispatcher::{EventDispatcher, HandlerRegistry};
    use mallbots_test_support::FixedClock;

    use super::*;
    use crate::memory::MemoryDatabase;

    fn empty_scope(db: &MemoryDatabase) -> StoresScope {
        let transaction = db.begin();
        StoresScope {
            stores: Box::new(transaction.stores()),
            catalog: Box::new(transaction.catalog()),
            dispatcher: EventDispatcher::new(HandlerRegistry::builder().build()),
            clock: Arc::new(FixedClock::default()),
        }
    }

    fn store(name: &str, participating: bool) -> MallStore {
        MallStore::restore(Uuid::new_v4(), name.to_owned(), "NY".to_owned(), participating)
    }

    #[tokio::test]
    async fn test_get_store_returns_view() {
        // Arrange
        let db = MemoryDatabase::new();
        let scope = empty_scope(&db);
        let acme = store("Acme", false);
        scope.stores.insert(&acme).await.unwrap();

        // Act
        let view = get_store(acme.id, &scope).await.unwrap();

        // Assert
        assert_eq!(
            view,
            StoreView {
                id: acme.id,
                name: "Acme".to_owned(),
                location: "NY".to_owned(),
                participating: false,
            }
        );
    }

    #[tokio::test]
    async fn test_get_store_returns_not_found() {
        let db = MemoryDatabase::new();
        let scope = empty_scope(&db);
        let missing = Uuid::new_v4();

        let result = get_store(missing, &scope).await;

        match result {
            Err(DomainError::AggregateNotFound(id)) => assert_eq!(id, missing),
            other => panic!("expected AggregateNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_participating_stores_filters_and_sorts() {
        // Arrange
        let db = MemoryDatabase::new();
        let scope = empty_scope(&db);
        for s in [store("Zed", true), store("Acme", true), store("Idle", false)] {
            scope.stores.insert(&s).await.unwrap();
        }

        // Act
        let all = get_stores(&scope).await.unwrap();
        let participating = get_participating_stores(&scope).await.unwrap();

        // Assert
        let all_names: Vec<&str> = all.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(all_names, vec!["Acme", "Idle", "Zed"]);
        let names: Vec<&str> = participating.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Acme", "Zed"]);
    }

    #[tokio::test]
    async fn test_get_catalog_returns_only_that_store() {
        // Arrange
        let db = MemoryDatabase::new();
        let scope = empty_scope(&db);
        let acme = store("Acme", false);
        let other = store("Other", false);
        scope.stores.insert(&acme).await.unwrap();
        scope.stores.insert(&other).await.unwrap();
        let widget = CatalogProduct::restore(
            Uuid::new_v4(),
            acme.id,
            "Widget".to_owned(),
            "desc".to_owned(),
            "SKU1".to_owned(),
            100.0,
        );
        let gizmo = CatalogProduct::restore(
            Uuid::new_v4(),
            other.id,
            "Gizmo".to_owned(),
            String::new(),
            "SKU2".to_owned(),
            5.0,
        );
        scope.catalog.insert(&widget).await.unwrap();
        scope.catalog.insert(&gizmo).await.unwrap();

        // Act
        let catalog = get_catalog(acme.id, &scope).await.unwrap();

        // Assert
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].id, widget.id);
        assert_eq!(catalog[0].store_id, acme.id);
        let product = get_product(gizmo.id, &scope).await.unwrap();
        assert_eq!(product.sku, "SKU2");
    }
}
