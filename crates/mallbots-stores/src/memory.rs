//! In-memory storage for the Stores & Catalog context.
//!
//! Each transaction reads from a snapshot taken when it began plus its own
//! writes. Writes are staged and replayed onto the shared tables only on
//! commit; rollback, or dropping the transaction, discards them.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mallbots_core::clock::Clock;
use mallbots_core::dispatcher::{EventDispatcher, HandlerRegistry};
use mallbots_core::error::DomainError;
use mallbots_core::scope::{Scope, ScopeProvider, UnitOfWork};
use tracing::debug;
use uuid::Uuid;

use crate::application::scope::StoresScope;
use crate::domain::aggregates::{CatalogProduct, MallStore};
use crate::domain::events::StoresEvent;
use crate::domain::repository::{CatalogRepository, StoreRepository};

#[derive(Debug, Clone)]
struct StoreRow {
    name: String,
    location: String,
    participating: bool,
}

#[derive(Debug, Clone)]
struct ProductRow {
    store_id: Uuid,
    name: String,
    description: String,
    sku: String,
    price: f64,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    stores: BTreeMap<Uuid, StoreRow>,
    products: BTreeMap<Uuid, ProductRow>,
}

impl Tables {
    fn apply(&mut self, write: &Write) {
        match write {
            Write::PutStore(id, row) => {
                self.stores.insert(*id, row.clone());
            }
            Write::PutProduct(id, row) => {
                self.products.insert(*id, row.clone());
            }
            Write::DeleteProduct(id) => {
                self.products.remove(id);
            }
        }
    }
}

#[derive(Debug)]
enum Write {
    PutStore(Uuid, StoreRow),
    PutProduct(Uuid, ProductRow),
    DeleteProduct(Uuid),
}

#[derive(Debug)]
struct Staged {
    view: Tables,
    writes: Vec<Write>,
}

impl Staged {
    fn write(&mut self, write: Write) {
        self.view.apply(&write);
        self.writes.push(write);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, DomainError> {
    mutex
        .lock()
        .map_err(|_| DomainError::Infrastructure("in-memory storage lock poisoned".into()))
}

#[derive(Debug, Clone)]
struct StagedHandle(Arc<Mutex<Option<Staged>>>);

impl StagedHandle {
    fn with<R>(&self, f: impl FnOnce(&mut Staged) -> Result<R, DomainError>) -> Result<R, DomainError> {
        let mut guard = lock(&self.0)?;
        let staged = guard
            .as_mut()
            .ok_or_else(|| DomainError::Infrastructure("transaction already closed".into()))?;
        f(staged)
    }

    fn take(&self) -> Result<Staged, DomainError> {
        lock(&self.0)?
            .take()
            .ok_or_else(|| DomainError::Infrastructure("transaction already closed".into()))
    }
}

/// Shared in-memory tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    committed: Arc<Mutex<Tables>>,
}

impl MemoryDatabase {
    /// Creates empty tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a transaction over a snapshot of the committed tables.
    ///
    /// A poisoned lock yields a transaction over empty tables whose commit
    /// fails.
    #[must_use]
    pub fn begin(&self) -> MemoryTransaction {
        let view = self
            .committed
            .lock()
            .map(|tables| tables.clone())
            .unwrap_or_default();
        MemoryTransaction {
            committed: Arc::clone(&self.committed),
            staged: StagedHandle(Arc::new(Mutex::new(Some(Staged {
                view,
                writes: Vec::new(),
            })))),
        }
    }
}

/// One in-memory transaction.
#[derive(Debug)]
pub struct MemoryTransaction {
    committed: Arc<Mutex<Tables>>,
    staged: StagedHandle,
}

impl MemoryTransaction {
    /// Store repository bound to this transaction.
    #[must_use]
    pub fn stores(&self) -> MemoryStoreRepository {
        MemoryStoreRepository {
            staged: self.staged.clone(),
        }
    }

    /// Catalog repository bound to this transaction.
    #[must_use]
    pub fn catalog(&self) -> MemoryCatalogRepository {
        MemoryCatalogRepository {
            staged: self.staged.clone(),
        }
    }
}

#[async_trait]
impl UnitOfWork for MemoryTransaction {
    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let staged = self.staged.take()?;
        let mut committed = lock(&self.committed)?;
        for write in &staged.writes {
            committed.apply(write);
        }
        debug!(writes = staged.writes.len(), "in-memory transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        let staged = self.staged.take()?;
        debug!(writes = staged.writes.len(), "in-memory transaction rolled back");
        Ok(())
    }
}

fn to_store(id: Uuid, row: &StoreRow) -> MallStore {
    MallStore::restore(id, row.name.clone(), row.location.clone(), row.participating)
}

fn to_product(id: Uuid, row: &ProductRow) -> CatalogProduct {
    CatalogProduct::restore(
        id,
        row.store_id,
        row.name.clone(),
        row.description.clone(),
        row.sku.clone(),
        row.price,
    )
}

fn store_row(store: &MallStore) -> StoreRow {
    StoreRow {
        name: store.name().to_owned(),
        location: store.location().to_owned(),
        participating: store.participating(),
    }
}

fn sorted_stores<'a>(rows: impl Iterator<Item = (&'a Uuid, &'a StoreRow)>) -> Vec<MallStore> {
    let mut stores: Vec<MallStore> = rows.map(|(id, row)| to_store(*id, row)).collect();
    stores.sort_by(|a, b| a.name().cmp(b.name()).then(a.id.cmp(&b.id)));
    stores
}

/// In-memory [`StoreRepository`].
#[derive(Debug, Clone)]
pub struct MemoryStoreRepository {
    staged: StagedHandle,
}

#[async_trait]
impl StoreRepository for MemoryStoreRepository {
    async fn insert(&self, store: &MallStore) -> Result<(), DomainError> {
        self.staged.with(|staged| {
            if staged.view.stores.contains_key(&store.id) {
                return Err(DomainError::Infrastructure(format!(
                    "duplicate store id {}",
                    store.id
                )));
            }
            staged.write(Write::PutStore(store.id, store_row(store)));
            Ok(())
        })
    }

    async fn update(&self, store: &MallStore) -> Result<(), DomainError> {
        self.staged.with(|staged| {
            if !staged.view.stores.contains_key(&store.id) {
                return Err(DomainError::AggregateNotFound(store.id));
            }
            staged.write(Write::PutStore(store.id, store_row(store)));
            Ok(())
        })
    }

    async fn find(&self, store_id: Uuid) -> Result<Option<MallStore>, DomainError> {
        self.staged.with(|staged| {
            Ok(staged
                .view
                .stores
                .get(&store_id)
                .map(|row| to_store(store_id, row)))
        })
    }

    async fn find_all(&self) -> Result<Vec<MallStore>, DomainError> {
        self.staged
            .with(|staged| Ok(sorted_stores(staged.view.stores.iter())))
    }

    async fn find_participating(&self) -> Result<Vec<MallStore>, DomainError> {
        self.staged.with(|staged| {
            Ok(sorted_stores(
                staged.view.stores.iter().filter(|(_, row)| row.participating),
            ))
        })
    }
}

/// In-memory [`CatalogRepository`].
#[derive(Debug, Clone)]
pub struct MemoryCatalogRepository {
    staged: StagedHandle,
}

#[async_trait]
impl CatalogRepository for MemoryCatalogRepository {
    async fn insert(&self, product: &CatalogProduct) -> Result<(), DomainError> {
        self.staged.with(|staged| {
            if staged.view.products.contains_key(&product.id) {
                return Err(DomainError::Infrastructure(format!(
                    "duplicate product id {}",
                    product.id
                )));
            }
            if !staged.view.stores.contains_key(&product.store_id()) {
                return Err(DomainError::Infrastructure(format!(
                    "store {} does not exist",
                    product.store_id()
                )));
            }
            staged.write(Write::PutProduct(
                product.id,
                ProductRow {
                    store_id: product.store_id(),
                    name: product.name().to_owned(),
                    description: product.description().to_owned(),
                    sku: product.sku().to_owned(),
                    price: product.price(),
                },
            ));
            Ok(())
        })
    }

    async fn update(&self, product: &CatalogProduct) -> Result<(), DomainError> {
        self.staged.with(|staged| {
            let existing = staged
                .view
                .products
                .get(&product.id)
                .ok_or(DomainError::AggregateNotFound(product.id))?;
            let row = ProductRow {
                store_id: existing.store_id,
                name: product.name().to_owned(),
                description: product.description().to_owned(),
                sku: product.sku().to_owned(),
                price: product.price(),
            };
            staged.write(Write::PutProduct(product.id, row));
            Ok(())
        })
    }

    async fn delete(&self, product_id: Uuid) -> Result<(), DomainError> {
        self.staged.with(|staged| {
            if !staged.view.products.contains_key(&product_id) {
                return Err(DomainError::AggregateNotFound(product_id));
            }
            staged.write(Write::DeleteProduct(product_id));
            Ok(())
        })
    }

    async fn find(&self, product_id: Uuid) -> Result<Option<CatalogProduct>, DomainError> {
        self.staged.with(|staged| {
            Ok(staged
                .view
                .products
                .get(&product_id)
                .map(|row| to_product(product_id, row)))
        })
    }

    async fn find_by_store(&self, store_id: Uuid) -> Result<Vec<CatalogProduct>, DomainError> {
        self.staged.with(|staged| {
            let mut products: Vec<CatalogProduct> = staged
                .view
                .products
                .iter()
                .filter(|(_, row)| row.store_id == store_id)
                .map(|(id, row)| to_product(*id, row))
                .collect();
            products.sort_by(|a, b| a.name().cmp(b.name()).then(a.id.cmp(&b.id)));
            Ok(products)
        })
    }
}

/// Scope provider over [`MemoryDatabase`].
pub struct MemoryScopeProvider {
    database: MemoryDatabase,
    registry: Arc<HandlerRegistry<StoresEvent>>,
    clock: Arc<dyn Clock>,
}

impl MemoryScopeProvider {
    /// Creates a provider whose scopes dispatch through `registry`.
    #[must_use]
    pub fn new(
        database: MemoryDatabase,
        registry: Arc<HandlerRegistry<StoresEvent>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            database,
            registry,
            clock,
        }
    }
}

#[async_trait]
impl ScopeProvider for MemoryScopeProvider {
    type Context = StoresScope;

    async fn scoped(&self) -> Result<Scope<StoresScope>, DomainError> {
        let transaction = self.database.begin();
        let context = StoresScope {
            stores: Box::new(transaction.stores()),
            catalog: Box::new(transaction.catalog()),
            dispatcher: EventDispatcher::new(Arc::clone(&self.registry)),
            clock: Arc::clone(&self.clock),
        };
        Ok(Scope {
            transaction: Box::new(transaction),
            context,
        })
    }
}
