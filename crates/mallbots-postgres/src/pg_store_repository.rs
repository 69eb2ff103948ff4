//! `PostgreSQL` implementation of the `StoreRepository` trait.

use async_trait::async_trait;
use mallbots_core::error::DomainError;
use mallbots_stores::domain::aggregates::MallStore;
use mallbots_stores::domain::repository::StoreRepository;
use tracing::instrument;
use uuid::Uuid;

use crate::error::map_sqlx_error;
use crate::pg_transaction::{SharedTransaction, conn, open};

#[derive(sqlx::FromRow)]
struct StoreRow {
    id: Uuid,
    name: String,
    location: String,
    participating: bool,
}

impl From<StoreRow> for MallStore {
    fn from(row: StoreRow) -> Self {
        MallStore::restore(row.id, row.name, row.location, row.participating)
    }
}

/// Store repository bound to one scope's transaction.
pub struct PgStoreRepository {
    transaction: SharedTransaction,
}

impl PgStoreRepository {
    pub(crate) fn new(transaction: SharedTransaction) -> Self {
        Self { transaction }
    }
}

#[async_trait]
impl StoreRepository for PgStoreRepository {
    #[instrument(skip_all, fields(store_id = %store.id))]
    async fn insert(&self, store: &MallStore) -> Result<(), DomainError> {
        let mut guard = open(&self.transaction).await;
        let connection = conn(&mut guard)?;
        sqlx::query(
            r"
            INSERT INTO stores (id, name, location, participating)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(store.id)
        .bind(store.name())
        .bind(store.location())
        .bind(store.participating())
        .execute(&mut *connection)
        .await
        .map_err(|e| map_sqlx_error("insert_store", e))?;
        Ok(())
    }

    #[instrument(skip_all, fields(store_id = %store.id))]
    async fn update(&self, store: &MallStore) -> Result<(), DomainError> {
        let mut guard = open(&self.transaction).await;
        let connection = conn(&mut guard)?;
        let result = sqlx::query(
            r"
            UPDATE stores
            SET name = $2, location = $3, participating = $4
            WHERE id = $1
            ",
        )
        .bind(store.id)
        .bind(store.name())
        .bind(store.location())
        .bind(store.participating())
        .execute(&mut *connection)
        .await
        .map_err(|e| map_sqlx_error("update_store", e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::AggregateNotFound(store.id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find(&self, store_id: Uuid) -> Result<Option<MallStore>, DomainError> {
        let mut guard = open(&self.transaction).await;
        let connection = conn(&mut guard)?;
        let row = sqlx::query_as::<_, StoreRow>(
            "SELECT id, name, location, participating FROM stores WHERE id = $1",
        )
        .bind(store_id)
        .fetch_optional(&mut *connection)
        .await
        .map_err(|e| map_sqlx_error("find_store", e))?;
        Ok(row.map(MallStore::from))
    }

    async fn find_all(&self) -> Result<Vec<MallStore>, DomainError> {
        let mut guard = open(&self.transaction).await;
        let connection = conn(&mut guard)?;
        let rows = sqlx::query_as::<_, StoreRow>(
            "SELECT id, name, location, participating FROM stores ORDER BY name, id",
        )
        .fetch_all(&mut *connection)
        .await
        .map_err(|e| map_sqlx_error("find_all_stores", e))?;
        Ok(rows.into_iter().map(MallStore::from).collect())
    }

    async fn find_participating(&self) -> Result<Vec<MallStore>, DomainError> {
        let mut guard = open(&self.transaction).await;
        let connection = conn(&mut guard)?;
        let rows = sqlx::query_as::<_, StoreRow>(
            r"
            SELECT id, name, location, participating
            FROM stores
            WHERE participating
            ORDER BY name, id
            ",
        )
        .fetch_all(&mut *connection)
        .await
        .map_err(|e| map_sqlx_error("find_participating_stores", e))?;
        Ok(rows.into_iter().map(MallStore::from).collect())
    }
}
