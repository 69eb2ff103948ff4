//! `PostgreSQL` implementation of the `CatalogRepository` trait.

use async_trait::async_trait;
use mallbots_core::error::DomainError;
use mallbots_stores::domain::aggregates::CatalogProduct;
use mallbots_stores::domain::repository::CatalogRepository;
use tracing::instrument;
use uuid::Uuid;

use crate::error::map_sqlx_error;
use crate::pg_transaction::{SharedTransaction, conn, open};

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    store_id: Uuid,
    name: String,
    description: String,
    sku: String,
    price: f64,
}

impl From<ProductRow> for CatalogProduct {
    fn from(row: ProductRow) -> Self {
        CatalogProduct::restore(
            row.id,
            row.store_id,
            row.name,
            row.description,
            row.sku,
            row.price,
        )
    }
}

/// Catalog repository bound to one scope's transaction.
pub struct PgCatalogRepository {
    transaction: SharedTransaction,
}

impl PgCatalogRepository {
    pub(crate) fn new(transaction: SharedTransaction) -> Self {
        Self { transaction }
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    #[instrument(skip_all, fields(product_id = %product.id, store_id = %product.store_id()))]
    async fn insert(&self, product: &CatalogProduct) -> Result<(), DomainError> {
        let mut guard = open(&self.transaction).await;
        let connection = conn(&mut guard)?;
        sqlx::query(
            r"
            INSERT INTO products (id, store_id, name, description, sku, price)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(product.id)
        .bind(product.store_id())
        .bind(product.name())
        .bind(product.description())
        .bind(product.sku())
        .bind(product.price())
        .execute(&mut *connection)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;
        Ok(())
    }

    #[instrument(skip_all, fields(product_id = %product.id))]
    async fn update(&self, product: &CatalogProduct) -> Result<(), DomainError> {
        let mut guard = open(&self.transaction).await;
        let connection = conn(&mut guard)?;
        let result = sqlx::query(
            r"
            UPDATE products
            SET name = $2, description = $3, sku = $4, price = $5
            WHERE id = $1
            ",
        )
        .bind(product.id)
        .bind(product.name())
        .bind(product.description())
        .bind(product.sku())
        .bind(product.price())
        .execute(&mut *connection)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::AggregateNotFound(product.id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, product_id: Uuid) -> Result<(), DomainError> {
        let mut guard = open(&self.transaction).await;
        let connection = conn(&mut guard)?;
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&mut *connection)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::AggregateNotFound(product_id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find(&self, product_id: Uuid) -> Result<Option<CatalogProduct>, DomainError> {
        let mut guard = open(&self.transaction).await;
        let connection = conn(&mut guard)?;
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, store_id, name, description, sku, price
            FROM products
            WHERE id = $1
            ",
        )
        .bind(product_id)
        .fetch_optional(&mut *connection)
        .await
        .map_err(|e| map_sqlx_error("find_product", e))?;
        Ok(row.map(CatalogProduct::from))
    }

    #[instrument(skip(self))]
    async fn find_by_store(&self, store_id: Uuid) -> Result<Vec<CatalogProduct>, DomainError> {
        let mut guard = open(&self.transaction).await;
        let connection = conn(&mut guard)?;
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, store_id, name, description, sku, price
            FROM products
            WHERE store_id = $1
            ORDER BY name, id
            ",
        )
        .bind(store_id)
        .fetch_all(&mut *connection)
        .await
        .map_err(|e| map_sqlx_error("find_products_by_store", e))?;
        Ok(rows.into_iter().map(CatalogProduct::from).collect())
    }
}
