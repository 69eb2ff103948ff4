//! PostgreSQL storage for the Mallbots stores service.
//!
//! Repositories here never own a connection. They run on the transaction
//! held by the [`PgTransaction`] of the scope that created them, so every
//! write of one call commits or rolls back together.

pub mod error;
pub mod pg_catalog_repository;
pub mod pg_scope_provider;
pub mod pg_store_repository;
pub mod pg_transaction;

use mallbots_core::error::DomainError;
use sqlx::PgPool;
use sqlx::migrate::Migrator;

pub use pg_catalog_repository::PgCatalogRepository;
pub use pg_scope_provider::PgScopeProvider;
pub use pg_store_repository::PgStoreRepository;
pub use pg_transaction::PgTransaction;

/// Schema migrations for the `stores` and `products` tables.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Applies every pending migration.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), DomainError> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| DomainError::Infrastructure(format!("migration failed: {e}")))
}
