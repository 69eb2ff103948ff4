//! `PostgreSQL` implementation of the `UnitOfWork` trait.

use std::sync::Arc;

use async_trait::async_trait;
use mallbots_core::error::DomainError;
use mallbots_core::scope::UnitOfWork;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::error::map_sqlx_error;

/// A database transaction shared by the repositories of one scope.
///
/// `None` once the transaction has been committed or rolled back.
pub(crate) type SharedTransaction = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;

/// Guard held for the duration of one statement.
pub(crate) type TransactionGuard<'a> = MutexGuard<'a, Option<Transaction<'static, Postgres>>>;

/// Locks `shared` for the duration of one statement.
pub(crate) async fn open(shared: &SharedTransaction) -> TransactionGuard<'_> {
    shared.lock().await
}

/// The connection behind a locked transaction.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` once the transaction has been
/// committed or rolled back.
pub(crate) fn conn<'g>(
    guard: &'g mut TransactionGuard<'_>,
) -> Result<&'g mut PgConnection, DomainError> {
    guard
        .as_mut()
        .map(|tx| &mut **tx)
        .ok_or_else(|| DomainError::Infrastructure("transaction already closed".into()))
}

/// One open database transaction.
///
/// Dropping it without calling `commit` rolls the transaction back.
pub struct PgTransaction {
    shared: SharedTransaction,
}

impl std::fmt::Debug for PgTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgTransaction").finish_non_exhaustive()
    }
}

impl PgTransaction {
    /// Begins a transaction on a pooled connection.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if no connection is available or
    /// `BEGIN` fails.
    pub async fn begin(pool: &PgPool) -> Result<Self, DomainError> {
        let transaction = pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;
        Ok(Self {
            shared: Arc::new(Mutex::new(Some(transaction))),
        })
    }

    pub(crate) fn shared(&self) -> SharedTransaction {
        Arc::clone(&self.shared)
    }

    async fn take(&self) -> Result<Transaction<'static, Postgres>, DomainError> {
        self.shared
            .lock()
            .await
            .take()
            .ok_or_else(|| DomainError::Infrastructure("transaction already closed".into()))
    }
}

#[async_trait]
impl UnitOfWork for PgTransaction {
    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.take()
            .await?
            .commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;
        debug!("database transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        self.take()
            .await?
            .rollback()
            .await
            .map_err(|e| map_sqlx_error("rollback", e))?;
        debug!("database transaction rolled back");
        Ok(())
    }
}
