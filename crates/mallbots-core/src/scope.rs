//! Per-call unit of work.
//!
//! Every inbound operation runs inside its own [`Scope`]: a storage
//! transaction plus the context (repositories, dispatcher) bound to it.
//! [`run_scoped`] opens the scope, runs the work and closes it:
//!
//! - a panic rolls back, then resumes unwinding with the original payload;
//! - an error rolls back and is returned unchanged;
//! - success commits, and a failed commit becomes the result.
//!
//! Rollback failures are logged and never replace the outcome. A scope whose
//! future is dropped before completion never commits; the transaction's own
//! drop discards its writes.

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{debug, error};

use crate::error::DomainError;

/// A storage transaction owned by exactly one scope.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Makes every write performed in the scope durable.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the storage layer refuses the
    /// commit.
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;

    /// Discards every write performed in the scope.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the rollback could not be
    /// delivered to the storage layer.
    async fn rollback(self: Box<Self>) -> Result<(), DomainError>;
}

/// A transaction and the per-call context bound to it.
pub struct Scope<C> {
    /// The transaction every repository in `context` writes through.
    pub transaction: Box<dyn UnitOfWork>,
    /// Handlers, repositories and dispatcher for this call only.
    pub context: C,
}

/// Factory for fresh, exclusively owned scopes.
#[async_trait]
pub trait ScopeProvider: Send + Sync {
    /// The per-call bag of collaborators bound to the transaction.
    type Context: Send + 'static;

    /// Opens a new transaction and binds a context to it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if no transaction can be started.
    async fn scoped(&self) -> Result<Scope<Self::Context>, DomainError>;
}

/// Runs `work` inside a fresh scope from `provider`.
///
/// # Errors
///
/// Returns the error produced by `work`, the failure to open the scope, or a
/// commit failure.
///
/// # Panics
///
/// Re-raises any panic from `work` after the transaction has been rolled back.
pub async fn run_scoped<P, F, Fut, T>(provider: &P, work: F) -> Result<T, DomainError>
where
    P: ScopeProvider + ?Sized,
    F: FnOnce(P::Context) -> Fut + Send,
    Fut: Future<Output = Result<T, DomainError>> + Send,
    T: Send,
{
    let Scope {
        transaction,
        context,
    } = provider.scoped().await?;

    let outcome = AssertUnwindSafe(async move { work(context).await })
        .catch_unwind()
        .await;

    close_scope(transaction, outcome).await
}

/// Commits or rolls back `transaction` according to `outcome`.
///
/// # Errors
///
/// Returns the work's error, or the commit failure when the work succeeded.
///
/// # Panics
///
/// Resumes the captured panic after rolling back.
pub async fn close_scope<T>(
    transaction: Box<dyn UnitOfWork>,
    outcome: Result<Result<T, DomainError>, Box<dyn Any + Send>>,
) -> Result<T, DomainError> {
    match outcome {
        Err(payload) => {
            rollback_logged(transaction, "panic").await;
            panic::resume_unwind(payload)
        }
        Ok(Err(e)) => {
            rollback_logged(transaction, "error").await;
            Err(e)
        }
        Ok(Ok(value)) => {
            transaction.commit().await?;
            debug!("unit of work committed");
            Ok(value)
        }
    }
}

async fn rollback_logged(transaction: Box<dyn UnitOfWork>, cause: &'static str) {
    match transaction.rollback().await {
        Ok(()) => debug!(cause, "unit of work rolled back"),
        Err(e) => error!(cause, error = %e, "failed to roll back unit of work"),
    }
}
