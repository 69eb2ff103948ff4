//! Translation of driver errors into domain errors.

use mallbots_core::error::DomainError;

/// Maps a `sqlx` error raised by `operation` onto `DomainError::Infrastructure`.
#[must_use]
pub fn map_sqlx_error(operation: &str, err: sqlx::Error) -> DomainError {
    let message = match err {
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("23505") => format!("{operation}: duplicate key: {}", db_err.message()),
            Some("23503") => format!(
                "{operation}: referenced row missing: {}",
                db_err.message()
            ),
            Some("23514") => format!("{operation}: check violated: {}", db_err.message()),
            _ => format!("{operation}: database error: {}", db_err.message()),
        },
        sqlx::Error::PoolTimedOut => format!("{operation}: connection pool timed out"),
        sqlx::Error::PoolClosed => format!("{operation}: connection pool closed"),
        other => format!("{operation}: {other}"),
    };
    DomainError::Infrastructure(message)
}
