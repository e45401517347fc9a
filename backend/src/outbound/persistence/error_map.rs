//! Shared Diesel-to-port error mapping.
//!
//! Keeps raw database error text out of domain errors; the full detail
//! is logged here at debug level instead.

use tracing::debug;

/// Classify a Diesel error as a connection or query problem and hand
/// the two message strings to the caller's variant constructors.
pub(super) fn classify_diesel_error<E>(
    error: diesel::result::Error,
    connection: impl FnOnce(String) -> E,
    query: impl FnOnce(String) -> E,
) -> E {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error".to_owned())
        }
        _ => query("database error".to_owned()),
    }
}

/// True when the error is a unique-constraint violation, used to map
/// duplicate emails onto the dedicated port variant.
pub(super) fn is_unique_violation(error: &diesel::result::Error) -> bool {
    matches!(
        error,
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )
    )
}
