//! Engine-facing error taxonomy.

use thiserror::Error;

use equipstock_core::DomainError;

use crate::location::LocationError;
use crate::store::StoreError;

/// Failure of a catalog or stock-ledger operation.
///
/// Every business-rule violation surfaces as one of `NotFound`,
/// `InvalidState` or `DependencyUnavailable`; malformed input is `Validation`
/// and persistence faults are `Store` (never retried).
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Equipment type, location or stock record is absent.
    #[error("{0}")]
    NotFound(String),

    /// Non-operational equipment, or insufficient stock on consume.
    #[error("{0}")]
    InvalidState(String),

    /// The location service is unreachable or answered with something other
    /// than a record or a not-found.
    #[error("location service unavailable: {0}")]
    DependencyUnavailable(String),

    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    /// Persistence fault.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DomainError> for LedgerError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => LedgerError::Validation(msg),
            DomainError::InvalidId(msg) => LedgerError::Validation(msg),
            DomainError::InvalidState(msg) => LedgerError::InvalidState(msg),
            DomainError::NotFound(msg) => LedgerError::NotFound(msg),
        }
    }
}

impl From<LocationError> for LedgerError {
    fn from(value: LocationError) -> Self {
        match value {
            LocationError::NotFound(id) => LedgerError::NotFound(format!(
                "location {id} does not exist in the location service"
            )),
            LocationError::Unavailable(msg) => LedgerError::DependencyUnavailable(msg),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
