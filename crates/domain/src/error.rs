//! Error taxonomy for the planner core.

use thiserror::Error;

/// Failure reported by a storage backend.
///
/// Backends translate their native errors into this type so that driver
/// errors never reach the workflow engine.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness or primary-key constraint rejected the write, or the
    /// transaction could not be serialized against a concurrent writer.
    #[error("conflicting write: {0}")]
    Conflict(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Error returned by planner operations.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("{0}")]
    Validation(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for PlannerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => PlannerError::Conflict(msg),
            other => PlannerError::Store(other),
        }
    }
}

pub type PlannerResult<T> = Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_conflict_collapses_to_conflict() {
        let err: PlannerError = StoreError::Conflict("duplicate key".into()).into();
        assert!(matches!(err, PlannerError::Conflict(msg) if msg == "duplicate key"));
    }

    #[test]
    fn test_backend_error_stays_opaque() {
        let err: PlannerError = StoreError::Backend("connection reset".into()).into();
        assert!(matches!(err, PlannerError::Store(StoreError::Backend(_))));
    }
}
