//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`KeyNotFound`] thrown when a record is not found in the caller scope.
//! - [`MissingParameter`] thrown when the deployment requires an owner and none
//!   was resolved.
//! - [`InvalidId`] thrown when an identifier is not a valid record id.
//! - [`TotalOverflow`] thrown when a total does not fit in a finite `f64`.
//! - [`StoreUnavailable`] thrown when the database cannot be reached.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`MissingParameter`]: EngineError::MissingParameter
//!  [`InvalidId`]: EngineError::InvalidId
//!  [`TotalOverflow`]: EngineError::TotalOverflow
//!  [`StoreUnavailable`]: EngineError::StoreUnavailable
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" not found!")]
    KeyNotFound(String),
    #[error("Missing parameter: {0}")]
    MissingParameter(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Total overflow: {0}")]
    TotalOverflow(String),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(DbErr),
    #[error(transparent)]
    Database(DbErr),
}

impl EngineError {
    /// True for faults the caller may retry later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<DbErr> for EngineError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => Self::StoreUnavailable(err),
            other => Self::Database(other),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::MissingParameter(a), Self::MissingParameter(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidDate(a), Self::InvalidDate(b)) => a == b,
            (Self::TotalOverflow(a), Self::TotalOverflow(b)) => a == b,
            (Self::StoreUnavailable(a), Self::StoreUnavailable(b)) => {
                a.to_string() == b.to_string()
            }
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{ConnAcquireErr, RuntimeErr};

    use super::*;

    #[test]
    fn connection_errors_are_transient() {
        let err = EngineError::from(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout));
        assert!(err.is_transient());

        let err = EngineError::from(DbErr::Conn(RuntimeErr::Internal("refused".to_string())));
        assert!(err.is_transient());
    }

    #[test]
    fn other_db_errors_are_not_transient() {
        let err = EngineError::from(DbErr::Custom("boom".to_string()));
        assert!(!err.is_transient());
        assert!(matches!(err, EngineError::Database(_)));
    }
}
