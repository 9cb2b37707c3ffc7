//! Classification of pool and Diesel failures shared by the repositories.
//!
//! Each adapter converts a [`Fault`] into its own port error, so the mapping
//! from database error kinds to "retry later" versus "broken query" lives in
//! one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{ConversationRepositoryError, TaskRepositoryError};

use super::pool::PoolError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Fault {
    /// The database could not be reached; worth retrying.
    Connection(String),
    Query(String),
}

impl From<PoolError> for Fault {
    fn from(error: PoolError) -> Self {
        match error {
            PoolError::Checkout { message } | PoolError::Build { message } => {
                Self::Connection(message)
            }
        }
    }
}

impl From<DieselError> for Fault {
    fn from(error: DieselError) -> Self {
        match &error {
            DieselError::DatabaseError(kind, info) => {
                debug!(
                    ?kind,
                    message = info.message(),
                    table = info.table_name(),
                    "diesel operation failed"
                );
            }
            _ => debug!(
                error_type = %std::any::type_name_of_val(&error),
                "diesel operation failed"
            ),
        }

        match error {
            DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
            | DieselError::BrokenTransactionManager => {
                Self::Connection("database connection error".to_owned())
            }
            DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, _) => {
                Self::Query("row violates a table constraint".to_owned())
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                Self::Query("row references a missing parent".to_owned())
            }
            DieselError::QueryBuilderError(_) => Self::Query("database query error".to_owned()),
            _ => Self::Query("database error".to_owned()),
        }
    }
}

impl From<Fault> for TaskRepositoryError {
    fn from(fault: Fault) -> Self {
        match fault {
            Fault::Connection(message) => Self::connection(message),
            Fault::Query(message) => Self::query(message),
        }
    }
}

impl From<Fault> for ConversationRepositoryError {
    fn from(fault: Fault) -> Self {
        match fault {
            Fault::Connection(message) => Self::connection(message),
            Fault::Query(message) => Self::query(message),
        }
    }
}
