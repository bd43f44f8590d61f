//! Typed error enum for the storage layer.

use thiserror::Error;

/// Storage-layer error covering the expected failure modes.
///
/// Absence of a record is NOT an error here: lookups return `Option` and
/// the coordinator treats `None` as "already resolved" on most paths.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Unique constraint violation.
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// SQL / connection / timeout failure.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Row or queue payload could not be deserialized into a domain type.
    #[error("data corruption: {context}")]
    DataCorruption {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Migration failure at startup.
    #[error("migration error: {0}")]
    Migration(String),
}

impl StorageError {
    /// Whether this error is likely transient (worth retrying).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Database(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)))
    }
}

/// Manual `From<sqlx::Error>` so SQLSTATE 23505 maps to `Duplicate`;
/// everything else is a `Database` failure.
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.code().is_some_and(|c| c == "23505") => {
                Self::Duplicate(db_err.message().to_owned())
            },
            _ => Self::Database(err),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::DataCorruption {
            context: "JSON serialization/deserialization".to_owned(),
            source: Box::new(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeout_is_transient() {
        assert!(StorageError::from(sqlx::Error::PoolTimedOut).is_transient());
    }

    #[test]
    fn corruption_is_not_transient() {
        let err: StorageError =
            serde_json::from_str::<i64>("not json").unwrap_err().into();
        assert!(!err.is_transient());
        assert!(matches!(err, StorageError::DataCorruption { .. }));
    }
}
