// ⚠️ Error taxonomy for seeding and reading the categories table
//
// Storage failures are fatal to an invocation and propagate to the driver.
// DuplicateEntry is the one expected outcome: the reconciler turns it into a skip.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SeedError>;

#[derive(Debug, Error)]
pub enum SeedError {
    /// Storage could not be opened or configured
    #[error("storage unavailable at {path}: {reason}")]
    StorageUnavailable { path: String, reason: String },

    /// The durable commit failed; the batch has been rolled back
    #[error("commit failed, batch rolled back: {0}")]
    CommitFailure(String),

    /// Storage rejected an insert because a record already holds (type, name)
    #[error("{category_type} '{name}' already exists")]
    DuplicateEntry { category_type: String, name: String },

    /// Any other storage error (find, insert, query)
    #[error("storage error: {0}")]
    Storage(String),

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("unknown category type: {0}")]
    UnknownCategoryType(String),

    /// An in-process endpoint request could not be built or answered
    #[error("endpoint check failed: {0}")]
    EndpointCheck(String),
}

impl SeedError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, SeedError::DuplicateEntry { .. })
    }
}

impl From<rusqlite::Error> for SeedError {
    fn from(err: rusqlite::Error) -> Self {
        SeedError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_entry_message() {
        let err = SeedError::DuplicateEntry {
            category_type: "skills".to_string(),
            name: "Python".to_string(),
        };

        assert!(err.is_duplicate());
        assert_eq!(err.to_string(), "skills 'Python' already exists");
    }

    #[test]
    fn test_rusqlite_error_maps_to_storage() {
        let err: SeedError = rusqlite::Error::QueryReturnedNoRows.into();

        assert!(matches!(err, SeedError::Storage(_)));
        assert!(!err.is_duplicate());
    }
}
