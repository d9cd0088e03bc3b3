// 🏷️ Category Record - A persisted row of the categories table
//
// Identity is the UUID assigned by storage on insert. The (category_type, name)
// pair is the natural key: unique among active records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::CategoryEntry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    /// Stable identity (UUID), assigned by the store
    pub id: String,

    pub category_type: String,
    pub name: String,
    pub description: String,

    /// Soft-delete flag; reconciliation only ever writes `true`
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

impl CategoryRecord {
    /// Same natural key as the catalog entry
    pub fn matches(&self, entry: &CategoryEntry) -> bool {
        self.category_type == entry.category_type && self.name == entry.name
    }
}

/// A record the reconciler wants stored; the store assigns id and timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub category_type: String,
    pub name: String,
    pub description: String,
    pub is_active: bool,
}

impl From<&CategoryEntry> for NewCategory {
    fn from(entry: &CategoryEntry) -> Self {
        NewCategory {
            category_type: entry.category_type.clone(),
            name: entry.name.clone(),
            description: entry.description.clone(),
            is_active: true,
        }
    }
}

impl NewCategory {
    /// Materialize with a fresh UUID and the current time
    pub fn into_record(self) -> CategoryRecord {
        CategoryRecord {
            id: uuid::Uuid::new_v4().to_string(),
            category_type: self.category_type,
            name: self.name,
            description: self.description,
            is_active: self.is_active,
            created_at: Utc::now(),
        }
    }
}
