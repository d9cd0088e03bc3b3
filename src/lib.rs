// Category Seed - Core Library
// Reference-data reconciliation for the categories table, shared by the CLI,
// the API server and tests

pub mod catalog;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod logging;
pub mod reconcile;
pub mod record;
pub mod report;
pub mod storage;

#[cfg(feature = "server")]
pub mod api;

#[cfg(feature = "smoke")]
pub mod smoke;

// Re-export commonly used types
pub use catalog::{label_for, Catalog, CategoryEntry, CategoryType};
pub use config::Config;
pub use error::{Result, SeedError};
pub use reconcile::{
    reconcile, EntryAction, EntryOutcome, ReconciliationReport, Reconciler, TypeSummary,
};
pub use record::{CategoryRecord, NewCategory};
pub use report::{report, CategoryReport, CategorySection};
pub use storage::{CategoryStore, MemoryStore, SqliteStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
