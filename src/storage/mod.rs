// Storage - The contract the reconciler and reporter need from persistence
//
// Writes are staged inside a batch and become durable only on commit.
// Reads issued through the same handle see the handle's own staged rows.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::record::{CategoryRecord, NewCategory};

pub trait CategoryStore {
    /// Open a write batch. No-op when one is already open.
    fn begin(&mut self) -> Result<()>;

    /// Record with exactly this (category_type, name), case-sensitive.
    /// Soft-deleted rows match too.
    fn find(&self, category_type: &str, name: &str) -> Result<Option<CategoryRecord>>;

    /// Stage a record, opening a batch if needed. Returns the record with its
    /// assigned id. Fails with `DuplicateEntry` if any record, active or
    /// not, already holds the same (category_type, name).
    fn insert(&mut self, record: NewCategory) -> Result<CategoryRecord>;

    /// Make every staged insert durable, atomically. On failure the batch is
    /// discarded and `CommitFailure` is returned.
    fn commit(&mut self) -> Result<()>;

    /// Discard every staged insert
    fn rollback(&mut self) -> Result<()>;

    /// Active records of one type, ordered by name ascending
    fn query_active(&self, category_type: &str) -> Result<Vec<CategoryRecord>>;

    fn count_active(&self, category_type: &str) -> Result<i64>;

    fn count_all_active(&self) -> Result<i64>;

    /// Every stored row, soft-deleted ones included
    fn count_all(&self) -> Result<i64>;

    /// Active records whose name or description contains `query`
    /// (case-insensitive), optionally restricted to one type.
    /// Ordered by category_type, then name.
    fn search(&self, query: &str, category_type: Option<&str>) -> Result<Vec<CategoryRecord>>;
}
