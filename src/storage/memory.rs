// In-memory store - test double for the reconciler and reporter
//
// Mirrors the SQLite store: staged rows are visible to the same handle,
// (type, name) pairs are unique across active and soft-deleted rows, and commit is all-or-nothing.
// `fail_next_commit` injects a commit failure.

use super::CategoryStore;
use crate::error::{Result, SeedError};
use crate::record::{CategoryRecord, NewCategory};

#[derive(Debug, Default)]
pub struct MemoryStore {
    committed: Vec<CategoryRecord>,
    staged: Vec<CategoryRecord>,
    in_batch: bool,
    fail_next_commit: Option<String>,
    commits: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from already-committed rows
    pub fn with_records(records: Vec<CategoryRecord>) -> Self {
        MemoryStore {
            committed: records,
            ..Self::default()
        }
    }

    /// The next commit fails with this reason and discards the batch
    pub fn fail_next_commit(&mut self, reason: &str) {
        self.fail_next_commit = Some(reason.to_string());
    }

    /// Rows that survived a commit
    pub fn committed(&self) -> &[CategoryRecord] {
        &self.committed
    }

    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    /// Number of successful commits that carried at least one row
    pub fn commit_count(&self) -> usize {
        self.commits
    }

    fn visible(&self) -> impl Iterator<Item = &CategoryRecord> {
        self.committed.iter().chain(self.staged.iter())
    }

    fn active_sorted<F>(&self, keep: F) -> Vec<CategoryRecord>
    where
        F: Fn(&CategoryRecord) -> bool,
    {
        let mut records: Vec<CategoryRecord> = self
            .visible()
            .filter(|r| r.is_active && keep(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            a.category_type
                .cmp(&b.category_type)
                .then_with(|| a.name.cmp(&b.name))
        });
        records
    }
}

impl CategoryStore for MemoryStore {
    fn begin(&mut self) -> Result<()> {
        self.in_batch = true;
        Ok(())
    }

    fn find(&self, category_type: &str, name: &str) -> Result<Option<CategoryRecord>> {
        Ok(self
            .visible()
            .find(|r| r.category_type == category_type && r.name == name)
            .cloned())
    }

    fn insert(&mut self, record: NewCategory) -> Result<CategoryRecord> {
        self.begin()?;

        if self.find(&record.category_type, &record.name)?.is_some() {
            return Err(SeedError::DuplicateEntry {
                category_type: record.category_type,
                name: record.name,
            });
        }

        let record = record.into_record();
        self.staged.push(record.clone());
        Ok(record)
    }

    fn commit(&mut self) -> Result<()> {
        self.in_batch = false;

        if let Some(reason) = self.fail_next_commit.take() {
            self.staged.clear();
            return Err(SeedError::CommitFailure(reason));
        }

        if !self.staged.is_empty() {
            self.committed.append(&mut self.staged);
            self.commits += 1;
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.in_batch = false;
        self.staged.clear();
        Ok(())
    }

    fn query_active(&self, category_type: &str) -> Result<Vec<CategoryRecord>> {
        Ok(self.active_sorted(|r| r.category_type == category_type))
    }

    fn count_active(&self, category_type: &str) -> Result<i64> {
        Ok(self
            .visible()
            .filter(|r| r.is_active && r.category_type == category_type)
            .count() as i64)
    }

    fn count_all_active(&self) -> Result<i64> {
        Ok(self.visible().filter(|r| r.is_active).count() as i64)
    }

    fn count_all(&self) -> Result<i64> {
        Ok(self.visible().count() as i64)
    }

    fn search(&self, query: &str, category_type: Option<&str>) -> Result<Vec<CategoryRecord>> {
        let needle = query.to_lowercase();

        Ok(self.active_sorted(|r| {
            category_type.map_or(true, |t| r.category_type == t)
                && (r.name.to_lowercase().contains(&needle)
                    || r.description.to_lowercase().contains(&needle))
        }))
    }
}
