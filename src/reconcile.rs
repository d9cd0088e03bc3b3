// ⚖️ Reconciler - Bring the categories table in line with the catalog
//
// Insert-if-absent only: existing rows are never updated or removed.
// All inserts of one run land in a single batch; any failure rolls the
// whole batch back so a run is either fully applied or not at all.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CategoryEntry};
use crate::error::{Result, SeedError};
use crate::record::NewCategory;
use crate::storage::CategoryStore;

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryAction {
    /// No record matched; one was staged
    Inserted,
    /// A record (active or soft-deleted) already existed
    Skipped,
    /// Storage rejected the insert as a duplicate (concurrent writer)
    SkippedConflict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryOutcome {
    pub category_type: String,
    pub name: String,
    pub action: EntryAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSummary {
    pub category_type: String,
    pub inserted: usize,
    pub skipped: usize,
    /// Active records of this type after the run
    pub active_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub inserted_count: usize,
    pub skipped_count: usize,
    /// One summary per catalog type, in catalog order
    pub per_type: Vec<TypeSummary>,
    /// Active records of any type after the run
    pub total_active: i64,
    /// Active records of any type before the run
    pub existing_before: i64,
    pub outcomes: Vec<EntryOutcome>,
    pub reconciled_at: DateTime<Utc>,
}

impl ReconciliationReport {
    fn empty(catalog: &Catalog, existing_before: i64) -> Self {
        ReconciliationReport {
            inserted_count: 0,
            skipped_count: 0,
            per_type: catalog
                .category_types()
                .into_iter()
                .map(|category_type| TypeSummary {
                    category_type,
                    inserted: 0,
                    skipped: 0,
                    active_count: 0,
                })
                .collect(),
            total_active: 0,
            existing_before,
            outcomes: Vec::new(),
            reconciled_at: Utc::now(),
        }
    }

    pub fn type_summary(&self, category_type: &str) -> Option<&TypeSummary> {
        self.per_type.iter().find(|s| s.category_type == category_type)
    }

    pub fn active_count(&self, category_type: &str) -> Option<i64> {
        self.type_summary(category_type).map(|s| s.active_count)
    }

    /// Nothing was written
    pub fn is_noop(&self) -> bool {
        self.inserted_count == 0
    }

    pub fn summary(&self) -> String {
        format!(
            "Reconciliation: {} inserted, {} skipped across {} types, {} active categories",
            self.inserted_count,
            self.skipped_count,
            self.per_type.len(),
            self.total_active
        )
    }

    fn record(&mut self, entry: &CategoryEntry, action: EntryAction) {
        let summary = self
            .per_type
            .iter_mut()
            .find(|s| s.category_type == entry.category_type);

        match action {
            EntryAction::Inserted => {
                self.inserted_count += 1;
                if let Some(s) = summary {
                    s.inserted += 1;
                }
            }
            EntryAction::Skipped | EntryAction::SkippedConflict => {
                self.skipped_count += 1;
                if let Some(s) = summary {
                    s.skipped += 1;
                }
            }
        }

        self.outcomes.push(EntryOutcome {
            category_type: entry.category_type.clone(),
            name: entry.name.clone(),
            action,
        });
    }
}

// ============================================================================
// RECONCILER
// ============================================================================

pub struct Reconciler<'a, S: CategoryStore> {
    store: &'a mut S,
}

impl<'a, S: CategoryStore> Reconciler<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Reconciler { store }
    }

    /// Insert every catalog entry that has no stored (category_type, name) match,
    /// active or not
    ///
    /// Example:
    /// ```
    /// use category_seed::{Catalog, CategoryStore, Reconciler, SqliteStore};
    ///
    /// let mut store = SqliteStore::open_in_memory().unwrap();
    /// let catalog = Catalog::new().with_group("industry", &[("Finance", "Banking")]);
    ///
    /// let report = Reconciler::new(&mut store).reconcile(&catalog).unwrap();
    ///
    /// assert_eq!(report.inserted_count, 1);
    /// assert_eq!(store.count_active("industry").unwrap(), 1);
    /// ```
    pub fn reconcile(&mut self, catalog: &Catalog) -> Result<ReconciliationReport> {
        let existing_before = self.store.count_all_active()?;
        let mut report = ReconciliationReport::empty(catalog, existing_before);

        if existing_before > 0 {
            tracing::info!(existing = existing_before, "table not empty, adding missing entries only");
        }

        self.store.begin()?;

        if let Err(e) = self.stage(catalog, &mut report) {
            self.abandon(&e);
            return Err(e);
        }

        if let Err(e) = self.store.commit() {
            self.abandon(&e);
            return Err(match e {
                SeedError::CommitFailure(_) => e,
                other => SeedError::CommitFailure(other.to_string()),
            });
        }

        tracing::info!(
            inserted = report.inserted_count,
            skipped = report.skipped_count,
            "reconciliation committed"
        );

        self.fill_counts(&mut report)?;
        Ok(report)
    }

    fn stage(&mut self, catalog: &Catalog, report: &mut ReconciliationReport) -> Result<()> {
        for entry in catalog.entries() {
            if self.store.find(&entry.category_type, &entry.name)?.is_some() {
                tracing::debug!(category_type = %entry.category_type, name = %entry.name, "already exists, skipping");
                report.record(entry, EntryAction::Skipped);
                continue;
            }

            match self.store.insert(NewCategory::from(entry)) {
                Ok(record) => {
                    tracing::debug!(category_type = %record.category_type, name = %record.name, id = %record.id, "staged");
                    report.record(entry, EntryAction::Inserted);
                }
                Err(e) if e.is_duplicate() => {
                    tracing::warn!(category_type = %entry.category_type, name = %entry.name, "inserted concurrently, skipping");
                    report.record(entry, EntryAction::SkippedConflict);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    fn abandon(&mut self, cause: &SeedError) {
        tracing::error!(error = %cause, "reconciliation failed, rolling back");
        if let Err(e) = self.store.rollback() {
            tracing::warn!(error = %e, "rollback failed");
        }
    }

    fn fill_counts(&self, report: &mut ReconciliationReport) -> Result<()> {
        for summary in report.per_type.iter_mut() {
            summary.active_count = self.store.count_active(&summary.category_type)?;
        }
        report.total_active = self.store.count_all_active()?;
        Ok(())
    }
}

/// Shorthand for `Reconciler::new(store).reconcile(catalog)`
pub fn reconcile<S: CategoryStore>(store: &mut S, catalog: &Catalog) -> Result<ReconciliationReport> {
    Reconciler::new(store).reconcile(catalog)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CategoryRecord;
    use crate::storage::{MemoryStore, SqliteStore};

    fn industry_subset() -> Catalog {
        Catalog::new().with_group(
            "industry",
            &[
                ("Technology", "Information technology and software"),
                ("Healthcare", "Medical and healthcare services"),
                ("Finance", "Banking and financial services"),
                ("Education", "Educational institutions and services"),
                ("Manufacturing", "Industrial manufacturing"),
            ],
        )
    }

    /// Wraps a store to simulate a concurrent writer or a failing insert
    struct FlakyStore {
        inner: MemoryStore,
        hide_existing: bool,
        fail_insert_after: Option<usize>,
        inserts: usize,
    }

    impl FlakyStore {
        fn new(inner: MemoryStore) -> Self {
            FlakyStore {
                inner,
                hide_existing: false,
                fail_insert_after: None,
                inserts: 0,
            }
        }
    }

    impl CategoryStore for FlakyStore {
        fn begin(&mut self) -> Result<()> {
            self.inner.begin()
        }

        fn find(&self, category_type: &str, name: &str) -> Result<Option<CategoryRecord>> {
            if self.hide_existing {
                return Ok(None);
            }
            self.inner.find(category_type, name)
        }

        fn insert(&mut self, record: NewCategory) -> Result<CategoryRecord> {
            if self.fail_insert_after == Some(self.inserts) {
                return Err(SeedError::Storage("connection reset".to_string()));
            }
            self.inserts += 1;
            self.inner.insert(record)
        }

        fn commit(&mut self) -> Result<()> {
            self.inner.commit()
        }

        fn rollback(&mut self) -> Result<()> {
            self.inner.rollback()
        }

        fn query_active(&self, category_type: &str) -> Result<Vec<CategoryRecord>> {
            self.inner.query_active(category_type)
        }

        fn count_active(&self, category_type: &str) -> Result<i64> {
            self.inner.count_active(category_type)
        }

        fn count_all_active(&self) -> Result<i64> {
            self.inner.count_all_active()
        }

        fn count_all(&self) -> Result<i64> {
            self.inner.count_all()
        }

        fn search(&self, query: &str, category_type: Option<&str>) -> Result<Vec<CategoryRecord>> {
            self.inner.search(query, category_type)
        }
    }

    #[test]
    fn test_industry_scenario_seed_then_rerun() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let catalog = industry_subset();

        let first = reconcile(&mut store, &catalog).unwrap();
        assert_eq!(first.inserted_count, 5);
        assert_eq!(first.skipped_count, 0);
        assert_eq!(store.count_active("industry").unwrap(), 5);
        assert_eq!(first.active_count("industry"), Some(5));

        let second = reconcile(&mut store, &catalog).unwrap();
        assert_eq!(second.inserted_count, 0);
        assert_eq!(second.skipped_count, 5);
        assert!(second.is_noop());
        assert_eq!(store.count_active("industry").unwrap(), 5);

        println!("✅ Industry scenario PASSED: {}", second.summary());
    }

    #[test]
    fn test_idempotence_with_builtin_catalog() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let catalog = Catalog::builtin();

        let first = reconcile(&mut store, &catalog).unwrap();
        let second = reconcile(&mut store, &catalog).unwrap();

        assert_eq!(first.inserted_count, 57);
        assert_eq!(second.inserted_count, 0);
        assert_eq!(second.skipped_count, 57);
        for (before, after) in first.per_type.iter().zip(second.per_type.iter()) {
            assert_eq!(before.category_type, after.category_type);
            assert_eq!(before.active_count, after.active_count);
        }
        assert_eq!(first.total_active, second.total_active);
    }

    #[test]
    fn test_completeness_counts_distinct_names() {
        let mut store = MemoryStore::new();
        let catalog = Catalog::new()
            .with_group("skills", &[("Rust", "first"), ("Go", ""), ("Rust", "second")])
            .with_group("role", &[("Tester", "")]);

        let report = reconcile(&mut store, &catalog).unwrap();

        for category_type in catalog.category_types() {
            assert_eq!(
                store.count_active(&category_type).unwrap(),
                catalog.distinct_names(&category_type).len() as i64
            );
        }
        assert_eq!(report.inserted_count, 3);
        assert_eq!(report.skipped_count, 1);
        assert_eq!(report.type_summary("skills").unwrap().skipped, 1);

        // First occurrence wins
        assert_eq!(store.find("skills", "Rust").unwrap().unwrap().description, "first");
    }

    #[test]
    fn test_no_duplication_after_repeated_runs() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let catalog = Catalog::builtin();

        for _ in 0..3 {
            reconcile(&mut store, &catalog).unwrap();
        }

        for category_type in catalog.category_types() {
            let records = store.query_active(&category_type).unwrap();
            let mut names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
            let before = names.len();
            names.dedup();
            assert_eq!(names.len(), before, "duplicate names under {}", category_type);
        }
        assert_eq!(store.count_all_active().unwrap(), 57);
    }

    #[test]
    fn test_commit_failure_leaves_no_rows() {
        let existing = NewCategory::from(&crate::catalog::CategoryEntry::new(
            "industry",
            "Retail",
            "Retail and consumer goods",
        ))
        .into_record();
        let mut store = MemoryStore::with_records(vec![existing]);
        store.fail_next_commit("storage went away");

        let err = reconcile(&mut store, &industry_subset()).unwrap_err();

        assert!(matches!(err, SeedError::CommitFailure(_)));
        assert_eq!(store.count_active("industry").unwrap(), 1);
        assert_eq!(store.staged_len(), 0);
        assert_eq!(store.commit_count(), 0);
    }

    #[test]
    fn test_staging_failure_rolls_back_batch() {
        let mut store = FlakyStore::new(MemoryStore::new());
        store.fail_insert_after = Some(2);

        let err = reconcile(&mut store, &industry_subset()).unwrap_err();

        assert!(matches!(err, SeedError::Storage(_)));
        assert_eq!(store.count_active("industry").unwrap(), 0);
        assert!(store.inner.committed().is_empty());
    }

    #[test]
    fn test_concurrent_duplicate_is_skipped() {
        let mut store = FlakyStore::new(MemoryStore::new());
        let catalog = industry_subset();

        reconcile(&mut store, &catalog).unwrap();

        // Existence check misses every row, as if another process inserted them
        store.hide_existing = true;
        let report = reconcile(&mut store, &catalog).unwrap();

        assert_eq!(report.inserted_count, 0);
        assert_eq!(report.skipped_count, 5);
        assert!(report
            .outcomes
            .iter()
            .all(|o| o.action == EntryAction::SkippedConflict));
        assert_eq!(store.count_active("industry").unwrap(), 5);
    }

    #[test]
    fn test_rerun_on_partly_seeded_table_adds_missing_entries() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let seed = Catalog::new().with_group("industry", &[("Technology", "")]);
        reconcile(&mut store, &seed).unwrap();

        let report = reconcile(&mut store, &industry_subset()).unwrap();

        assert_eq!(report.existing_before, 1);
        assert_eq!(report.inserted_count, 4);
        assert_eq!(report.skipped_count, 1);
        assert_eq!(report.outcomes[0].action, EntryAction::Skipped);
        assert_eq!(report.active_count("industry"), Some(5));
        assert_eq!(store.count_active("industry").unwrap(), 5);
    }

    #[test]
    fn test_soft_deleted_record_counts_as_existing() {
        let mut retired = NewCategory::from(&crate::catalog::CategoryEntry::new(
            "industry",
            "Finance",
            "old",
        ))
        .into_record();
        retired.is_active = false;
        let mut store = MemoryStore::with_records(vec![retired]);

        let report = reconcile(&mut store, &industry_subset()).unwrap();

        assert_eq!(report.inserted_count, 4);
        assert_eq!(report.skipped_count, 1);
        assert!(report
            .outcomes
            .iter()
            .any(|o| o.name == "Finance" && o.action == EntryAction::Skipped));
        assert_eq!(store.count_active("industry").unwrap(), 4);
        assert_eq!(store.committed().len(), 5);

        let finance = store.find("industry", "Finance").unwrap().unwrap();
        assert!(!finance.is_active);
        assert_eq!(finance.description, "old");
    }

    #[test]
    fn test_soft_deleted_row_in_sqlite_is_not_reinserted() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .connection()
            .execute(
                "INSERT INTO categories (id, category_type, name, description, is_active, created_at)
                 VALUES ('retired-1', 'industry', 'Finance', 'old', 0, '2024-01-01T00:00:00Z')",
                [],
            )
            .unwrap();

        let report = reconcile(&mut store, &industry_subset()).unwrap();

        assert_eq!(report.inserted_count, 4);
        assert_eq!(report.skipped_count, 1);
        assert_eq!(store.count_active("industry").unwrap(), 4);
        assert_eq!(store.count_all().unwrap(), 5);
    }

    #[test]
    fn test_sqlite_commit_failure_leaves_no_rows() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        reconcile(&mut store, &Catalog::new().with_group("industry", &[("Retail", "")])).unwrap();
        arm_deferred_commit_failure(&mut store);

        let err = reconcile(&mut store, &industry_subset()).unwrap_err();

        assert!(matches!(err, SeedError::CommitFailure(_)));
        assert_eq!(store.count_active("industry").unwrap(), 1);
        assert!(store.find("industry", "Technology").unwrap().is_none());
        assert!(!store.in_batch());
        assert!(store.connection().is_autocommit());
    }

    /// Opens a batch holding a deferred foreign-key violation so the next
    /// COMMIT is refused by SQLite
    fn arm_deferred_commit_failure(store: &mut SqliteStore) {
        store
            .connection()
            .execute_batch(
                "PRAGMA foreign_keys = ON;
                 CREATE TABLE parents (id TEXT PRIMARY KEY);
                 CREATE TABLE children (
                     parent_id TEXT REFERENCES parents(id) DEFERRABLE INITIALLY DEFERRED
                 );",
            )
            .unwrap();
        store.begin().unwrap();
        store
            .connection()
            .execute("INSERT INTO children (parent_id) VALUES ('missing')", [])
            .unwrap();
    }

    #[test]
    fn test_outcomes_follow_catalog_order() {
        let mut store = MemoryStore::new();
        let catalog = Catalog::new()
            .with_group("skills", &[("SQL", "")])
            .with_group("education", &[("PhD", ""), ("MBA", "")]);

        let report = reconcile(&mut store, &catalog).unwrap();

        let names: Vec<&str> = report.outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["SQL", "PhD", "MBA"]);
        let types: Vec<&str> = report.per_type.iter().map(|s| s.category_type.as_str()).collect();
        assert_eq!(types, vec!["skills", "education"]);
        assert_eq!(store.commit_count(), 1);
    }

    #[test]
    fn test_empty_catalog_commits_nothing() {
        let mut store = MemoryStore::new();

        let report = reconcile(&mut store, &Catalog::new()).unwrap();

        assert!(report.is_noop());
        assert!(report.per_type.is_empty());
        assert_eq!(report.total_active, 0);
        assert_eq!(store.commit_count(), 0);
    }
}
