//! Seed stores
//!
//! A [`SeedStore`] persists one [`SeedRecord`] per tenant and offers a single
//! write primitive: insert-if-absent. Racing creators all call it; exactly
//! one wins and every loser is handed the winner's record.

use crate::error::SeedError;
use crate::seed::SeedRecord;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt::Debug;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use twin_model::{Digest, TenantId};

/// Result of an insert-if-absent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The offered record was stored
    Inserted(SeedRecord),
    /// Another creator got there first; the stored record is returned
    Conflict {
        /// Record that won the race
        winner: SeedRecord,
    },
}

impl InsertOutcome {
    /// The record now in the store, regardless of who wrote it
    #[inline]
    #[must_use]
    pub fn into_record(self) -> SeedRecord {
        match self {
            Self::Inserted(record) | Self::Conflict { winner: record } => record,
        }
    }

    /// Whether the offered record lost a race
    #[inline]
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Persistence backend for tenant seeds
///
/// There is no update or delete: records are create-once, read-many.
pub trait SeedStore: Send + Sync + Debug {
    /// Load a tenant's record if one exists
    ///
    /// # Errors
    /// Returns error on I/O failure or a corrupt record
    fn load(&self, tenant: &TenantId) -> Result<Option<SeedRecord>, SeedError>;

    /// Store `record` unless the tenant already has one
    ///
    /// # Errors
    /// Returns error on I/O failure; a lost race is not an error
    fn insert_if_absent(&self, record: SeedRecord) -> Result<InsertOutcome, SeedError>;
}

/// Process-local store backed by a concurrent map
#[derive(Debug, Default)]
pub struct MemorySeedStore {
    records: DashMap<TenantId, SeedRecord>,
}

impl MemorySeedStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tenants
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no tenant has a seed yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl SeedStore for MemorySeedStore {
    fn load(&self, tenant: &TenantId) -> Result<Option<SeedRecord>, SeedError> {
        Ok(self.records.get(tenant).map(|entry| entry.value().clone()))
    }

    fn insert_if_absent(&self, record: SeedRecord) -> Result<InsertOutcome, SeedError> {
        match self.records.entry(record.tenant_id.clone()) {
            Entry::Occupied(existing) => Ok(InsertOutcome::Conflict {
                winner: existing.get().clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(InsertOutcome::Inserted(record))
            }
        }
    }
}

/// Directory-backed store, one JSON file per tenant
///
/// File names are the Blake3 digest of the tenant id, so arbitrary tenant
/// strings cannot escape the directory. Records are staged in a temp file and
/// linked into place with no-clobber semantics, which makes the file system
/// itself the insert-if-absent arbiter across processes.
#[derive(Debug, Clone)]
pub struct FileSeedStore {
    dir: PathBuf,
}

impl FileSeedStore {
    /// Open (and create if needed) a seed directory
    ///
    /// # Errors
    /// Returns error if the directory cannot be created
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, SeedError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Seed directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, tenant: &TenantId) -> PathBuf {
        let digest = Digest::compute(tenant.as_str().as_bytes());
        self.dir.join(format!("{digest}.seed.json"))
    }

    fn read_record(path: &Path, tenant: &TenantId) -> Result<SeedRecord, SeedError> {
        let text = fs::read_to_string(path)?;
        let record: SeedRecord =
            serde_json::from_str(&text).map_err(|e| SeedError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        if &record.tenant_id != tenant {
            return Err(SeedError::Corrupt {
                path: path.to_path_buf(),
                reason: format!(
                    "record belongs to tenant '{}', expected '{}'",
                    record.tenant_id, tenant
                ),
            });
        }
        Ok(record)
    }
}

impl SeedStore for FileSeedStore {
    fn load(&self, tenant: &TenantId) -> Result<Option<SeedRecord>, SeedError> {
        let path = self.path_for(tenant);
        match Self::read_record(&path, tenant) {
            Ok(record) => Ok(Some(record)),
            Err(SeedError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn insert_if_absent(&self, record: SeedRecord) -> Result<InsertOutcome, SeedError> {
        let path = self.path_for(&record.tenant_id);

        let mut staged = tempfile::NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer_pretty(&mut staged, &record)?;
        staged.flush()?;
        staged.as_file().sync_all()?;

        match staged.persist_noclobber(&path) {
            Ok(_) => Ok(InsertOutcome::Inserted(record)),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                let winner = Self::read_record(&path, &record.tenant_id)?;
                Ok(InsertOutcome::Conflict { winner })
            }
            Err(e) => Err(SeedError::Io(e.error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_first_insert_wins() {
        let store = MemorySeedStore::new();
        let first = SeedRecord::generate(TenantId::new("t1"));
        let second = SeedRecord::generate(TenantId::new("t1"));

        assert_eq!(
            store.insert_if_absent(first.clone()).unwrap(),
            InsertOutcome::Inserted(first.clone())
        );
        let outcome = store.insert_if_absent(second).unwrap();
        assert!(outcome.is_conflict());
        assert_eq!(outcome.into_record(), first);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn file_store_persists_and_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSeedStore::open(dir.path()).unwrap();
        let tenant = TenantId::new("../../etc/passwd");

        assert_eq!(store.load(&tenant).unwrap(), None);

        let first = SeedRecord::generate(tenant.clone());
        store.insert_if_absent(first.clone()).unwrap();

        let outcome = store
            .insert_if_absent(SeedRecord::generate(tenant.clone()))
            .unwrap();
        assert_eq!(outcome, InsertOutcome::Conflict { winner: first.clone() });

        // Survives a reopen
        let reopened = FileSeedStore::open(dir.path()).unwrap();
        assert_eq!(reopened.load(&tenant).unwrap(), Some(first));

        // Tenant strings never leave the directory
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn file_store_reports_corrupt_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSeedStore::open(dir.path()).unwrap();
        let tenant = TenantId::new("t1");
        fs::write(store.path_for(&tenant), "not json").unwrap();

        assert!(matches!(store.load(&tenant), Err(SeedError::Corrupt { .. })));
    }
}
