//! Process-wide tenant seed registry
//!
//! Lifecycle per tenant: create once, read many, never update. The registry
//! only exposes [`SeedRegistry::get_or_create_seed`]; there is no rotate or
//! remove, because a new seed would silently change every abstracted id and
//! sever traceability to everything already ingested.

use crate::error::SeedError;
use crate::seed::{SeedRecord, TenantSeed};
use crate::store::{InsertOutcome, MemorySeedStore, SeedStore};
use dashmap::DashMap;
use std::sync::Arc;
use twin_model::TenantId;

/// Keyed registry of tenant seeds in front of a [`SeedStore`]
#[derive(Debug)]
pub struct SeedRegistry {
    store: Arc<dyn SeedStore>,
    cache: DashMap<TenantId, TenantSeed>,
}

impl SeedRegistry {
    /// Create registry over a store
    #[must_use]
    pub fn new(store: Arc<dyn SeedStore>) -> Self {
        Self {
            store,
            cache: DashMap::new(),
        }
    }

    /// Registry backed by a process-local memory store
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySeedStore::new()))
    }

    /// Return the tenant's seed, creating and persisting it on first use
    ///
    /// Concurrent first calls for the same tenant race on the store's
    /// insert-if-absent; every caller ends up with the winner's seed.
    ///
    /// # Errors
    /// Returns error for a blank tenant id or a store failure
    pub fn get_or_create_seed(&self, tenant: &TenantId) -> Result<TenantSeed, SeedError> {
        if tenant.as_str().trim().is_empty() {
            return Err(SeedError::InvalidTenant(tenant.to_string()));
        }

        if let Some(seed) = self.cache.get(tenant) {
            return Ok(*seed);
        }

        let record = match self.store.load(tenant)? {
            Some(record) => record,
            None => match self.store.insert_if_absent(SeedRecord::generate(tenant.clone()))? {
                InsertOutcome::Inserted(record) => {
                    tracing::info!(
                        tenant = %tenant,
                        fingerprint = %record.seed.fingerprint(),
                        "created tenant seed"
                    );
                    record
                }
                InsertOutcome::Conflict { winner } => {
                    tracing::debug!(
                        tenant = %tenant,
                        fingerprint = %winner.seed.fingerprint(),
                        "lost seed creation race, adopting stored seed"
                    );
                    winner
                }
            },
        };

        let seed = *self.cache.entry(tenant.clone()).or_insert(record.seed);
        Ok(seed)
    }

    /// Tenants whose seed has been resolved by this registry
    #[must_use]
    pub fn cached_tenants(&self) -> Vec<TenantId> {
        let mut tenants: Vec<_> = self.cache.iter().map(|e| e.key().clone()).collect();
        tenants.sort();
        tenants
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn same_tenant_same_seed() {
        let registry = SeedRegistry::in_memory();
        let tenant = TenantId::new("contoso");
        let a = registry.get_or_create_seed(&tenant).unwrap();
        let b = registry.get_or_create_seed(&tenant).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_tenants_get_different_seeds() {
        let registry = SeedRegistry::in_memory();
        let a = registry.get_or_create_seed(&TenantId::new("a")).unwrap();
        let b = registry.get_or_create_seed(&TenantId::new("b")).unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.cached_tenants().len(), 2);
    }

    #[test]
    fn blank_tenant_is_rejected() {
        let registry = SeedRegistry::in_memory();
        let result = registry.get_or_create_seed(&TenantId::new("  "));
        assert!(matches!(result, Err(SeedError::InvalidTenant(_))));
    }

    #[test]
    fn registries_sharing_a_store_agree() {
        let store: Arc<dyn SeedStore> = Arc::new(MemorySeedStore::new());
        let tenant = TenantId::new("shared");

        let seeds: Vec<TenantSeed> = (0..8)
            .map(|_| {
                let registry = SeedRegistry::new(Arc::clone(&store));
                let tenant = tenant.clone();
                thread::spawn(move || registry.get_or_create_seed(&tenant).unwrap())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        assert!(seeds.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn file_store_seed_survives_new_registry() {
        let dir = tempfile::tempdir().unwrap();
        let tenant = TenantId::new("t1");

        let first = SeedRegistry::new(Arc::new(
            crate::store::FileSeedStore::open(dir.path()).unwrap(),
        ))
        .get_or_create_seed(&tenant)
        .unwrap();

        let second = SeedRegistry::new(Arc::new(
            crate::store::FileSeedStore::open(dir.path()).unwrap(),
        ))
        .get_or_create_seed(&tenant)
        .unwrap();

        assert_eq!(first, second);
    }
}
