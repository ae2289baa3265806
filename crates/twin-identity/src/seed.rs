//! Tenant seeds
//!
//! A [`TenantSeed`] is 256 bits of OS-sourced randomness that keys every
//! identifier abstraction for one tenant. It is created once and never
//! changes; there is deliberately no way to rotate it.

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Formatter};
use twin_model::{Digest, TenantId};

/// Seed length in bytes
pub const SEED_LEN: usize = 32;

/// Per-tenant abstraction key
///
/// `Debug` never prints the key material; use [`TenantSeed::fingerprint`]
/// to correlate seeds in logs.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TenantSeed([u8; SEED_LEN]);

impl TenantSeed {
    /// Generate a fresh random seed
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; SEED_LEN];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Wrap existing key material
    #[inline]
    #[must_use]
    pub const fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self(bytes)
    }

    /// Key material for keyed hashing
    #[inline]
    #[must_use]
    pub const fn as_key(&self) -> &[u8; SEED_LEN] {
        &self.0
    }

    /// Non-reversible short tag safe to log
    #[must_use]
    pub fn fingerprint(&self) -> String {
        Digest::keyed(&self.0, &[b"twin/seed/fingerprint"]).short()
    }
}

impl Debug for TenantSeed {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "TenantSeed(<redacted {}>)", self.fingerprint())
    }
}

impl Serialize for TenantSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for TenantSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        let arr: [u8; SEED_LEN] = bytes.try_into().map_err(|v: Vec<u8>| {
            serde::de::Error::invalid_length(v.len(), &"32 bytes of seed material")
        })?;
        Ok(Self(arr))
    }
}

/// Persisted seed with provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRecord {
    /// Owning tenant
    pub tenant_id: TenantId,
    /// The seed itself
    pub seed: TenantSeed,
    /// When the seed was first created
    pub created_at: DateTime<Utc>,
}

impl SeedRecord {
    /// Create a record holding a freshly generated seed
    #[must_use]
    pub fn generate(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            seed: TenantSeed::generate(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_seeds_differ() {
        assert_ne!(TenantSeed::generate(), TenantSeed::generate());
    }

    #[test]
    fn debug_is_redacted() {
        let seed = TenantSeed::from_bytes([0xab; SEED_LEN]);
        let rendered = format!("{seed:?}");
        assert!(!rendered.contains(&hex::encode([0xab; SEED_LEN])));
        assert!(rendered.contains(&seed.fingerprint()));
    }

    #[test]
    fn record_serde_keeps_seed() {
        let record = SeedRecord::generate(TenantId::new("t1"));
        let json = serde_json::to_string(&record).unwrap();
        let back: SeedRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn rejects_short_seed_material() {
        let result: Result<TenantSeed, _> = serde_json::from_str("\"abcd\"");
        assert!(result.is_err());
    }
}
