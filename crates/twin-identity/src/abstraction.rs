//! Deterministic, tenant-seeded identifier abstraction
//!
//! `abstract_id(seed, original)` is a pure function of its inputs: a keyed
//! Blake3 hash of the original identifier under the tenant seed, encoded back
//! into an identifier shape.
//!
//! Two shapes are recognized:
//!
//! - **Resource paths** (`/subscriptions/<v>/resourceGroups/<v>/providers/<ns>/<type>/<v>`):
//!   keys and the provider namespace are kept, every value is replaced by the
//!   keyed digest of the path prefix ending at that value. A subnet id and
//!   its parent network's id therefore still share the abstracted prefix.
//! - **Opaque ids** (anything else): `anon-<hex>`.

use crate::error::AbstractionError;
use crate::seed::TenantSeed;
use twin_model::{AbstractedId, Digest};

/// Smallest accepted digest width in bytes
pub const MIN_DIGEST_BYTES: usize = 16;

/// Largest accepted digest width in bytes
pub const MAX_DIGEST_BYTES: usize = 32;

/// Prefix of abstracted opaque identifiers
pub const OPAQUE_PREFIX: &str = "anon-";

const DOMAIN: &[u8] = b"twin/id/v1";
const KIND_PATH: &[u8] = b"path";
const KIND_OPAQUE: &[u8] = b"opaque";
const PROVIDERS_KEY: &str = "providers";

/// Identifier abstraction service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdAbstractor {
    digest_bytes: usize,
    case_insensitive_paths: bool,
}

impl Default for IdAbstractor {
    fn default() -> Self {
        Self {
            digest_bytes: MIN_DIGEST_BYTES,
            case_insensitive_paths: true,
        }
    }
}

impl IdAbstractor {
    /// Create with defaults (128-bit digests, case-insensitive paths)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Digest width encoded into each abstracted value, clamped to
    /// [`MIN_DIGEST_BYTES`]..=[`MAX_DIGEST_BYTES`]
    #[inline]
    #[must_use]
    pub fn with_digest_bytes(mut self, bytes: usize) -> Self {
        self.digest_bytes = bytes.clamp(MIN_DIGEST_BYTES, MAX_DIGEST_BYTES);
        self
    }

    /// Whether path-shaped ids differing only in ASCII case map to the same
    /// abstracted id (cloud resource paths are case-insensitive)
    #[inline]
    #[must_use]
    pub fn with_case_insensitive_paths(mut self, enabled: bool) -> Self {
        self.case_insensitive_paths = enabled;
        self
    }

    /// Configured digest width
    #[inline]
    #[must_use]
    pub fn digest_bytes(&self) -> usize {
        self.digest_bytes
    }

    /// Abstract one identifier
    ///
    /// # Errors
    /// Returns [`AbstractionError::InvalidIdentifier`] for empty, padded,
    /// control-character, or structurally malformed path identifiers
    pub fn abstract_id(
        &self,
        seed: &TenantSeed,
        original: &str,
    ) -> Result<AbstractedId, AbstractionError> {
        if original.trim().is_empty() {
            return Err(AbstractionError::invalid(original, "identifier is empty"));
        }
        if original.trim() != original {
            return Err(AbstractionError::invalid(
                original,
                "identifier has leading or trailing whitespace",
            ));
        }
        if original.chars().any(char::is_control) {
            return Err(AbstractionError::invalid(
                original,
                "identifier contains control characters",
            ));
        }

        match original.strip_prefix('/') {
            Some(path) => self.abstract_path(seed, original, path),
            None => {
                let digest = Digest::keyed(
                    seed.as_key(),
                    &[DOMAIN, KIND_OPAQUE, original.as_bytes()],
                );
                Ok(AbstractedId::new(format!(
                    "{OPAQUE_PREFIX}{}",
                    digest.truncated_hex(self.digest_bytes)
                )))
            }
        }
    }

    fn abstract_path(
        &self,
        seed: &TenantSeed,
        original: &str,
        path: &str,
    ) -> Result<AbstractedId, AbstractionError> {
        let segments: Vec<&str> = path.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(AbstractionError::invalid(
                original,
                "resource path contains an empty segment",
            ));
        }

        let mut out = String::with_capacity(original.len() + 64);
        let mut canonical_prefix = String::with_capacity(original.len());
        let mut iter = segments.iter();

        while let Some(&key) = iter.next() {
            push_segment(&mut out, key);
            push_segment(&mut canonical_prefix, &self.canonical(key));

            let Some(&value) = iter.next() else {
                return Err(AbstractionError::invalid(
                    original,
                    format!("resource path ends with key '{key}' without a value"),
                ));
            };

            if key.eq_ignore_ascii_case(PROVIDERS_KEY) {
                // Provider namespace is schema, not identity
                push_segment(&mut out, value);
                push_segment(&mut canonical_prefix, &self.canonical(value));
                continue;
            }

            push_segment(&mut canonical_prefix, &self.canonical(value));
            let digest = Digest::keyed(
                seed.as_key(),
                &[DOMAIN, KIND_PATH, canonical_prefix.as_bytes()],
            );
            push_segment(&mut out, &digest.truncated_hex(self.digest_bytes));
        }

        Ok(AbstractedId::new(out))
    }

    fn canonical(&self, segment: &str) -> String {
        if self.case_insensitive_paths {
            segment.to_ascii_lowercase()
        } else {
            segment.to_string()
        }
    }
}

fn push_segment(buf: &mut String, segment: &str) {
    buf.push('/');
    buf.push_str(segment);
}
