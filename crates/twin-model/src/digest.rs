//! Blake3 digest primitives
//!
//! Provides [`Digest`], a strongly-typed 32-byte hash used both for plain
//! content addressing (manifest checksums, file names) and for keyed hashing
//! (tenant-seeded identifier abstraction).

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A 32-byte Blake3 digest
///
/// Immutable and cheap to clone (Copy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Create a digest from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get reference to the underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Create digest from byte slice
    ///
    /// # Errors
    /// Returns error if slice length is not exactly 32 bytes
    #[inline]
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DigestError> {
        if bytes.len() != 32 {
            return Err(DigestError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Unkeyed Blake3 hash of arbitrary data
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self::new(*blake3::hash(data).as_bytes())
    }

    /// Keyed Blake3 hash (MAC mode) of the given parts
    ///
    /// Parts are length-prefixed so `["ab", "c"]` and `["a", "bc"]` never
    /// collide.
    #[must_use]
    pub fn keyed(key: &[u8; 32], parts: &[&[u8]]) -> Self {
        let mut hasher = blake3::Hasher::new_keyed(key);
        for part in parts {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part);
        }
        Self::new(*hasher.finalize().as_bytes())
    }

    /// Lowercase hex of the first `bytes` bytes (clamped to 32)
    #[inline]
    #[must_use]
    pub fn truncated_hex(&self, bytes: usize) -> String {
        hex::encode(&self.0[..bytes.min(32)])
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        self.truncated_hex(8)
    }
}

impl Display for Digest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Digest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }
}

impl serde::Serialize for Digest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when working with digests
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    /// Invalid digest length
    #[error("invalid digest length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Hex encoding error
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_is_deterministic() {
        assert_eq!(Digest::compute(b"hello"), Digest::compute(b"hello"));
        assert_ne!(Digest::compute(b"hello"), Digest::compute(b"world"));
    }

    #[test]
    fn keyed_depends_on_key() {
        let a = Digest::keyed(&[1u8; 32], &[b"vm1"]);
        let b = Digest::keyed(&[2u8; 32], &[b"vm1"]);
        assert_ne!(a, b);
        assert_eq!(a, Digest::keyed(&[1u8; 32], &[b"vm1"]));
    }

    #[test]
    fn keyed_parts_are_length_prefixed() {
        let key = [7u8; 32];
        let a = Digest::keyed(&key, &[b"ab", b"c"]);
        let b = Digest::keyed(&key, &[b"a", b"bc"]);
        assert_ne!(a, b);
    }

    #[test]
    fn truncated_hex_clamps() {
        let d = Digest::compute(b"x");
        assert_eq!(d.truncated_hex(4).len(), 8);
        assert_eq!(d.truncated_hex(64).len(), 64);
        assert!(d.to_string().starts_with(&d.short()));
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        let result = Digest::from_slice(&[0u8; 31]);
        assert!(matches!(
            result,
            Err(DigestError::InvalidLength { expected: 32, actual: 31 })
        ));
    }

    #[test]
    fn display_parses_back() {
        let d = Digest::compute(b"test");
        let parsed: Digest = d.to_string().parse().unwrap();
        assert_eq!(d, parsed);
    }
}
