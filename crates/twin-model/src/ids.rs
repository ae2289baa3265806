//! Identifier newtypes
//!
//! Every identifier declares which representation it belongs to, so an
//! original id can never be passed where an abstracted id is expected.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw string
            #[inline]
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the raw string
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume into the raw string
            #[inline]
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Real, source-issued resource identifier
    OriginalId
);

string_id!(
    /// Synthetic identifier derived from a tenant seed and an original id
    AbstractedId
);

string_id!(
    /// Tenant identifier (governs which seed is used)
    TenantId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_transparently() {
        let id = OriginalId::new("/subscriptions/s1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"/subscriptions/s1\"");
        let back: OriginalId = serde_json::from_str("\"/subscriptions/s1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn display_matches_inner() {
        let id = AbstractedId::from("anon-abc");
        assert_eq!(id.to_string(), "anon-abc");
        assert_eq!(id.as_str(), "anon-abc");
    }
}
