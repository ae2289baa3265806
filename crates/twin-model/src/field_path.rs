//! Field paths for addressing values inside JSON property bags
//!
//! Provides [`FieldPath`]: dot-separated keys where a trailing `[]` fans out
//! over every element of an array.
//!
//! # Examples
//! - `id` → top-level `id`
//! - `ipConfigurations[].subnet.id` → `subnet.id` of every ip configuration

use serde_json::Value;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// One step of a [`FieldPath`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Object key lookup
    Key(String),
    /// Fan out over array elements
    Each,
}

/// Path into a JSON value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    /// Path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Collect every string reachable through this path
    ///
    /// A leaf holding an array of strings yields each element.
    #[must_use]
    pub fn strings<'a>(&self, value: &'a Value) -> Vec<&'a str> {
        let mut out = Vec::new();
        collect(&self.0, value, &mut out);
        out
    }

    /// Visit every string reachable through this path mutably
    ///
    /// Returns the number of strings visited. Missing keys and non-string
    /// leaves are skipped.
    ///
    /// # Errors
    /// Stops at and returns the first error produced by `f`
    pub fn visit_strings_mut<F, E>(&self, value: &mut Value, f: &mut F) -> Result<usize, E>
    where
        F: FnMut(&mut String) -> Result<(), E>,
    {
        visit_mut(&self.0, value, f)
    }
}

fn collect<'a>(segments: &[Segment], value: &'a Value, out: &mut Vec<&'a str>) {
    match segments.split_first() {
        None => match value {
            Value::String(s) => out.push(s),
            Value::Array(items) => out.extend(items.iter().filter_map(Value::as_str)),
            _ => {}
        },
        Some((Segment::Key(key), rest)) => {
            if let Some(child) = value.get(key) {
                collect(rest, child, out);
            }
        }
        Some((Segment::Each, rest)) => {
            if let Value::Array(items) = value {
                for item in items {
                    collect(rest, item, out);
                }
            }
        }
    }
}

fn visit_mut<F, E>(segments: &[Segment], value: &mut Value, f: &mut F) -> Result<usize, E>
where
    F: FnMut(&mut String) -> Result<(), E>,
{
    match segments.split_first() {
        None => match value {
            Value::String(s) => f(s).map(|()| 1),
            Value::Array(items) => {
                let mut count = 0;
                for item in items {
                    if let Value::String(s) = item {
                        f(s)?;
                        count += 1;
                    }
                }
                Ok(count)
            }
            _ => Ok(0),
        },
        Some((Segment::Key(key), rest)) => match value.get_mut(key) {
            Some(child) => visit_mut(rest, child, f),
            None => Ok(0),
        },
        Some((Segment::Each, rest)) => {
            let mut count = 0;
            if let Value::Array(items) = value {
                for item in items {
                    count += visit_mut(rest, item, f)?;
                }
            }
            Ok(count)
        }
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.0 {
            match segment {
                Segment::Key(key) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                Segment::Each => f.write_str("[]")?,
            }
            first = false;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = FieldPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(FieldPathError::Empty);
        }

        let mut segments = Vec::new();
        for raw in s.split('.') {
            let (key, fan_out) = match raw.strip_suffix("[]") {
                Some(key) => (key, true),
                None => (raw, false),
            };
            if key.is_empty() {
                return Err(FieldPathError::EmptySegment(s.to_string()));
            }
            if key.contains(['[', ']']) {
                return Err(FieldPathError::InvalidSegment(raw.to_string()));
            }
            segments.push(Segment::Key(key.to_string()));
            if fan_out {
                segments.push(Segment::Each);
            }
        }
        Ok(Self(segments))
    }
}

impl serde::Serialize for FieldPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for FieldPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Field path parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldPathError {
    /// Empty path string
    #[error("empty field path")]
    Empty,

    /// Empty segment (e.g. `a..b`)
    #[error("empty segment in field path '{0}'")]
    EmptySegment(String),

    /// Stray brackets
    #[error("invalid field path segment '{0}'")]
    InvalidSegment(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_and_display_round_trip() {
        let path: FieldPath = "ipConfigurations[].subnet.id".parse().unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::Key("ipConfigurations".into()),
                Segment::Each,
                Segment::Key("subnet".into()),
                Segment::Key("id".into()),
            ]
        );
        assert_eq!(path.to_string(), "ipConfigurations[].subnet.id");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert_eq!("".parse::<FieldPath>(), Err(FieldPathError::Empty));
        assert!(matches!("a..b".parse::<FieldPath>(), Err(FieldPathError::EmptySegment(_))));
        assert!(matches!("a[0]".parse::<FieldPath>(), Err(FieldPathError::InvalidSegment(_))));
    }

    #[test]
    fn strings_fans_out_over_arrays() {
        let value = json!({
            "ipConfigurations": [
                {"subnet": {"id": "s1"}},
                {"subnet": {"id": "s2"}},
                {"noSubnet": true}
            ]
        });
        let path: FieldPath = "ipConfigurations[].subnet.id".parse().unwrap();
        assert_eq!(path.strings(&value), vec!["s1", "s2"]);
    }

    #[test]
    fn visit_mut_rewrites_leaves_and_string_arrays() {
        let mut value = json!({"dnsServers": ["a", "b", 3], "id": "x"});
        let path: FieldPath = "dnsServers".parse().unwrap();
        let visited = path
            .visit_strings_mut(&mut value, &mut |s: &mut String| {
                s.make_ascii_uppercase();
                Ok::<(), ()>(())
            })
            .unwrap();
        assert_eq!(visited, 2);
        assert_eq!(value, json!({"dnsServers": ["A", "B", 3], "id": "x"}));
    }

    #[test]
    fn visit_mut_skips_missing_keys() {
        let mut value = json!({"other": 1});
        let path: FieldPath = "subnet.id".parse().unwrap();
        let visited = path
            .visit_strings_mut(&mut value, &mut |_: &mut String| Ok::<(), ()>(()))
            .unwrap();
        assert_eq!(visited, 0);
    }
}
