//! Hierarchical cache keys.
//!
//! A [`QueryKey`] is `[resource, scope, ...qualifiers]`. Keys compare
//! structurally, so two list queries with equivalent filters share a
//! cache slot, and invalidating a prefix such as `[agents, list]` reaches
//! every filter variant without touching `[agents, detail, *]`.

use std::collections::BTreeMap;
use std::fmt;

use sca_core::models::SpyCatFilters;
use sca_core::types::{DbId, TargetId};

/// One segment of a [`QueryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    Str(String),
    Int(i64),
    /// Named qualifiers, e.g. a filter set. Ordered so equal maps hash equally.
    Map(BTreeMap<String, String>),
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        KeyPart::Str(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        KeyPart::Str(value)
    }
}

impl From<i64> for KeyPart {
    fn from(value: i64) -> Self {
        KeyPart::Int(value)
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Str(s) => f.write_str(s),
            KeyPart::Int(i) => write!(f, "{i}"),
            KeyPart::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Address of a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<KeyPart>);

impl QueryKey {
    pub fn new(resource: &str) -> Self {
        Self(vec![KeyPart::from(resource)])
    }

    /// Append a segment, returning the extended key.
    pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
        self.0.push(part.into());
        self
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    /// True when `prefix` matches the leading segments of this key.
    /// Every key starts with itself.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Key factories
// ---------------------------------------------------------------------------

pub mod spy_cat_keys {
    use super::*;

    pub fn all() -> QueryKey {
        QueryKey::new("agents")
    }

    pub fn lists() -> QueryKey {
        all().with("list")
    }

    /// Unset filters are left out, so `{breed: Bengal}` and
    /// `{breed: Bengal, query: None}` are the same key.
    pub fn list(filters: &SpyCatFilters) -> QueryKey {
        let map = filters
            .query_pairs()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        lists().with(KeyPart::Map(map))
    }

    pub fn details() -> QueryKey {
        all().with("detail")
    }

    pub fn detail(id: DbId) -> QueryKey {
        details().with(id)
    }

    pub fn available() -> QueryKey {
        all().with("available")
    }

    pub fn stats() -> QueryKey {
        all().with("stats")
    }

    pub fn searches() -> QueryKey {
        all().with("search")
    }

    pub fn search(query: &str) -> QueryKey {
        searches().with(query)
    }
}

pub mod mission_keys {
    use super::*;

    pub fn all() -> QueryKey {
        QueryKey::new("missions")
    }

    pub fn lists() -> QueryKey {
        all().with("list")
    }

    /// Missions have no list filters; the empty map keeps the key shape
    /// aligned with agent lists.
    pub fn list() -> QueryKey {
        lists().with(KeyPart::Map(BTreeMap::new()))
    }

    pub fn details() -> QueryKey {
        all().with("detail")
    }

    pub fn detail(id: DbId) -> QueryKey {
        details().with(id)
    }
}

pub mod target_keys {
    use super::*;

    pub fn all() -> QueryKey {
        QueryKey::new("targets")
    }

    pub fn lists() -> QueryKey {
        all().with("list")
    }

    /// The unfiltered list is `lists()` itself; per-mission lists extend it.
    pub fn list(mission_id: Option<DbId>) -> QueryKey {
        match mission_id {
            Some(id) => lists().with("mission").with(id),
            None => lists(),
        }
    }

    pub fn details() -> QueryKey {
        all().with("detail")
    }

    pub fn detail(id: &TargetId) -> QueryKey {
        details().with(id.as_str())
    }
}

pub mod breed_keys {
    use super::*;

    pub fn all() -> QueryKey {
        QueryKey::new("breeds")
    }
}
