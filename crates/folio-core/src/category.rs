//! Category mapping: discussion thread → human-readable subject label.
//!
//! The mapping is immutable and injected at construction (explicit config,
//! not global state). A lookup miss is a rejection of the upload, never a
//! crash.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::models::ThreadId;

/// Immutable thread-to-category table.
#[derive(Debug, Clone, Default)]
pub struct CategoryMap {
    inner: HashMap<i64, String>,
}

impl CategoryMap {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        Self {
            inner: pairs.into_iter().map(|(t, c)| (t, c.into())).collect(),
        }
    }

    /// Resolve a thread to its category label.
    pub fn resolve(&self, thread: ThreadId) -> Result<&str> {
        self.inner
            .get(&thread.0)
            .map(String::as_str)
            .ok_or(Error::UnknownCategory(thread.0))
    }

    pub fn contains(&self, thread: ThreadId) -> bool {
        self.inner.contains_key(&thread.0)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl FromIterator<(i64, String)> for CategoryMap {
    fn from_iter<I: IntoIterator<Item = (i64, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_mapped_thread() {
        let map = CategoryMap::from_pairs([(1052, "Algebra & Geometry"), (1078, "Mathematics")]);
        assert_eq!(map.resolve(ThreadId(1078)).unwrap(), "Mathematics");
        assert!(map.contains(ThreadId(1052)));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_unmapped_thread_is_rejection() {
        let map = CategoryMap::from_pairs([(1052, "Algebra & Geometry")]);
        match map.resolve(ThreadId(999)) {
            Err(Error::UnknownCategory(999)) => {}
            other => panic!("expected UnknownCategory, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_map() {
        let map = CategoryMap::default();
        assert!(map.is_empty());
        assert!(map.resolve(ThreadId(1)).is_err());
    }
}
