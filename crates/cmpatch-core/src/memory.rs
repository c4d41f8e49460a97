use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::RetrievalError;
use crate::record::RevisionSpec;
use crate::retriever::ContentRetriever;

/// In-memory, HashMap-based content source.
///
/// Intended for tests and embedding. Content is keyed by `(path, revision)`
/// and cloned on every fetch. Counts fetches so callers can check which
/// snapshots a synthesis actually asked for.
pub struct InMemoryRetriever {
    contents: RwLock<HashMap<(String, RevisionSpec), Vec<u8>>>,
    fetches: RwLock<Vec<(String, RevisionSpec)>>,
}

impl InMemoryRetriever {
    pub fn new() -> Self {
        Self {
            contents: RwLock::new(HashMap::new()),
            fetches: RwLock::new(Vec::new()),
        }
    }

    /// Store `data` as the content of `path` at `revision`.
    pub fn insert(&self, path: &str, revision: &RevisionSpec, data: impl Into<Vec<u8>>) {
        self.contents
            .write()
            .expect("lock poisoned")
            .insert((path.to_string(), revision.clone()), data.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(self, path: &str, revision: &RevisionSpec, data: impl Into<Vec<u8>>) -> Self {
        self.insert(path, revision, data);
        self
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.contents.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.read().expect("lock poisoned").is_empty()
    }

    /// Every `(path, revision)` requested so far, in request order.
    pub fn fetch_log(&self) -> Vec<(String, RevisionSpec)> {
        self.fetches.read().expect("lock poisoned").clone()
    }
}

impl Default for InMemoryRetriever {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentRetriever for InMemoryRetriever {
    fn fetch(&self, path: &str, revision: &RevisionSpec) -> Result<Vec<u8>, RetrievalError> {
        self.fetches
            .write()
            .expect("lock poisoned")
            .push((path.to_string(), revision.clone()));
        let map = self.contents.read().expect("lock poisoned");
        map.get(&(path.to_string(), revision.clone()))
            .cloned()
            .ok_or_else(|| RetrievalError::NotFound {
                path: path.to_string(),
                revision: revision.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_stored_content() {
        let rev = RevisionSpec::from_id(3);
        let store = InMemoryRetriever::new().with("a.txt", &rev, "hello\n");
        assert_eq!(store.fetch("a.txt", &rev).unwrap(), b"hello\n");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn missing_content_is_an_error() {
        let store = InMemoryRetriever::new();
        assert!(store.is_empty());
        let err = store.fetch("a.txt", &RevisionSpec::from_id(1)).unwrap_err();
        assert!(matches!(err, RetrievalError::NotFound { .. }));
    }

    #[test]
    fn fetches_are_logged_in_order() {
        let r1 = RevisionSpec::from_id(1);
        let r2 = RevisionSpec::from_id(2);
        let store = InMemoryRetriever::new().with("a", &r1, "").with("b", &r2, "");
        store.fetch("b", &r2).unwrap();
        store.fetch("a", &r1).unwrap();
        assert_eq!(store.fetch_log(), vec![("b".to_string(), r2), ("a".to_string(), r1)]);
    }
}
