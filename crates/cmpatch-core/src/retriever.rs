use crate::error::RetrievalError;
use crate::record::RevisionSpec;

/// Source of file content at a given revision.
///
/// Implementations must satisfy these invariants:
/// - The returned bytes are the exact stored content: no newline
///   translation, no encoding conversion.
/// - Every failure is reported, never replaced by empty content. A diff
///   with one side silently missing would be wrong.
/// - Calls may block on process execution or network I/O.
pub trait ContentRetriever {
    /// Fetch the content of `path` at `revision`.
    ///
    /// `path` is the path as listed in the change record; backends that
    /// address content by revision alone may use it only for diagnostics.
    fn fetch(&self, path: &str, revision: &RevisionSpec) -> Result<Vec<u8>, RetrievalError>;
}

impl<R: ContentRetriever + ?Sized> ContentRetriever for &R {
    fn fetch(&self, path: &str, revision: &RevisionSpec) -> Result<Vec<u8>, RetrievalError> {
        (**self).fetch(path, revision)
    }
}

impl<R: ContentRetriever + ?Sized> ContentRetriever for Box<R> {
    fn fetch(&self, path: &str, revision: &RevisionSpec) -> Result<Vec<u8>, RetrievalError> {
        (**self).fetch(path, revision)
    }
}
