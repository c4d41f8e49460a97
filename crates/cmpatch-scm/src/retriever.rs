use cmpatch_core::{ContentRetriever, RetrievalError, RevisionSpec};
use tracing::debug;

use crate::client::CmClient;

/// Fetches content with `cm cat <revision> --file=<tmp>`.
///
/// Going through a file rather than stdout keeps the bytes exactly as
/// stored. The temporary file is removed before `fetch` returns.
pub struct CmRetriever {
    client: CmClient,
}

impl CmRetriever {
    pub fn new(client: CmClient) -> Self {
        Self { client }
    }
}

impl ContentRetriever for CmRetriever {
    fn fetch(&self, path: &str, revision: &RevisionSpec) -> Result<Vec<u8>, RetrievalError> {
        debug!(path = %path, revision = %revision, "retrieving content");
        let tmp = tempfile::Builder::new().prefix("cmpatch-cat-").tempfile()?;
        self.client
            .cat(revision, tmp.path())
            .map_err(|e| RetrievalError::Backend(e.to_string()))?;
        Ok(std::fs::read(tmp.path())?)
    }
}
