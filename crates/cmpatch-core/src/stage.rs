//! Temporary materialization of content snapshots.
//!
//! A [`Stage`] owns one private directory for a synthesis run. Each diff
//! writes its two sides into fresh [`Snapshot`] files inside it; a snapshot
//! file is deleted when the snapshot drops, and the directory when the
//! stage drops, so nothing outlives the run whether it succeeds or fails.

use std::io::{self, Write};
use std::path::Path;

use tempfile::{Builder, NamedTempFile, TempDir};

const STAGE_PREFIX: &str = "cmpatch-";
const SNAPSHOT_PREFIX: &str = "snap-";

/// Scoped staging directory for content snapshots.
pub struct Stage {
    dir: TempDir,
}

impl Stage {
    /// Create a staging directory under the system temp directory.
    pub fn new() -> io::Result<Self> {
        let dir = Builder::new().prefix(STAGE_PREFIX).tempdir()?;
        Ok(Self { dir })
    }

    /// Create a staging directory under `parent`.
    pub fn new_in(parent: &Path) -> io::Result<Self> {
        let dir = Builder::new().prefix(STAGE_PREFIX).tempdir_in(parent)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `data` to a new snapshot file in this stage.
    pub fn snapshot(&self, data: Vec<u8>) -> io::Result<Snapshot> {
        let mut file = Builder::new()
            .prefix(SNAPSHOT_PREFIX)
            .tempfile_in(self.dir.path())?;
        file.write_all(&data)?;
        file.flush()?;
        Ok(Snapshot { file, data })
    }
}

/// One side of a diff, held both on disk and in memory.
pub struct Snapshot {
    file: NamedTempFile,
    data: Vec<u8>,
}

impl Snapshot {
    /// Location of the materialized content.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_holds_content_on_disk() {
        let stage = Stage::new().unwrap();
        let snap = stage.snapshot(b"abc\n".to_vec()).unwrap();
        assert_eq!(std::fs::read(snap.path()).unwrap(), b"abc\n");
        assert_eq!(snap.data(), b"abc\n");
        assert!(snap.path().starts_with(stage.path()));
    }

    #[test]
    fn snapshots_are_distinct_files() {
        let stage = Stage::new().unwrap();
        let a = stage.snapshot(Vec::new()).unwrap();
        let b = stage.snapshot(Vec::new()).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn dropping_releases_files() {
        let parent = tempfile::tempdir().unwrap();
        let stage = Stage::new_in(parent.path()).unwrap();
        let snap = stage.snapshot(b"x".to_vec()).unwrap();
        let snap_path = snap.path().to_path_buf();
        drop(snap);
        assert!(!snap_path.exists());

        let stage_path = stage.path().to_path_buf();
        drop(stage);
        assert!(!stage_path.exists());
        assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);
    }
}
