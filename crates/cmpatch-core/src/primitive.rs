//! The line-diff primitive and its external-program implementation.

use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use crate::error::PrimitiveError;
use crate::stage::Snapshot;

/// Outcome of a successful comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiffStatus {
    /// The inputs compare equal; the output is empty.
    Identical,
    /// The inputs differ; the output describes how.
    Different,
}

impl DiffStatus {
    /// Interpret a `diff` exit code. Codes other than 0, 1 and 2 are failures.
    pub fn from_exit_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Identical),
            1 | 2 => Some(Self::Different),
            _ => None,
        }
    }
}

/// Raw output of a line diff, before header rewriting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawDiff {
    pub status: DiffStatus,
    pub output: Vec<u8>,
}

impl RawDiff {
    pub fn identical() -> Self {
        Self {
            status: DiffStatus::Identical,
            output: Vec::new(),
        }
    }

    pub fn different(output: impl Into<Vec<u8>>) -> Self {
        Self {
            status: DiffStatus::Different,
            output: output.into(),
        }
    }
}

/// Line-oriented comparison of two materialized snapshots.
///
/// Output must have the shape of `diff -u`: two file header lines followed
/// by hunks, or a single `Files <old> and <new> differ` / `Binary files ...`
/// line for binary input, naming the snapshot paths.
pub trait LineDiff {
    fn diff(&self, old: &Snapshot, new: &Snapshot) -> Result<RawDiff, PrimitiveError>;
}

impl<D: LineDiff + ?Sized> LineDiff for &D {
    fn diff(&self, old: &Snapshot, new: &Snapshot) -> Result<RawDiff, PrimitiveError> {
        (**self).diff(old, new)
    }
}

impl<D: LineDiff + ?Sized> LineDiff for Box<D> {
    fn diff(&self, old: &Snapshot, new: &Snapshot) -> Result<RawDiff, PrimitiveError> {
        (**self).diff(old, new)
    }
}

/// Runs an external `diff -urN` on the two snapshot files.
#[derive(Clone, Debug)]
pub struct ExternalDiff {
    program: PathBuf,
}

impl ExternalDiff {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ExternalDiff {
    fn default() -> Self {
        Self::new("diff")
    }
}

impl LineDiff for ExternalDiff {
    fn diff(&self, old: &Snapshot, new: &Snapshot) -> Result<RawDiff, PrimitiveError> {
        let program = self.program.display().to_string();
        let out = Command::new(&self.program)
            .arg("-urN")
            .arg(old.path())
            .arg(new.path())
            .output()
            .map_err(|source| PrimitiveError::Spawn {
                program: program.clone(),
                source,
            })?;

        debug!(program = %program, status = ?out.status.code(), bytes = out.stdout.len(), "diff finished");

        let status = out
            .status
            .code()
            .and_then(DiffStatus::from_exit_code)
            .ok_or_else(|| PrimitiveError::Status {
                program,
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_owned(),
            })?;

        Ok(RawDiff {
            status,
            output: out.stdout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Stage;

    fn have_diff() -> bool {
        Command::new("diff").arg("--version").output().is_ok()
    }

    #[test]
    fn exit_codes() {
        assert_eq!(DiffStatus::from_exit_code(0), Some(DiffStatus::Identical));
        assert_eq!(DiffStatus::from_exit_code(1), Some(DiffStatus::Different));
        assert_eq!(DiffStatus::from_exit_code(2), Some(DiffStatus::Different));
        assert_eq!(DiffStatus::from_exit_code(3), None);
        assert_eq!(DiffStatus::from_exit_code(-1), None);
    }

    fn external_identical_and_different() {
        if !have_diff() {
            return;
        }
        let stage = Stage::new().unwrap();
        let same_a = stage.snapshot(b"same\n".to_vec()).unwrap();
        let same_b = stage.snapshot(b"same\n".to_vec()).unwrap();
        let raw = ExternalDiff::default().diff(&same_a, &same_b).unwrap();
        assert_eq!(raw, RawDiff::identical());

        let a = stage.snapshot(b"a\nb\n".to_vec()).unwrap();
        let b = stage.snapshot(b"a\nc\n".to_vec()).unwrap();
        let raw = ExternalDiff::default().diff(&a, &b).unwrap();
        assert_eq!(raw.status, DiffStatus::Different);
        let text = String::from_utf8(raw.output).unwrap();
        assert!(text.starts_with("--- "));
        assert!(text.contains("-b\n+c\n"));
    }

    fn missing_program_is_spawn_error() {
        let stage = Stage::new().unwrap();
        let a = stage.snapshot(Vec::new()).unwrap();
        let b = stage.snapshot(Vec::new()).unwrap();
        let err = ExternalDiff::new("/nonexistent/cmpatch-diff").diff(&a, &b).unwrap_err();
        assert!(matches!(err, PrimitiveError::Spawn { .. }));
    }

    #[cfg(unix)]
    fn failing_diff_aborts_synthesis() {
        use std::os::unix::fs::PermissionsExt;

        use crate::engine::DiffEngine;
        use crate::error::CoreError;
        use crate::memory::InMemoryRetriever;
        use crate::record::RevisionSpec;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fakediff");
        std::fs::write(&script, "#!/bin/sh\necho boom >&2\nexit 3\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let store = InMemoryRetriever::new().with("f", &RevisionSpec::from_id(1), "x\n");
        let engine = DiffEngine::new(store, ExternalDiff::new(&script));
        let err = engine
            .synthesize(["A f rev:revid:1 rev:revid:-1 src:f dst:f"], "")
            .unwrap_err();
        match err {
            CoreError::DiffPrimitive {
                path,
                source: PrimitiveError::Status { status, stderr, .. },
            } => {
                assert_eq!(path, "f");
                assert!(status.contains('3'));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    /// Every test that spawns processes runs from here, so no other test
    /// forks while the fake `diff` script is being written.
    #[test]
    fn external_diff_processes() {
        #[cfg(unix)]
        failing_diff_aborts_synthesis();
        external_identical_and_different();
        missing_program_is_spawn_error();
    }
}
