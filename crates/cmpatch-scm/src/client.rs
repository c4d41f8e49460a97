//! Thin wrapper over the `cm` command-line client.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use cmpatch_core::RevisionSpec;
use serde::Serialize;
use tracing::debug;

use crate::error::{ScmError, ScmResult};
use crate::target::DiffTarget;

/// `cm diff` output format: one change record per line.
pub const CHANGE_FORMAT: &str = "{status} {path} rev:revid:{revid} rev:revid:{parentrevid} \
                                 src:{srccmpath} dst:{dstcmpath}{newline}";

const REPOSITORY_PREFIX: &str = "rep:";

/// What a review server needs to know about the repository.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RepositoryInfo {
    /// Repository spec, e.g. `default@localhost:8087`.
    pub path: String,
    pub supports_changesets: bool,
    pub supports_parent_diffs: bool,
}

/// Runs `cm` subcommands and interprets their output.
#[derive(Clone, Debug)]
pub struct CmClient {
    program: PathBuf,
}

impl CmClient {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Returns `true` if `cm version` runs successfully.
    pub fn is_installed(&self) -> bool {
        self.run([OsStr::new("version")]).is_ok()
    }

    /// Root directory of the workspace containing `dir`.
    pub fn workspace_root(&self, dir: &Path) -> ScmResult<String> {
        let out = self.run([
            OsStr::new("gwp"),
            dir.as_os_str(),
            OsStr::new("--format={1}"),
        ])?;
        let root = String::from_utf8_lossy(&out).trim().to_string();
        debug!(workspace = %root, "workspace root");
        Ok(root)
    }

    /// Repository the workspace at `workspace_root` is bound to.
    ///
    /// Returns `None` when `cm ls` fails or does not report a `rep:` line.
    pub fn repository_info(&self, workspace_root: &str) -> Option<RepositoryInfo> {
        let out = match self.run([
            OsStr::new("ls"),
            OsStr::new(workspace_root),
            OsStr::new("--format={8}"),
        ]) {
            Ok(out) => out,
            Err(e) => {
                debug!(error = %e, "no repository info");
                return None;
            }
        };
        let listing = String::from_utf8_lossy(&out);
        parse_repository_line(&listing).map(|path| RepositoryInfo {
            path: path.to_string(),
            supports_changesets: true,
            supports_parent_diffs: false,
        })
    }

    /// Change records for every file touched by `target`.
    pub fn list_changes(&self, target: &DiffTarget) -> ScmResult<Vec<String>> {
        let target_arg = target.to_cm_arg();
        let format_arg = format!("--format={CHANGE_FORMAT}");
        let out = self.run([
            OsStr::new("diff"),
            OsStr::new(&target_arg),
            OsStr::new(&format_arg),
        ])?;
        let lines: Vec<String> = String::from_utf8_lossy(&out)
            .lines()
            .map(str::to_owned)
            .collect();
        debug!(target = %target, entries = lines.len(), "listed changes");
        Ok(lines)
    }

    /// Write the content at `revision` to `dest`, byte for byte.
    pub fn cat(&self, revision: &RevisionSpec, dest: &Path) -> ScmResult<()> {
        let mut file_arg = OsString::from("--file=");
        file_arg.push(dest);
        debug!(revision = %revision, dest = %dest.display(), "cm cat");
        self.run([OsStr::new("cat"), OsStr::new(revision.as_str()), file_arg.as_os_str()])?;
        Ok(())
    }

    fn run<'a, I>(&self, args: I) -> ScmResult<Vec<u8>>
    where
        I: IntoIterator<Item = &'a OsStr>,
    {
        let args: Vec<&OsStr> = args.into_iter().collect();
        let out = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| ScmError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;
        if out.status.success() {
            Ok(out.stdout)
        } else {
            Err(ScmError::Command {
                command: self.describe(&args),
                exit_code: out.status.code(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_owned(),
            })
        }
    }

    fn describe(&self, args: &[&OsStr]) -> String {
        let mut command = self.program.display().to_string();
        for arg in args {
            command.push(' ');
            command.push_str(&arg.to_string_lossy());
        }
        command
    }
}

impl Default for CmClient {
    fn default() -> Self {
        Self::new("cm")
    }
}

/// The repository named on the first non-blank line of `cm ls` output.
fn parse_repository_line(listing: &str) -> Option<&str> {
    let first = listing.lines().map(str::trim).find(|l| !l.is_empty())?;
    first
        .strip_prefix(REPOSITORY_PREFIX)
        .filter(|name| !name.is_empty())
}
