//! Change records and the parser for `cm diff --format` lines.
//!
//! One line describes one changed file:
//!
//! ```text
//! <type> <path> rev:revid:<id> rev:revid:<parent-id> src:<path> dst:<path>
//! ```
//!
//! The type letter follows the `cm` convention, which differs from git:
//! `C` is a content change and `M` is a *move*.
//!
//! Paths may contain spaces. The path field is taken as long as possible,
//! so the revision pair used is the last one on the line that is followed
//! by `src:`, and the destination starts after the last ` dst:`.

use std::fmt;

use crate::error::{CoreError, CoreResult};

/// Prefix shared by every revision spec token.
pub const REVISION_PREFIX: &str = "rev:revid:";

/// The revision spec that names "no content".
pub const NO_REVISION: &str = "rev:revid:-1";

/// Opaque identifier of one content snapshot, e.g. `rev:revid:42`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RevisionSpec(String);

impl RevisionSpec {
    /// Build the spec for a numeric revision id.
    pub fn from_id(id: i64) -> Self {
        Self(format!("{REVISION_PREFIX}{id}"))
    }

    /// The sentinel meaning "no such revision".
    pub fn none() -> Self {
        Self(NO_REVISION.to_string())
    }

    /// Parse a `rev:revid:<digits>` token. The id part may carry `-` signs.
    pub fn parse(token: &str) -> Option<Self> {
        let id = token.strip_prefix(REVISION_PREFIX)?;
        if id.is_empty() || !id.chars().all(|c| c == '-' || c.is_ascii_digit()) {
            return None;
        }
        Some(Self(token.to_string()))
    }

    /// Returns `true` for the sentinel revision.
    pub fn is_none(&self) -> bool {
        self.0 == NO_REVISION
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevisionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of change recorded for one file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeType {
    /// `A`: the file is new.
    Added,
    /// `C`: the file content changed.
    Changed,
    /// `M`: the file moved from `src` to `dst`.
    Moved,
    /// `D`: the file was removed.
    Deleted,
}

impl ChangeType {
    /// Map a `cm` status letter to a change type.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "A" => Some(Self::Added),
            "C" => Some(Self::Changed),
            "M" => Some(Self::Moved),
            "D" => Some(Self::Deleted),
            _ => None,
        }
    }

    /// The `cm` status letter, as shown in binary banners.
    pub fn code(self) -> char {
        match self {
            Self::Added => 'A',
            Self::Changed => 'C',
            Self::Moved => 'M',
            Self::Deleted => 'D',
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One changed file within a changeset or branch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeRecord {
    pub change_type: ChangeType,
    pub path: String,
    /// Revision holding the new content.
    pub revision: RevisionSpec,
    /// Revision holding the prior content.
    pub parent_revision: RevisionSpec,
    /// Only meaningful for moves.
    pub source_path: String,
    /// Only meaningful for moves.
    pub dest_path: String,
}

/// Parse every non-blank line of `cm diff` output.
///
/// The first bad line aborts the whole parse.
pub fn parse_records<I, S>(lines: I) -> CoreResult<Vec<ChangeRecord>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| {
            let line = line.as_ref().trim();
            (!line.is_empty()).then(|| parse_record(line))
        })
        .collect()
}

/// Parse one trimmed, non-empty change line.
pub fn parse_record(line: &str) -> CoreResult<ChangeRecord> {
    let malformed = |reason: &str| CoreError::MalformedRecord {
        line: line.to_string(),
        reason: reason.to_string(),
    };

    let (code, rest) = line
        .split_once(' ')
        .ok_or_else(|| malformed("missing fields after change type"))?;

    let change_type = match ChangeType::from_code(code) {
        Some(t) => t,
        // A single status letter we don't know is a different failure
        // than a line that isn't a change record at all.
        None if code.len() == 1 && code.chars().all(|c| c.is_ascii_alphabetic()) => {
            return Err(CoreError::UnknownChangeType {
                code: code.to_string(),
                line: line.to_string(),
            });
        }
        None => return Err(malformed("change type must be a single letter")),
    };

    let dst_at = rest
        .rfind(" dst:")
        .ok_or_else(|| malformed("missing dst: field"))?;
    let dest_path = &rest[dst_at + " dst:".len()..];
    let head = &rest[..dst_at];

    let (path, revision, parent_revision, source_path) =
        split_revisions(head).ok_or_else(|| malformed("missing revision pair and src: field"))?;

    if change_type == ChangeType::Moved {
        if source_path.is_empty() || dest_path.is_empty() {
            return Err(malformed("move must name both source and destination"));
        }
        if source_path == dest_path {
            return Err(malformed("move source and destination are the same path"));
        }
    }

    Ok(ChangeRecord {
        change_type,
        path: path.to_string(),
        revision,
        parent_revision,
        source_path: source_path.to_string(),
        dest_path: dest_path.to_string(),
    })
}

/// Split `<path> rev:revid:N rev:revid:M src:<path>`, preferring the
/// rightmost revision pair so the leading path keeps any look-alike text.
fn split_revisions(head: &str) -> Option<(&str, RevisionSpec, RevisionSpec, &str)> {
    let marker = format!(" {REVISION_PREFIX}");
    for (at, _) in head.rmatch_indices(marker.as_str()) {
        let mut fields = head[at + 1..].splitn(3, ' ');
        let (Some(rev), Some(parent), Some(src)) = (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        let (Some(rev), Some(parent), Some(src)) = (
            RevisionSpec::parse(rev),
            RevisionSpec::parse(parent),
            src.strip_prefix("src:"),
        ) else {
            continue;
        };
        return Some((&head[..at], rev, parent, src));
    }
    None
}
