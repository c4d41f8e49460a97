//! Rewrites raw line-diff output into the final per-file chunk.
//!
//! Text diffs get their two file header lines replaced with
//! `--- <path>\t<parent revision>` / `+++ <path>\t<revision>`. Binary diffs
//! become a `====` banner followed by a `Binary files ... differ` line and
//! a blank line. Empty diffs render to nothing.

use std::path::Path;

use crate::error::PrimitiveError;
use crate::record::{ChangeType, RevisionSpec};

const BINARY_PREFIX: &[u8] = b"Binary files ";

/// Labels written into the chunk headers for one file.
#[derive(Clone, Copy, Debug)]
pub struct ChunkLabels<'a> {
    /// Path shown in headers, already stripped of the workspace root.
    pub display_path: &'a str,
    /// Shown on the `+++` line and in binary banners.
    pub revision: &'a RevisionSpec,
    /// Shown on the `---` line.
    pub parent_revision: &'a RevisionSpec,
    /// Shown in binary banners only.
    pub change_type: ChangeType,
}

/// Render raw diff output comparing `old_file` and `new_file`.
pub fn render_chunk(
    raw: &[u8],
    labels: &ChunkLabels<'_>,
    old_file: &Path,
    new_file: &Path,
) -> Result<Vec<u8>, PrimitiveError> {
    let text = collapse_cr_crlf(raw);
    let lines = split_lines(&text);

    if lines.is_empty() {
        return Ok(Vec::new());
    }

    let mut chunk = Vec::with_capacity(text.len() + 64);

    if let Some(body) = binary_body(&lines, old_file, new_file) {
        chunk.extend_from_slice(
            format!(
                "==== {} ({}) =={}==\n",
                labels.display_path, labels.revision, labels.change_type
            )
            .as_bytes(),
        );
        chunk.extend_from_slice(&body);
        chunk.push(b'\n');
        return Ok(chunk);
    }

    if lines.len() < 2 {
        return Err(PrimitiveError::Output(format!(
            "expected two file header lines, got {:?}",
            String::from_utf8_lossy(&text)
        )));
    }

    chunk.extend_from_slice(
        format!("--- {}\t{}\n", labels.display_path, labels.parent_revision).as_bytes(),
    );
    chunk.extend_from_slice(
        format!("+++ {}\t{}\n", labels.display_path, labels.revision).as_bytes(),
    );
    for line in &lines[2..] {
        chunk.extend_from_slice(line);
    }

    // Not every file ends in a newline; keep the chunk usable on its own.
    if chunk.last() != Some(&b'\n') {
        chunk.push(b'\n');
    }

    Ok(chunk)
}

/// Collapse `CR+ LF` runs with two or more CRs into a single `CR LF`.
///
/// Content stored with CRLF endings picks up an extra CR on its way
/// through some tools. Collapsing whole runs keeps the operation idempotent.
pub fn collapse_cr_crlf(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] != b'\r' {
            out.push(raw[i]);
            i += 1;
            continue;
        }
        let run_end = raw[i..]
            .iter()
            .position(|b| *b != b'\r')
            .map_or(raw.len(), |n| i + n);
        if run_end - i >= 2 && raw.get(run_end) == Some(&b'\n') {
            out.push(b'\r');
        } else {
            out.extend_from_slice(&raw[i..run_end]);
        }
        i = run_end;
    }
    out
}

/// Split into lines, each keeping its trailing `\n` if it has one.
fn split_lines(text: &[u8]) -> Vec<&[u8]> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split_inclusive(|b| *b == b'\n').collect()
}

/// The binary notice for this output, if it is one.
///
/// `diff` reports binary inputs either as `Binary files A and B differ` or,
/// in some modes, as a bare `Files A and B differ`. The latter is rewritten
/// to the former.
fn binary_body(lines: &[&[u8]], old_file: &Path, new_file: &Path) -> Option<Vec<u8>> {
    let files_differ = format!(
        "Files {} and {} differ",
        old_file.display(),
        new_file.display()
    );
    if lines.len() == 1 && lines[0].starts_with(files_differ.as_bytes()) {
        return Some(
            format!(
                "Binary files {} and {} differ\n",
                old_file.display(),
                new_file.display()
            )
            .into_bytes(),
        );
    }
    if lines[0].starts_with(BINARY_PREFIX) {
        return Some(lines.concat());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn labels<'a>(rev: &'a RevisionSpec, parent: &'a RevisionSpec) -> ChunkLabels<'a> {
        ChunkLabels {
            display_path: "src/foo.txt",
            revision: rev,
            parent_revision: parent,
            change_type: ChangeType::Changed,
        }
    }

    fn render(raw: &[u8]) -> Result<Vec<u8>, PrimitiveError> {
        let rev = RevisionSpec::from_id(5);
        let parent = RevisionSpec::from_id(3);
        render_chunk(raw, &labels(&rev, &parent), Path::new("/tmp/old"), Path::new("/tmp/new"))
    }

    #[test]
    fn empty_output_renders_nothing() {
        assert!(render(b"").unwrap().is_empty());
    }

    #[test]
    fn headers_are_rewritten() {
        let raw = b"--- /tmp/old\t2024-01-01\n+++ /tmp/new\t2024-01-02\n@@ -1,2 +1,2 @@\n a\n-b\n+c\n";
        let chunk = render(raw).unwrap();
        assert_eq!(
            chunk,
            b"--- src/foo.txt\trev:revid:3\n+++ src/foo.txt\trev:revid:5\n@@ -1,2 +1,2 @@\n a\n-b\n+c\n"
        );
    }

    #[test]
    fn files_differ_becomes_binary_banner() {
        let chunk = render(b"Files /tmp/old and /tmp/new differ\n").unwrap();
        assert_eq!(
            chunk,
            b"==== src/foo.txt (rev:revid:5) ==C==\nBinary files /tmp/old and /tmp/new differ\n\n"
        );
    }

    #[test]
    fn files_differ_for_other_paths_is_not_binary() {
        // Only the notice naming our own two snapshots counts.
        let err = render(b"Files /x and /y differ\n").unwrap_err();
        assert!(matches!(err, PrimitiveError::Output(_)));
    }

    #[test]
    fn binary_files_line_passes_through() {
        let chunk = render(b"Binary files /tmp/old and /tmp/new differ\n").unwrap();
        assert_eq!(
            chunk,
            b"==== src/foo.txt (rev:revid:5) ==C==\nBinary files /tmp/old and /tmp/new differ\n\n"
        );
    }

    #[test]
    fn missing_final_newline_is_repaired_once() {
        let chunk = render(b"--- a\n+++ b\n@@ -1 +1 @@\n-x\n+y").unwrap();
        assert!(chunk.ends_with(b"+y\n"));
        assert!(!chunk.ends_with(b"\n\n"));
    }

    #[test]
    fn terminated_output_is_not_padded() {
        let chunk = render(b"--- a\n+++ b\n@@ -1 +1 @@\n-x\n+y\n").unwrap();
        assert!(chunk.ends_with(b"+y\n"));
        assert!(!chunk.ends_with(b"\n\n"));
    }

    #[test]
    fn cr_cr_lf_is_collapsed_in_body() {
        let chunk = render(b"--- a\n+++ b\n@@ -1 +1 @@\n-x\r\r\n+y\r\r\n").unwrap();
        assert!(chunk.ends_with(b"-x\r\n+y\r\n"));
    }

    #[test]
    fn single_header_line_is_an_error() {
        assert!(matches!(render(b"--- a\n"), Err(PrimitiveError::Output(_))));
    }

    #[test]
    fn collapse_cases() {
        assert_eq!(collapse_cr_crlf(b"a\r\r\nb"), b"a\r\nb");
        assert_eq!(collapse_cr_crlf(b"a\r\nb"), b"a\r\nb");
        assert_eq!(collapse_cr_crlf(b"a\r\r\r\n"), b"a\r\n");
        assert_eq!(collapse_cr_crlf(b"a\r\rb"), b"a\r\rb");
        assert_eq!(collapse_cr_crlf(b"\r\r"), b"\r\r");
        assert_eq!(collapse_cr_crlf(b""), b"");
    }

    proptest! {
        #[test]
        fn collapse_is_idempotent(raw in proptest::collection::vec(
            prop_oneof![Just(b'\r'), Just(b'\n'), Just(b'a')], 0..64)) {
            let once = collapse_cr_crlf(&raw);
            prop_assert_eq!(collapse_cr_crlf(&once), once.clone());
            prop_assert!(!once.windows(3).any(|w| w == b"\r\r\n"));
        }

        #[test]
        fn text_chunks_end_with_exactly_one_terminator(body in "[a-z\n]{0,40}") {
            let raw = format!("--- a\n+++ b\n@@ -1 +1 @@\n+{body}");
            let chunk = render(raw.as_bytes()).unwrap();
            prop_assert!(chunk.ends_with(b"\n"));
            let trailing = chunk.iter().rev().take_while(|b| **b == b'\n').count();
            let raw_trailing = raw.bytes().rev().take_while(|b| *b == b'\n').count();
            prop_assert_eq!(trailing, raw_trailing.max(1));
        }
    }
}
