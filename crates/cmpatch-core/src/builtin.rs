//! In-process line diff.
//!
//! Uses the `similar` crate (Myers diff algorithm) to produce the same
//! `diff -u` text an external `diff -urN` would, so the renderer treats
//! both primitives alike.
//!
//! Lines end at `\n` only. A `\r` anywhere else is ordinary line content,
//! as it is for `diff`.

use similar::TextDiff;

use crate::error::PrimitiveError;
use crate::primitive::{LineDiff, RawDiff};
use crate::stage::Snapshot;

/// Default number of context lines around each change.
pub const DEFAULT_CONTEXT: usize = 3;

/// `diff -u` equivalent computed with `similar`.
///
/// Content with a NUL byte, or that is not valid UTF-8, is binary: unequal
/// binary inputs produce a single `Files <old> and <new> differ` line.
#[derive(Clone, Debug)]
pub struct BuiltinDiff {
    context: usize,
}

impl BuiltinDiff {
    pub fn new(context: usize) -> Self {
        Self { context }
    }
}

impl Default for BuiltinDiff {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT)
    }
}

impl LineDiff for BuiltinDiff {
    fn diff(&self, old: &Snapshot, new: &Snapshot) -> Result<RawDiff, PrimitiveError> {
        if old.data() == new.data() {
            return Ok(RawDiff::identical());
        }

        let old_name = old.path().display().to_string();
        let new_name = new.path().display().to_string();

        let (Some(old_text), Some(new_text)) = (as_text(old.data()), as_text(new.data())) else {
            return Ok(RawDiff::different(format!(
                "Files {old_name} and {new_name} differ\n"
            )));
        };

        let old_lines = split_lines(old_text);
        let new_lines = split_lines(new_text);
        let text_diff = TextDiff::configure().diff_slices(old_lines.as_slice(), new_lines.as_slice());
        let mut unified = text_diff.unified_diff();
        unified.context_radius(self.context);

        let mut output = format!("--- {old_name}\n+++ {new_name}\n");
        for hunk in unified.iter_hunks() {
            output.push_str(&format!("{}\n", hunk.header()));
            for change in hunk.iter_changes() {
                output.push_str(&format!("{}{}", change.tag(), change.value()));
                if !change.value().ends_with('\n') {
                    output.push_str("\n\\ No newline at end of file\n");
                }
            }
        }

        Ok(RawDiff::different(output))
    }
}

fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

fn as_text(data: &[u8]) -> Option<&str> {
    if data.contains(&0) {
        return None;
    }
    std::str::from_utf8(data).ok()
}
