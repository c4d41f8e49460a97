//! Unified diff synthesis for version control tools that cannot produce
//! patch-compatible diffs themselves.
//!
//! Given the change list of a changeset or branch (one [`ChangeRecord`] per
//! file) and a way to fetch file content at a revision, produces text that
//! standard unified-diff tooling accepts: additions, deletions,
//! modifications, moves (as a removal plus an addition), and binary files.
//!
//! # Key Types
//!
//! - [`ChangeRecord`] / [`parse_record`] -- one `cm diff` line, parsed
//! - [`DiffEngine`] -- per-record orchestration and output concatenation
//! - [`ContentRetriever`] -- where file content comes from
//! - [`LineDiff`] / [`ExternalDiff`] / [`BuiltinDiff`] -- the line diff primitive
//! - [`render_chunk`] -- header rewriting, binary banners, newline repair

pub mod builtin;
pub mod engine;
pub mod error;
pub mod memory;
pub mod path;
pub mod primitive;
pub mod record;
pub mod render;
pub mod retriever;
pub mod stage;

pub use builtin::{BuiltinDiff, DEFAULT_CONTEXT};
pub use engine::{plan, DiffEngine, DiffStep, Side};
pub use error::{CoreError, CoreResult, PrimitiveError, RetrievalError};
pub use memory::InMemoryRetriever;
pub use path::strip_workspace_root;
pub use primitive::{DiffStatus, ExternalDiff, LineDiff, RawDiff};
pub use record::{parse_record, parse_records, ChangeRecord, ChangeType, RevisionSpec, NO_REVISION};
pub use render::{collapse_cr_crlf, render_chunk, ChunkLabels};
pub use retriever::ContentRetriever;
pub use stage::{Snapshot, Stage};
