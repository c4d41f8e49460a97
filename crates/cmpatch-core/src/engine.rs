//! Per-record diff orchestration.
//!
//! Each [`ChangeRecord`] is planned into one or two [`DiffStep`]s that say
//! which content to fetch for each side and how to label the result. Steps
//! run strictly in input order and their chunks are concatenated.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::{CoreError, CoreResult};
use crate::path::strip_workspace_root;
use crate::primitive::{DiffStatus, LineDiff};
use crate::record::{parse_records, ChangeRecord, ChangeType, RevisionSpec};
use crate::render::{render_chunk, ChunkLabels};
use crate::retriever::ContentRetriever;
use crate::stage::Stage;

/// Where one side of a diff gets its content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Side {
    /// No content: the file does not exist on this side.
    Empty,
    /// Content of the step's path at this revision.
    Fetch(RevisionSpec),
}

/// One concrete file comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffStep {
    pub path: String,
    pub old: Side,
    pub new: Side,
    /// Label for the `+++` header.
    pub revision: RevisionSpec,
    /// Label for the `---` header.
    pub parent_revision: RevisionSpec,
    /// Label for binary banners.
    pub change_type: ChangeType,
}

/// Decide which comparisons a record needs.
///
/// A move becomes a removal at the source followed by an addition at the
/// destination. Both sides read the move's own `revision`; the removal
/// labels it as its parent and shows the sentinel as its new revision.
pub fn plan(record: &ChangeRecord) -> Vec<DiffStep> {
    let step = |old, new| DiffStep {
        path: record.path.clone(),
        old,
        new,
        revision: record.revision.clone(),
        parent_revision: record.parent_revision.clone(),
        change_type: record.change_type,
    };

    match record.change_type {
        ChangeType::Added => vec![step(Side::Empty, Side::Fetch(record.revision.clone()))],
        // No parent to compare against: show it as if it were new.
        ChangeType::Changed if record.parent_revision.is_none() => {
            vec![step(Side::Empty, Side::Fetch(record.revision.clone()))]
        }
        ChangeType::Changed => vec![step(
            Side::Fetch(record.parent_revision.clone()),
            Side::Fetch(record.revision.clone()),
        )],
        ChangeType::Deleted => vec![step(Side::Fetch(record.parent_revision.clone()), Side::Empty)],
        ChangeType::Moved => vec![
            DiffStep {
                path: record.source_path.clone(),
                old: Side::Fetch(record.revision.clone()),
                new: Side::Empty,
                revision: RevisionSpec::none(),
                parent_revision: record.revision.clone(),
                change_type: ChangeType::Moved,
            },
            DiffStep {
                path: record.dest_path.clone(),
                old: Side::Empty,
                new: Side::Fetch(record.revision.clone()),
                revision: record.revision.clone(),
                parent_revision: RevisionSpec::none(),
                change_type: ChangeType::Moved,
            },
        ],
    }
}

/// Synthesizes unified diff text from change records.
pub struct DiffEngine<R, D> {
    retriever: R,
    differ: D,
    staging_dir: Option<PathBuf>,
}

impl<R: ContentRetriever, D: LineDiff> DiffEngine<R, D> {
    pub fn new(retriever: R, differ: D) -> Self {
        Self {
            retriever,
            differ,
            staging_dir: None,
        }
    }

    /// Create staging directories under `dir` instead of the system temp dir.
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    /// Parse `cm diff` lines and synthesize the full diff.
    ///
    /// Any bad line aborts before content is fetched.
    pub fn synthesize<I, S>(&self, lines: I, workspace_root: &str) -> CoreResult<Vec<u8>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let records = parse_records(lines)?;
        self.synthesize_records(&records, workspace_root)
    }

    /// Synthesize the diff for already parsed records.
    pub fn synthesize_records(
        &self,
        records: &[ChangeRecord],
        workspace_root: &str,
    ) -> CoreResult<Vec<u8>> {
        let stage = self.open_stage()?;
        let mut out = Vec::new();
        for record in records {
            self.append_record(&stage, record, workspace_root, &mut out)?;
        }
        info!(records = records.len(), bytes = out.len(), "diff synthesized");
        Ok(out)
    }

    /// The chunk(s) for a single record.
    pub fn diff_record(&self, record: &ChangeRecord, workspace_root: &str) -> CoreResult<Vec<u8>> {
        let stage = self.open_stage()?;
        let mut out = Vec::new();
        self.append_record(&stage, record, workspace_root, &mut out)?;
        Ok(out)
    }

    fn open_stage(&self) -> CoreResult<Stage> {
        let stage = match &self.staging_dir {
            Some(dir) => Stage::new_in(dir)?,
            None => Stage::new()?,
        };
        Ok(stage)
    }

    fn append_record(
        &self,
        stage: &Stage,
        record: &ChangeRecord,
        workspace_root: &str,
        out: &mut Vec<u8>,
    ) -> CoreResult<()> {
        debug!(
            change = %record.change_type,
            path = %record.path,
            revision = %record.revision,
            parent = %record.parent_revision,
            "processing change record"
        );
        for step in plan(record) {
            let chunk = self.run_step(stage, &step, workspace_root)?;
            out.extend_from_slice(&chunk);
        }
        Ok(())
    }

    /// Fetch, diff and render one step. Snapshots are released on return.
    fn run_step(&self, stage: &Stage, step: &DiffStep, workspace_root: &str) -> CoreResult<Vec<u8>> {
        let old = stage.snapshot(self.resolve(&step.path, &step.old)?)?;
        let new = stage.snapshot(self.resolve(&step.path, &step.new)?)?;

        let primitive_failed = |source| CoreError::DiffPrimitive {
            path: step.path.clone(),
            source,
        };

        let raw = self.differ.diff(&old, &new).map_err(primitive_failed)?;
        if raw.status == DiffStatus::Identical {
            debug!(path = %step.path, "no difference");
            return Ok(Vec::new());
        }

        let labels = ChunkLabels {
            display_path: strip_workspace_root(&step.path, workspace_root),
            revision: &step.revision,
            parent_revision: &step.parent_revision,
            change_type: step.change_type,
        };
        render_chunk(&raw.output, &labels, old.path(), new.path()).map_err(primitive_failed)
    }

    fn resolve(&self, path: &str, side: &Side) -> CoreResult<Vec<u8>> {
        match side {
            Side::Empty => Ok(Vec::new()),
            Side::Fetch(revision) => {
                debug!(path = %path, revision = %revision, "fetching content");
                self.retriever
                    .fetch(path, revision)
                    .map_err(|source| CoreError::Retrieval {
                        path: path.to_string(),
                        revision: revision.to_string(),
                        source,
                    })
            }
        }
    }
}
