use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

/// Looked up in the current directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = ".cmpatch.toml";

/// Which line diff primitive produces the hunks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// An external `diff -urN`.
    External,
    /// The in-process `similar` diff.
    Builtin,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub cm_program: PathBuf,
    pub diff_program: PathBuf,
    pub primitive: PrimitiveKind,
    /// Context lines for the built-in primitive.
    pub context_lines: usize,
    /// Parent directory for staging; the system temp dir when unset.
    pub temp_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            cm_program: PathBuf::from("cm"),
            diff_program: PathBuf::from("diff"),
            primitive: PrimitiveKind::External,
            context_lines: cmpatch_core::DEFAULT_CONTEXT,
            temp_dir: None,
            log_level: "warn".into(),
        }
    }
}

impl ToolConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// An explicit path must exist; the default file is optional.
    pub fn resolve(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::load(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    /// Command-line flags win over file values.
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(cm) = &cli.cm {
            self.cm_program = cm.clone();
        }
        if let Some(diff) = &cli.diff {
            self.diff_program = diff.clone();
        }
        if cli.builtin {
            self.primitive = PrimitiveKind::Builtin;
        }
        if cli.verbose {
            self.log_level = "debug".into();
        }
    }
}
