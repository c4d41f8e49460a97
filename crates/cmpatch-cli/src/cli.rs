use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "cmpatch",
    about = "Unified diffs for Plastic SCM changesets and branches",
    version,
)]
pub struct Cli {
    /// Changeset (`cs:<N>`) or branch to diff
    #[arg(required_unless_present_any = ["info", "revision_range"])]
    pub target: Vec<String>,

    /// Configuration file (default: ./.cmpatch.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the `cm` client
    #[arg(long)]
    pub cm: Option<PathBuf>,

    /// Path to the external `diff` program
    #[arg(long)]
    pub diff: Option<PathBuf>,

    /// Use the built-in line diff instead of an external `diff`
    #[arg(long)]
    pub builtin: bool,

    /// Write the diff here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Diff between two revisions (not supported by Plastic SCM)
    #[arg(long)]
    pub revision_range: Option<String>,

    /// Directory inside the workspace
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Show workspace and repository information instead of a diff
    #[arg(long)]
    pub info: bool,

    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
