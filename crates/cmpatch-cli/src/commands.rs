use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context};
use cmpatch_core::{BuiltinDiff, DiffEngine, ExternalDiff, LineDiff};
use cmpatch_scm::{CmClient, CmRetriever, DiffTarget};
use colored::Colorize;
use tracing::{info, warn};

use crate::cli::{Cli, OutputFormat};
use crate::config::{PrimitiveKind, ToolConfig};

pub fn run_command(cli: Cli, config: ToolConfig) -> anyhow::Result<()> {
    let cm = CmClient::new(&config.cm_program);
    if !cm.is_installed() {
        bail!(
            "`{} version` failed; is the Plastic SCM client installed?",
            config.cm_program.display()
        );
    }

    let workspace_root = match cm.workspace_root(&cli.workspace) {
        Ok(root) => root,
        Err(e) => {
            warn!(error = %e, "could not determine the workspace root; paths are shown unshortened");
            String::new()
        }
    };

    if cli.info {
        return cmd_info(&cm, &workspace_root, cli.format);
    }

    let target = match &cli.revision_range {
        Some(range) => DiffTarget::from_revision_range(range)?,
        None => DiffTarget::from_args(&cli.target)?,
    };
    cmd_diff(&cm, &target, &workspace_root, &config, cli.output.as_deref())
}

fn cmd_info(cm: &CmClient, workspace_root: &str, format: OutputFormat) -> anyhow::Result<()> {
    let Some(repository) = cm.repository_info(workspace_root) else {
        bail!("{} is not inside a Plastic SCM workspace", workspace_root);
    };
    match format {
        OutputFormat::Text => {
            println!("{} {}", "Workspace:".bold(), workspace_root);
            println!("{} {}", "Repository:".bold(), repository.path.cyan());
            println!(
                "  changesets: {}, parent diffs: {}",
                yes_no(repository.supports_changesets),
                yes_no(repository.supports_parent_diffs)
            );
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "workspace": workspace_root,
                "repository": repository,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

fn cmd_diff(
    cm: &CmClient,
    target: &DiffTarget,
    workspace_root: &str,
    config: &ToolConfig,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let lines = cm
        .list_changes(target)
        .with_context(|| format!("listing changes for {target}"))?;

    let differ: Box<dyn LineDiff> = match config.primitive {
        PrimitiveKind::External => Box::new(ExternalDiff::new(&config.diff_program)),
        PrimitiveKind::Builtin => Box::new(BuiltinDiff::new(config.context_lines)),
    };
    let mut engine = DiffEngine::new(CmRetriever::new(cm.clone()), differ);
    if let Some(dir) = &config.temp_dir {
        engine = engine.with_staging_dir(dir);
    }

    let diff = engine
        .synthesize(&lines, workspace_root)
        .with_context(|| format!("building diff for {target}"))?;
    info!(target = %target, bytes = diff.len(), "diff ready");

    match output {
        Some(path) => fs::write(path, &diff)
            .with_context(|| format!("writing diff to {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&diff)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn yes_no(flag: bool) -> colored::ColoredString {
    if flag {
        "yes".green()
    } else {
        "no".yellow()
    }
}
