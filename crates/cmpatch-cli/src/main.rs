use clap::Parser;

mod cli;
mod commands;
mod config;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let mut config = config::ToolConfig::resolve(cli.config.as_deref())?;
    config.apply_overrides(&cli);
    init_tracing(&config.log_level)?;
    commands::run_command(cli, config)
}

/// Logs go to stderr; stdout carries the diff.
fn init_tracing(level: &str) -> anyhow::Result<()> {
    let level: tracing::Level = level
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid log level {level:?}"))?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
