use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::PathBuf;
use taglineage::{parse, parse_with, render, ConfigManager};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "taglineage")]
#[command(about = "Trace analytics parameters in a tag-manager export back to their data sources")]
#[command(version)]
struct Cli {
    /// Path to the container export (JSON)
    export: PathBuf,

    /// Config file; defaults to taglineage.toml next to the export
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Markdown)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Markdown,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let parsed = match &cli.config {
        Some(config_path) => {
            let config = ConfigManager::load_file(config_path)
                .with_context(|| format!("Failed to load config {}", config_path.display()))?;
            parse_with(&cli.export, &config)
        }
        None => parse(&cli.export),
    }
    .with_context(|| format!("Failed to resolve {}", cli.export.display()))?;

    let report = match cli.format {
        Format::Markdown => render(&parsed),
        Format::Json => serde_json::to_string_pretty(&parsed).context("Failed to serialize report")?,
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, report)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "Report written");
        }
        None => println!("{}", report),
    }

    Ok(())
}
