use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pmcharvest_core::{AppConfig, HarvestConfig, dedup, extract_identifier, links, output, parse_record};
use pmcharvest_pmc::{EntrezClient, Harvester};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "pmcharvest",
    about = "Harvest PubMed Central article metadata into JSON",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ~/.config/pmcharvest/config.toml).
    /// Also read from PMCHARVEST_CONFIG.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every article listed in a CSV file and write the records as JSON.
    Harvest {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
        /// CSV column holding the article URLs.
        #[arg(long)]
        column: Option<String>,
        /// Drop records without title/abstract and collapse duplicates.
        #[arg(long)]
        tidy: bool,
    },

    /// Fetch a single PMC identifier and print its record.
    Fetch { id: String },

    /// Extract the record from a local JATS XML file.
    Parse { file: PathBuf },

    /// Print the identifier derived from each URL.
    Id {
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Filter and dedupe an existing records file.
    Tidy {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },

    /// Show the effective configuration.
    Config {
        /// Write a default config file if none exists yet.
        #[arg(long)]
        init: bool,
    },
}

// ─── Main ────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pmcharvest=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .context("failed to load config")?;

    match cli.command {
        Commands::Harvest {
            input,
            output,
            column,
            tidy,
        } => {
            let options = harvest_options(&config.harvest, input, output, column, tidy);
            run_harvest(&config, &options).await?;
        }

        Commands::Fetch { id } => {
            let client = EntrezClient::new(&config.entrez)?;
            let record = client.fetch_record(&id).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Commands::Parse { file } => {
            let xml = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let record = parse_record(&xml)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Commands::Id { urls } => {
            for url in urls {
                println!("{}", extract_identifier(&url));
            }
        }

        Commands::Tidy { input, output } => {
            let (before, after) = run_tidy(&input, &output)?;
            println!("Kept {after} of {before} records → {}", output.display());
        }

        Commands::Config { init: true } => {
            let path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
            if init_config(&path)? {
                println!("Wrote default config to {}", path.display());
            } else {
                println!("Config already exists at {}", path.display());
            }
        }

        Commands::Config { init: false } => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

// ─── Commands ────────────────────────────────────────────────────────────────

fn harvest_options(
    base: &HarvestConfig,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    column: Option<String>,
    tidy: bool,
) -> HarvestConfig {
    HarvestConfig {
        input: input.unwrap_or_else(|| base.input.clone()),
        output: output.unwrap_or_else(|| base.output.clone()),
        link_column: column.unwrap_or_else(|| base.link_column.clone()),
        tidy: tidy || base.tidy,
    }
}

async fn run_harvest(config: &AppConfig, options: &HarvestConfig) -> Result<()> {
    let start = Instant::now();
    let urls = links::load_links(&options.input, &options.link_column)
        .with_context(|| format!("failed to read links from {}", options.input.display()))?;
    info!(count = urls.len(), input = %options.input.display(), "loaded links");

    let harvester = Harvester::new(EntrezClient::new(&config.entrez)?);
    let report = harvester.run(&urls).await;

    let records = if options.tidy {
        dedup::tidy(report.records)
    } else {
        report.records
    };
    output::write_records(&options.output, &records)
        .with_context(|| format!("failed to write {}", options.output.display()))?;

    println!(
        "Saved {} records ({} skipped) to {} in {:.1}s",
        records.len(),
        report.skipped.len(),
        options.output.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn run_tidy(input: &Path, output_path: &Path) -> Result<(usize, usize)> {
    let records = output::read_records(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let before = records.len();
    let tidied = dedup::tidy(records);
    output::write_records(output_path, &tidied)?;
    Ok((before, tidied.len()))
}

/// Write the default config to `path` unless a file is already there.
fn init_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    AppConfig::default()
        .save_to(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}
