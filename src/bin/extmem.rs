//! extmem CLI tool
//!
//! Usage:
//!   extmem sort <in> <out>
//!   extmem select <in> <out> <substring>
//!   extmem join <left> <right> <out>
//!   extmem select-join <left> <right> <out> <substring>
//!
//! Settings layer as defaults, then `--config`, then `EXTMEM_*` variables
//! (including those loaded from `.env`), then flags.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use extmem_query::{logging, BatchStrategy, ExternalMemory, SortConfig};

#[derive(Parser)]
#[command(name = "extmem")]
#[command(about = "External-memory sort, select and merge-join over text records")]
struct Cli {
    /// Directory for run files and intermediates
    #[arg(long, global = true, env = "EXTMEM_TMP_DIR", default_value = "tmp")]
    tmp_dir: PathBuf,
    /// JSON file with a SortConfig
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Phase I memory budget in bytes
    #[arg(long, global = true)]
    memory_budget: Option<usize>,
    /// Count bytes per batch instead of estimating from the first record
    #[arg(long, global = true)]
    strict_batches: bool,
    /// Literal prefix of key tokens
    #[arg(long, global = true)]
    key_prefix: Option<String>,
    /// Default log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sort a file by full-line order
    Sort { input: PathBuf, output: PathBuf },
    /// Keep records whose key suffix contains a substring
    Select {
        input: PathBuf,
        output: PathBuf,
        substring: String,
    },
    /// Join two files already sorted by key token
    Join {
        left: PathBuf,
        right: PathBuf,
        output: PathBuf,
    },
    /// Select, sort both sides, then join
    SelectJoin {
        left: PathBuf,
        right: PathBuf,
        output: PathBuf,
        substring: String,
    },
}

fn load_config(cli: &Cli) -> Result<SortConfig> {
    let mut config = SortConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(budget) = cli.memory_budget {
        config.memory_budget_bytes = budget;
    }
    if cli.strict_batches {
        config.batch_strategy = BatchStrategy::ByteBudget;
    }
    if let Some(prefix) = &cli.key_prefix {
        config.key_prefix = prefix.clone();
    }
    Ok(config)
}

fn main() -> Result<()> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    logging::init(&cli.log_level)?;

    let engine = ExternalMemory::new(load_config(&cli)?).context("Invalid configuration")?;
    let tmp = &cli.tmp_dir;

    match &cli.command {
        Commands::Sort { input, output } => {
            let summary = engine
                .sort(input, output, tmp)
                .with_context(|| format!("Failed to sort {}", input.display()))?;
            println!(
                "Sorted {} records in {} runs -> {}",
                summary.records_written,
                summary.runs,
                output.display()
            );
        }
        Commands::Select {
            input,
            output,
            substring,
        } => {
            let summary = engine
                .select(input, output, substring, tmp)
                .with_context(|| format!("Failed to select from {}", input.display()))?;
            println!(
                "Selected {} of {} records -> {}",
                summary.records_kept,
                summary.records_read,
                output.display()
            );
        }
        Commands::Join { left, right, output } => {
            let summary = engine
                .join(left, right, output, tmp)
                .with_context(|| format!("Failed to join {} with {}", left.display(), right.display()))?;
            println!("Joined {} rows -> {}", summary.joined, output.display());
        }
        Commands::SelectJoin {
            left,
            right,
            output,
            substring,
        } => {
            let summary = engine
                .select_and_join(left, right, output, substring, tmp)
                .with_context(|| format!("Failed to select-join {} with {}", left.display(), right.display()))?;
            println!(
                "Kept {} left / {} right records, joined {} rows -> {}",
                summary.left.records_kept,
                summary.right.records_kept,
                summary.join.joined,
                output.display()
            );
        }
    }

    Ok(())
}
