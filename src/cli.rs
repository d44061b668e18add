//! Command-line interface for the Starknet position indexer.
//!
//! # Commands
//!
//! - `mints` (default): fetch Mint events, read each position, write the
//!   joined records to JSON
//! - `increase-liquidity`: list IncreaseLiquidity events in the range
//!
//! # Example
//!
//! ```bash
//! # Default mainnet range, output to combined_output.json
//! starknet-position-indexer
//!
//! # Custom range and output
//! starknet-position-indexer mints --from-block 550000 --to-block 550100 --output mints.json
//!
//! # Print IncreaseLiquidity events
//! starknet-position-indexer increase-liquidity --from-block 550860 --to-block 550862
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use starknet::core::types::Felt;
use tracing::info;

use crate::config::Config;
use crate::error::IndexerResult;
use crate::models::IncreaseLiquidityEvent;
use crate::pipeline::{run_increase_liquidity_scan, run_mint_pipeline, PipelineReport};
use crate::rpc::create_provider;

/// Starknet liquidity position indexer
#[derive(Parser, Debug)]
#[command(name = "starknet-position-indexer")]
#[command(about = "Joins Starknet Mint events with current position state", long_about = None)]
#[command(version)]
struct Cli {
    /// Subcommand to execute (default: mints)
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Block range overrides shared by all commands
#[derive(Args, Debug, Default, Clone, Copy)]
struct RangeArgs {
    /// First block to scan (default: START_BLOCK or 550860)
    #[arg(short, long)]
    from_block: Option<u64>,

    /// Last block to scan (default: END_BLOCK or 550862)
    #[arg(short, long)]
    to_block: Option<u64>,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch Mint events, read their positions and write the joined JSON
    Mints {
        #[command(flatten)]
        range: RangeArgs,

        /// Output file (default: OUTPUT_FILE or combined_output.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print IncreaseLiquidity events
    IncreaseLiquidity {
        #[command(flatten)]
        range: RangeArgs,
    },
}

/// Parse CLI arguments and execute the appropriate command.
///
/// # Errors
///
/// Returns an error if configuration, RPC access, decoding or writing the
/// output fails.
pub async fn run() -> IndexerResult<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command.unwrap_or(Commands::Mints {
        range: RangeArgs::default(),
        output: None,
    }) {
        Commands::Mints { range, output } => {
            let mut config = apply_range(config, range)?;
            if let Some(output) = output {
                config = config.with_output_file(output);
            }
            run_mints_command(&config).await
        }
        Commands::IncreaseLiquidity { range } => {
            run_increase_liquidity_command(&apply_range(config, range)?).await
        }
    }
}

fn apply_range(config: Config, range: RangeArgs) -> IndexerResult<Config> {
    let from = range.from_block.unwrap_or_else(|| config.start_block());
    let to = range.to_block.unwrap_or_else(|| config.end_block());
    config.with_block_range(from, to)
}

async fn run_mints_command(config: &Config) -> IndexerResult<()> {
    info!(
        from = config.start_block(),
        to = config.end_block(),
        "Querying Mint events"
    );

    let provider = create_provider(config.rpc_url())?;
    let report = run_mint_pipeline(&provider, config).await?;

    print_report(&report);
    Ok(())
}

async fn run_increase_liquidity_command(config: &Config) -> IndexerResult<()> {
    info!(
        from = config.start_block(),
        to = config.end_block(),
        "Querying IncreaseLiquidity events"
    );

    let provider = create_provider(config.rpc_url())?;
    let events = run_increase_liquidity_scan(&provider, config).await?;

    if events.is_empty() {
        println!(
            "{}",
            "No IncreaseLiquidity events in range. Try a wider --from-block/--to-block."
                .yellow()
                .bold()
        );
        return Ok(());
    }

    for event in &events {
        println!("{}", format_increase_liquidity(event));
    }
    Ok(())
}

fn print_report(report: &PipelineReport) {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

    println!(
        "{} {} Blocks {}..={} | Mint events: {} | Records: {}",
        "📦".cyan(),
        timestamp.to_string().dimmed(),
        report.from_block.to_string().yellow(),
        report.to_block.to_string().yellow(),
        report.mint_events.to_string().blue(),
        report.records.to_string().magenta()
    );
    println!(
        "{} Combined data written to {}",
        "✅".green(),
        report.output_file.display().to_string().bold()
    );
}

fn format_increase_liquidity(event: &IncreaseLiquidityEvent) -> String {
    let block = event
        .block_number
        .map_or_else(|| "pending".to_string(), |b| b.to_string());

    format!(
        "Block {} | Token ID: {} | Liquidity: {} | Amount0: {} | Amount1: {}",
        block.yellow(),
        decimal(event.token_id).cyan(),
        decimal(event.liquidity),
        decimal(event.amount0).blue(),
        decimal(event.amount1).magenta()
    )
}

fn decimal(value: Felt) -> String {
    value.to_biguint().to_string()
}
