//! End-to-end run: fetch Mint events, enrich positions, join and write.
//!
//! ```text
//! fetch_mint_events ─▶ PositionQueries ─▶ fetch_position_infos ─▶ write_combined_output
//! ```
//!
//! Every stage consumes the whole output of the previous one. No partial
//! output is ever written.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::error::IndexerResult;
use crate::events::{fetch_increase_liquidity_events, fetch_mint_events};
use crate::models::IncreaseLiquidityEvent;
use crate::output::write_combined_output;
use crate::position::{fetch_position_infos, PositionQueries};
use crate::rpc::StarknetSource;

/// Summary of a completed Mint pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// First block scanned
    pub from_block: u64,
    /// Last block scanned
    pub to_block: u64,
    /// Mint events decoded
    pub mint_events: usize,
    /// Records written
    pub records: usize,
    /// File the records were written to
    pub output_file: PathBuf,
}

/// Run the Mint pipeline against `source`.
///
/// # Errors
///
/// Transport, query and malformed data errors abort the run. If enrichment
/// returns fewer positions than events, the join reports a length mismatch
/// and no file is written.
#[instrument(skip_all, fields(from = config.start_block(), to = config.end_block()))]
pub async fn run_mint_pipeline<S: StarknetSource>(
    source: &S,
    config: &Config,
) -> IndexerResult<PipelineReport> {
    let start = Instant::now();

    let mint_events = fetch_mint_events(source, config).await?;
    if mint_events.is_empty() {
        warn!("No Mint events in range");
    }

    let queries = PositionQueries::from_mint_events(&mint_events);
    let positions = fetch_position_infos(source, config, &queries).await?;

    let event_count = mint_events.len();
    let records = write_combined_output(mint_events, positions, config.output_file())?;

    info!(
        records = records.len(),
        duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        "Mint pipeline complete"
    );

    Ok(PipelineReport {
        from_block: config.start_block(),
        to_block: config.end_block(),
        mint_events: event_count,
        records: records.len(),
        output_file: config.output_file().to_path_buf(),
    })
}

/// Fetch and decode `IncreaseLiquidity` events for the configured range.
///
/// # Errors
///
/// Transport, query and malformed data errors.
pub async fn run_increase_liquidity_scan<S: StarknetSource>(
    source: &S,
    config: &Config,
) -> IndexerResult<Vec<IncreaseLiquidityEvent>> {
    fetch_increase_liquidity_events(source, config).await
}
