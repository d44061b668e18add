//! # Starknet Position Indexer
//!
//! Fetches liquidity `Mint` events from a Starknet pool contract, reads the
//! current state of every minted position with a `get_position_info` view
//! call, and writes each event joined with its position to a JSON file.
//! `IncreaseLiquidity` events from the position manager can be listed too.
//!
//! ## Architecture
//!
//! 1. **Config Layer** ([`config`]) - Environment variable loading
//! 2. **RPC Layer** ([`rpc`]) - Starknet JSON-RPC access behind [`rpc::StarknetSource`]
//! 3. **Events Layer** ([`events`]) - Event fetching and positional decoding
//! 4. **Position Layer** ([`position`]) - Per-position view calls
//! 5. **Output Layer** ([`output`]) - Ordinal join and JSON writing
//!
//! [`pipeline`] wires the layers together; [`cli`] is the binary's front end.
//!
//! ## Using as a Library
//!
//! ```rust,no_run
//! use starknet_position_indexer::{config::Config, pipeline::run_mint_pipeline, rpc::create_provider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?.with_block_range(550_860, 550_862)?;
//!     let provider = create_provider(config.rpc_url())?;
//!
//!     let report = run_mint_pipeline(&provider, &config).await?;
//!     println!("{} records written to {}", report.records, report.output_file.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Limitations
//!
//! - One page of events per query (default 1000); extra matches are dropped
//! - Positions are read at the `latest` block, not at the mint block
//! - Calls run one after another with no retry or timeout
//!
//! ## License
//!
//! Licensed under either of:
//!
//! - MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//! - Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//!
//! at your option.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod observability;
pub mod output;
pub mod pipeline;
pub mod position;
pub mod rpc;
