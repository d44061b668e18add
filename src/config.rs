//! Configuration management for the Starknet position indexer.
//!
//! This module handles loading and validating configuration from environment
//! variables using the `dotenvy` crate. Every setting has a mainnet default,
//! so an empty environment reproduces the stock run.
//!
//! ## Environment Variables
//!
//! All optional (with defaults):
//! - `STARKNET_RPC_URL`: JSON-RPC endpoint (default: public Blast mainnet gateway)
//! - `POOL_ADDRESS`: Contract emitting `Mint` and serving `get_position_info`
//! - `POSITION_MANAGER_ADDRESS`: Contract emitting `IncreaseLiquidity`
//! - `MINT_EVENT_KEY`: Selector of the `Mint` event
//! - `INCREASE_LIQUIDITY_EVENT_KEY`: Selector of the `IncreaseLiquidity` event
//! - `POSITION_INFO_FUNCTION`: View function name (default: `get_position_info`)
//! - `EVENT_CHUNK_SIZE`: Page size for event queries (default: 1000)
//! - `START_BLOCK` / `END_BLOCK`: Inclusive block range (default: 550860..=550862)
//! - `OUTPUT_FILE`: Joined output path (default: `combined_output.json`)
//!
//! ## Example
//!
//! ```no_run
//! use starknet_position_indexer::config::Config;
//! use starknet_position_indexer::error::IndexerResult;
//!
//! # fn main() -> IndexerResult<()> {
//! let config = Config::from_env()?;
//! println!("RPC URL: {}", config.rpc_url());
//! # Ok(())
//! # }
//! ```

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use starknet::core::types::Felt;
use starknet::core::utils::get_selector_from_name;

use crate::error::{IndexerError, IndexerResult};

/// Public Starknet mainnet JSON-RPC gateway.
pub const DEFAULT_RPC_URL: &str = "https://starknet-mainnet.public.blastapi.io";

/// Pool contract that emits `Mint` and answers `get_position_info`.
pub const DEFAULT_POOL_ADDRESS: Felt =
    Felt::from_hex_unchecked("0x06096f2a295571bd45b627c88c7f1760cc8ff27c1c3c204e68ed3fe040844d2d");

/// Position manager contract that emits `IncreaseLiquidity`.
pub const DEFAULT_POSITION_MANAGER_ADDRESS: Felt =
    Felt::from_hex_unchecked("0x00287d2ff1c39a44cd18d9dc7ed5617c9cb16b65090db6a0f689aa14755e4e5e");

/// Key of the `Mint` event.
pub const DEFAULT_MINT_EVENT_KEY: Felt =
    Felt::from_hex_unchecked("0x34e55c1cd55f1338241b50d352f0e91c7e4ffad0e4271d64eb347589ebdfd16");

/// Key of the `IncreaseLiquidity` event.
pub const DEFAULT_INCREASE_LIQUIDITY_EVENT_KEY: Felt =
    Felt::from_hex_unchecked("0x3159b5cf425448a640d4666273b957d14e6c7a6a5a6a758af3c58d7ab7841fb");

/// View function queried once per minted position.
pub const DEFAULT_POSITION_INFO_FUNCTION: &str = "get_position_info";

/// Events requested per page. Matches beyond this are dropped.
pub const DEFAULT_EVENT_CHUNK_SIZE: u64 = 1000;

/// Default first block of the scan.
pub const DEFAULT_START_BLOCK: u64 = 550_860;

/// Default last block of the scan.
pub const DEFAULT_END_BLOCK: u64 = 550_862;

/// Default joined output path.
pub const DEFAULT_OUTPUT_FILE: &str = "combined_output.json";

/// Runtime configuration passed into every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// JSON-RPC endpoint
    rpc_url: String,

    /// Contract emitting `Mint` and serving position reads
    pool_address: Felt,

    /// Contract emitting `IncreaseLiquidity`
    position_manager_address: Felt,

    /// `Mint` event key
    mint_event_key: Felt,

    /// `IncreaseLiquidity` event key
    increase_liquidity_event_key: Felt,

    /// View function name for position reads
    position_info_function: String,

    /// Selector derived from `position_info_function`
    position_info_selector: Felt,

    /// Event page size
    event_chunk_size: u64,

    /// First block, inclusive
    start_block: u64,

    /// Last block, inclusive
    end_block: u64,

    /// Output file
    output_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            pool_address: DEFAULT_POOL_ADDRESS,
            position_manager_address: DEFAULT_POSITION_MANAGER_ADDRESS,
            mint_event_key: DEFAULT_MINT_EVENT_KEY,
            increase_liquidity_event_key: DEFAULT_INCREASE_LIQUIDITY_EVENT_KEY,
            position_info_function: DEFAULT_POSITION_INFO_FUNCTION.to_string(),
            position_info_selector: starknet::macros::selector!("get_position_info"),
            event_chunk_size: DEFAULT_EVENT_CHUNK_SIZE,
            start_block: DEFAULT_START_BLOCK,
            end_block: DEFAULT_END_BLOCK,
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Loads `.env` first if present, then reads each variable, falling
    /// back to the mainnet defaults.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::ConfigError`] if any variable is present but
    /// invalid, or the resulting block range is inverted.
    pub fn from_env() -> IndexerResult<Self> {
        // Load .env file if present (ignore error if file doesn't exist)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// ```
    /// use starknet_position_indexer::config::Config;
    ///
    /// let config = Config::from_lookup(|key| match key {
    ///     "START_BLOCK" => Some("100".to_string()),
    ///     "END_BLOCK" => Some("200".to_string()),
    ///     _ => None,
    /// })?;
    /// assert_eq!(config.start_block(), 100);
    /// # Ok::<(), starknet_position_indexer::error::IndexerError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> IndexerResult<Self> {
        let defaults = Self::default();

        let rpc_url = lookup("STARKNET_RPC_URL").unwrap_or(defaults.rpc_url);
        if rpc_url.trim().is_empty() {
            return Err(IndexerError::config("STARKNET_RPC_URL must not be empty", None));
        }

        let pool_address = felt_var(&lookup, "POOL_ADDRESS", defaults.pool_address)?;
        let position_manager_address = felt_var(
            &lookup,
            "POSITION_MANAGER_ADDRESS",
            defaults.position_manager_address,
        )?;
        let mint_event_key = felt_var(&lookup, "MINT_EVENT_KEY", defaults.mint_event_key)?;
        let increase_liquidity_event_key = felt_var(
            &lookup,
            "INCREASE_LIQUIDITY_EVENT_KEY",
            defaults.increase_liquidity_event_key,
        )?;

        let position_info_function =
            lookup("POSITION_INFO_FUNCTION").unwrap_or(defaults.position_info_function);
        let position_info_selector = selector_for(&position_info_function)?;

        let event_chunk_size =
            number_var(&lookup, "EVENT_CHUNK_SIZE", defaults.event_chunk_size)?;
        if event_chunk_size == 0 {
            return Err(IndexerError::config("EVENT_CHUNK_SIZE must be at least 1", None));
        }

        let start_block = number_var(&lookup, "START_BLOCK", defaults.start_block)?;
        let end_block = number_var(&lookup, "END_BLOCK", defaults.end_block)?;

        let output_file = lookup("OUTPUT_FILE").map_or(defaults.output_file, PathBuf::from);

        Self {
            rpc_url,
            pool_address,
            position_manager_address,
            mint_event_key,
            increase_liquidity_event_key,
            position_info_function,
            position_info_selector,
            event_chunk_size,
            start_block,
            end_block,
            output_file,
        }
        .validated()
    }

    /// Override the block range.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::ConfigError`] if `start_block > end_block`.
    pub fn with_block_range(mut self, start_block: u64, end_block: u64) -> IndexerResult<Self> {
        self.start_block = start_block;
        self.end_block = end_block;
        self.validated()
    }

    /// Override the output path.
    #[must_use]
    pub fn with_output_file(mut self, output_file: impl Into<PathBuf>) -> Self {
        self.output_file = output_file.into();
        self
    }

    fn validated(self) -> IndexerResult<Self> {
        if self.start_block > self.end_block {
            return Err(IndexerError::config(
                format!(
                    "start block {} is after end block {}",
                    self.start_block, self.end_block
                ),
                None,
            ));
        }
        Ok(self)
    }

    /// Get the JSON-RPC endpoint.
    #[must_use]
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Get the pool contract address.
    #[must_use]
    pub const fn pool_address(&self) -> Felt {
        self.pool_address
    }

    /// Get the position manager contract address.
    #[must_use]
    pub const fn position_manager_address(&self) -> Felt {
        self.position_manager_address
    }

    /// Get the `Mint` event key.
    #[must_use]
    pub const fn mint_event_key(&self) -> Felt {
        self.mint_event_key
    }

    /// Get the `IncreaseLiquidity` event key.
    #[must_use]
    pub const fn increase_liquidity_event_key(&self) -> Felt {
        self.increase_liquidity_event_key
    }

    /// Get the position view function name.
    #[must_use]
    pub fn position_info_function(&self) -> &str {
        &self.position_info_function
    }

    /// Get the position view function selector.
    #[must_use]
    pub const fn position_info_selector(&self) -> Felt {
        self.position_info_selector
    }

    /// Get the event page size.
    #[must_use]
    pub const fn event_chunk_size(&self) -> u64 {
        self.event_chunk_size
    }

    /// Get the first block of the scan.
    #[must_use]
    pub const fn start_block(&self) -> u64 {
        self.start_block
    }

    /// Get the last block of the scan.
    #[must_use]
    pub const fn end_block(&self) -> u64 {
        self.end_block
    }

    /// Get the output file path.
    #[must_use]
    pub fn output_file(&self) -> &Path {
        &self.output_file
    }
}

fn felt_var(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Felt,
) -> IndexerResult<Felt> {
    lookup(key).map_or(Ok(default), |raw| {
        Felt::from_hex(raw.trim()).map_err(|e| {
            IndexerError::config(
                format!("{key} must be a 0x-prefixed hex field element, got: {raw} ({e})"),
                None,
            )
        })
    })
}

fn number_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> IndexerResult<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim().parse::<T>().map_err(|e| {
            IndexerError::config(format!("{key} must be a valid number"), Some(Box::new(e)))
        })
    })
}

fn selector_for(name: &str) -> IndexerResult<Felt> {
    get_selector_from_name(name).map_err(|e| {
        IndexerError::config(
            format!("POSITION_INFO_FUNCTION must be an ASCII function name, got: {name}"),
            Some(Box::new(e)),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_from_empty_environment() {
        let config = Config::from_lookup(|_| None);
        assert!(config.is_ok());

        if let Ok(config) = config {
            assert_eq!(config, Config::default());
            assert_eq!(config.rpc_url(), DEFAULT_RPC_URL);
            assert_eq!(config.event_chunk_size(), 1000);
            assert_eq!(config.start_block(), 550_860);
            assert_eq!(config.end_block(), 550_862);
            assert_eq!(config.output_file(), Path::new("combined_output.json"));
        }
    }

    #[test]
    fn test_default_selector_matches_function_name() {
        let config = Config::default();
        let derived = selector_for(config.position_info_function());
        assert!(matches!(derived, Ok(selector) if selector == config.position_info_selector()));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("STARKNET_RPC_URL", "http://localhost:5050"),
            ("POOL_ADDRESS", "0x123"),
            ("EVENT_CHUNK_SIZE", "50"),
            ("OUTPUT_FILE", "/tmp/out.json"),
            ("POSITION_INFO_FUNCTION", "get_position"),
        ]));
        assert!(config.is_ok());

        if let Ok(config) = config {
            assert_eq!(config.rpc_url(), "http://localhost:5050");
            assert_eq!(config.pool_address(), Felt::from(0x123_u64));
            assert_eq!(config.event_chunk_size(), 50);
            assert_eq!(config.output_file(), Path::new("/tmp/out.json"));
            assert_ne!(config.position_info_selector(), Config::default().position_info_selector());
        }
    }

    #[test]
    fn test_invalid_address() {
        let result = Config::from_lookup(lookup_from(&[("POOL_ADDRESS", "not-hex")]));
        assert!(matches!(result, Err(IndexerError::ConfigError { .. })));
    }

    #[test]
    fn test_invalid_number() {
        let result = Config::from_lookup(lookup_from(&[("START_BLOCK", "abc")]));
        assert!(matches!(result, Err(IndexerError::ConfigError { .. })));
    }

    #[test]
    fn test_zero_chunk_size() {
        let result = Config::from_lookup(lookup_from(&[("EVENT_CHUNK_SIZE", "0")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_inverted_range() {
        let result = Config::from_lookup(lookup_from(&[
            ("START_BLOCK", "20"),
            ("END_BLOCK", "10"),
        ]));
        assert!(result.is_err());

        assert!(Config::default().with_block_range(5, 4).is_err());
        assert!(Config::default().with_block_range(5, 5).is_ok());
    }

    #[test]
    fn test_non_ascii_function_name() {
        let result = Config::from_lookup(lookup_from(&[("POSITION_INFO_FUNCTION", "pösition")]));
        assert!(result.is_err());
    }
}
