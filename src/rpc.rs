//! Starknet JSON-RPC access.
//!
//! The rest of the crate talks to the node through the [`StarknetSource`]
//! trait so the pipeline can run against an in-memory source in tests. The
//! production implementation is the `starknet` crate's
//! [`JsonRpcClient`] over HTTP.
//!
//! ## Example
//!
//! ```no_run
//! use starknet_position_indexer::rpc::{create_provider, EventQuery, StarknetSource};
//! use starknet_position_indexer::error::IndexerResult;
//! use starknet::core::types::Felt;
//!
//! # async fn example() -> IndexerResult<()> {
//! let provider = create_provider("https://starknet-mainnet.public.blastapi.io")?;
//! let query = EventQuery {
//!     from_block: 550_860,
//!     to_block: 550_862,
//!     address: Felt::from_hex_unchecked("0x1"),
//!     key: Felt::from_hex_unchecked("0x2"),
//!     chunk_size: 1000,
//! };
//! let page = provider.fetch_events_page(&query).await?;
//! println!("{} events", page.events.len());
//! # Ok(())
//! # }
//! ```

use eyre::WrapErr;
use starknet::core::types::{BlockId, EmittedEvent, EventFilter, Felt, FunctionCall};
use starknet::providers::jsonrpc::HttpTransport;
use starknet::providers::{JsonRpcClient, Provider as _, ProviderError, Url};
use tracing::{debug, info, instrument};

use crate::error::{IndexerError, IndexerResult};

/// HTTP JSON-RPC client used against real nodes.
pub type Provider = JsonRpcClient<HttpTransport>;

/// Filter for a single page of events emitted by one contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    /// First block, inclusive
    pub from_block: u64,
    /// Last block, inclusive
    pub to_block: u64,
    /// Emitting contract
    pub address: Felt,
    /// Event selector expected as the first key
    pub key: Felt,
    /// Maximum events returned in the page
    pub chunk_size: u64,
}

impl EventQuery {
    /// Convert into the node's filter type.
    #[must_use]
    pub fn to_filter(&self) -> EventFilter {
        EventFilter {
            from_block: Some(BlockId::Number(self.from_block)),
            to_block: Some(BlockId::Number(self.to_block)),
            address: Some(self.address),
            keys: Some(vec![vec![self.key]]),
        }
    }
}

/// An emitted event reduced to what the decoders read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// Block number, absent for pending blocks
    pub block_number: Option<u64>,
    /// Flat event payload
    pub data: Vec<Felt>,
}

impl From<EmittedEvent> for RawEvent {
    fn from(event: EmittedEvent) -> Self {
        Self {
            block_number: event.block_number,
            data: event.data,
        }
    }
}

/// One page of events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPage {
    /// Events in node order
    pub events: Vec<RawEvent>,
    /// Set when the node has more matching events than the page holds
    pub continuation_token: Option<String>,
}

/// A read-only contract invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    /// Target contract
    pub contract_address: Felt,
    /// Entry point selector
    pub selector: Felt,
    /// Arguments
    pub calldata: Vec<Felt>,
}

/// Source of Starknet events and view-call results.
///
/// Calls are awaited one at a time by the pipeline; implementations need not
/// be `Send`.
#[allow(async_fn_in_trait)]
pub trait StarknetSource {
    /// Fetch one page of events matching `query`.
    ///
    /// # Errors
    ///
    /// [`IndexerError::TransportError`] when the node is unreachable,
    /// [`IndexerError::QueryError`] when it rejects the filter.
    async fn fetch_events_page(&self, query: &EventQuery) -> IndexerResult<EventPage>;

    /// Execute a view call against `block`.
    ///
    /// # Errors
    ///
    /// Same classification as [`fetch_events_page`](Self::fetch_events_page).
    async fn call_contract(&self, call: &ContractCall, block: BlockId) -> IndexerResult<Vec<Felt>>;
}

impl StarknetSource for Provider {
    async fn fetch_events_page(&self, query: &EventQuery) -> IndexerResult<EventPage> {
        let page = self
            .get_events(query.to_filter(), None, query.chunk_size)
            .await
            .map_err(|e| classify_provider_error("starknet_getEvents failed", e))?;

        Ok(EventPage {
            events: page.events.into_iter().map(RawEvent::from).collect(),
            continuation_token: page.continuation_token,
        })
    }

    async fn call_contract(&self, call: &ContractCall, block: BlockId) -> IndexerResult<Vec<Felt>> {
        let request = FunctionCall {
            contract_address: call.contract_address,
            entry_point_selector: call.selector,
            calldata: call.calldata.clone(),
        };

        self.call(request, block)
            .await
            .map_err(|e| classify_provider_error("starknet_call failed", e))
    }
}

/// Node-side rejections are query errors; everything else is transport.
fn classify_provider_error(context: &str, err: ProviderError) -> IndexerError {
    let message = format!("{context}: {err}");
    if matches!(err, ProviderError::StarknetError(_)) {
        IndexerError::query(message, Some(Box::new(err)))
    } else {
        IndexerError::transport(message, Some(Box::new(err)))
    }
}

/// Create a JSON-RPC client for `rpc_url`.
///
/// No request is sent here; an unreachable node surfaces on the first call.
///
/// # Errors
///
/// Returns [`IndexerError::TransportError`] if the URL does not parse or is
/// not HTTP(S).
#[instrument(skip(rpc_url))]
pub fn create_provider(rpc_url: &str) -> IndexerResult<Provider> {
    info!("Initializing Starknet RPC provider");

    let url = parse_rpc_url(rpc_url)?;
    debug!(rpc_host = url.host_str().unwrap_or("unknown"), "Creating HTTP transport");

    Ok(JsonRpcClient::new(HttpTransport::new(url)))
}

fn parse_rpc_url(rpc_url: &str) -> eyre::Result<Url> {
    let url = Url::parse(rpc_url).wrap_err_with(|| {
        format!("Invalid RPC URL: '{rpc_url}'. Expected format: 'https://host[:port]/path'")
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(eyre::eyre!(
            "Unsupported RPC URL scheme '{}': only http and https are supported",
            url.scheme()
        ));
    }

    Ok(url)
}
