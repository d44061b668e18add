//! Fetching and decoding of pool liquidity events.
//!
//! Starknet events carry an untyped `Vec<Felt>` payload. Decoding maps that
//! payload onto [`MintEvent`] and [`IncreaseLiquidityEvent`] using the
//! declarative layouts in [`layout`]. Short payloads are reported as
//! [`IndexerError::MalformedEventError`](crate::error::IndexerError::MalformedEventError)
//! rather than aborting the process.
//!
//! ## Example
//!
//! ```
//! use starknet::core::types::Felt;
//! use starknet_position_indexer::events::decode_mint_data;
//!
//! let data: Vec<Felt> = (0_u64..10).map(Felt::from).collect();
//! let mint = decode_mint_data(&data)?;
//! assert_eq!(mint.amount1, Felt::from(9_u64));
//! # Ok::<(), starknet_position_indexer::error::IndexerError>(())
//! ```
//!
//! Only one page of events is requested per query. If the node reports a
//! continuation token, the remaining events are not fetched and a warning is
//! logged.

pub mod layout;

use starknet::core::types::Felt;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::error::IndexerResult;
use crate::models::{IncreaseLiquidityEvent, MintEvent, Tick};
use crate::rpc::{EventQuery, RawEvent, StarknetSource};
use layout::{INCREASE_LIQUIDITY_LAYOUT, MINT_LAYOUT};

/// Fetch a single page of raw events for `query`.
///
/// # Errors
///
/// Propagates transport and query errors from the source.
#[instrument(skip(source), fields(from = query.from_block, to = query.to_block, events = tracing::field::Empty))]
pub async fn fetch_events<S: StarknetSource>(
    source: &S,
    query: &EventQuery,
) -> IndexerResult<Vec<RawEvent>> {
    debug!(address = %format!("{:#x}", query.address), "Requesting events");

    let page = source.fetch_events_page(query).await?;

    if page.continuation_token.is_some() {
        warn!(
            chunk_size = query.chunk_size,
            "Node reported more events than one page holds; results are truncated"
        );
    }

    tracing::Span::current().record("events", page.events.len());
    debug!("Fetched {} events", page.events.len());

    Ok(page.events)
}

/// Decode a `Mint` payload.
///
/// # Errors
///
/// Returns a malformed event error when `data` has fewer than ten fields.
pub fn decode_mint_data(data: &[Felt]) -> IndexerResult<MintEvent> {
    let [sender, owner, lower_mag, lower_sign, upper_mag, upper_sign, amount, amount0, amount1] =
        MINT_LAYOUT.extract(data)?;

    Ok(MintEvent {
        sender,
        owner,
        tick_lower: Tick::new(lower_mag, lower_sign),
        tick_upper: Tick::new(upper_mag, upper_sign),
        amount,
        amount0,
        amount1,
    })
}

/// Decode an `IncreaseLiquidity` event.
///
/// # Errors
///
/// Returns a malformed event error when the payload has fewer than six fields.
pub fn decode_increase_liquidity(event: &RawEvent) -> IndexerResult<IncreaseLiquidityEvent> {
    let [token_id, liquidity, amount0, amount1] = INCREASE_LIQUIDITY_LAYOUT.extract(&event.data)?;

    Ok(IncreaseLiquidityEvent {
        block_number: event.block_number,
        token_id,
        liquidity,
        amount0,
        amount1,
    })
}

/// Fetch and decode all `Mint` events in the configured block range.
///
/// # Errors
///
/// Fails on the first transport, query or malformed event error.
pub async fn fetch_mint_events<S: StarknetSource>(
    source: &S,
    config: &Config,
) -> IndexerResult<Vec<MintEvent>> {
    let query = EventQuery {
        from_block: config.start_block(),
        to_block: config.end_block(),
        address: config.pool_address(),
        key: config.mint_event_key(),
        chunk_size: config.event_chunk_size(),
    };

    let raw = fetch_events(source, &query).await?;
    let mints = raw
        .iter()
        .map(|event| -> IndexerResult<MintEvent> {
            let mint = decode_mint_data(&event.data)?;
            debug!(
                block = ?event.block_number,
                tick_lower = ?mint.tick_lower.to_i64(),
                tick_upper = ?mint.tick_upper.to_i64(),
                "Decoded Mint event"
            );
            Ok(mint)
        })
        .collect::<IndexerResult<Vec<_>>>()?;

    info!(
        count = mints.len(),
        from = query.from_block,
        to = query.to_block,
        "Decoded Mint events"
    );

    Ok(mints)
}

/// Fetch and decode all `IncreaseLiquidity` events in the configured range.
///
/// # Errors
///
/// Fails on the first transport, query or malformed event error.
pub async fn fetch_increase_liquidity_events<S: StarknetSource>(
    source: &S,
    config: &Config,
) -> IndexerResult<Vec<IncreaseLiquidityEvent>> {
    let query = EventQuery {
        from_block: config.start_block(),
        to_block: config.end_block(),
        address: config.position_manager_address(),
        key: config.increase_liquidity_event_key(),
        chunk_size: config.event_chunk_size(),
    };

    let raw = fetch_events(source, &query).await?;
    let events = raw
        .iter()
        .map(decode_increase_liquidity)
        .collect::<IndexerResult<Vec<_>>>()?;

    info!(count = events.len(), "Decoded IncreaseLiquidity events");

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndexerError;

    fn felts(values: impl IntoIterator<Item = u64>) -> Vec<Felt> {
        values.into_iter().map(Felt::from).collect()
    }

    #[test]
    fn test_mint_decoding_offsets() {
        // Index 8 carries a sentinel that must not appear anywhere
        let data = felts([1, 2, 100, 0, 200, 1, 5000, 10, 99, 20]);
        let mint = decode_mint_data(&data);
        assert!(mint.is_ok());

        if let Ok(mint) = mint {
            assert_eq!(mint.sender, Felt::from(1_u64));
            assert_eq!(mint.owner, Felt::from(2_u64));
            assert_eq!(mint.tick_lower, Tick::new(Felt::from(100_u64), Felt::ZERO));
            assert_eq!(mint.tick_upper, Tick::new(Felt::from(200_u64), Felt::ONE));
            assert_eq!(mint.amount, Felt::from(5000_u64));
            assert_eq!(mint.amount0, Felt::from(10_u64));
            assert_eq!(mint.amount1, Felt::from(20_u64));

            let json = serde_json::to_string(&mint).unwrap_or_default();
            assert!(!json.contains("\"99\""));
        }
    }

    #[test]
    fn test_mint_decoding_short_payload() {
        let result = decode_mint_data(&felts(0..9));
        assert!(matches!(
            result,
            Err(IndexerError::MalformedEventError { ref kind, required: 10, actual: 9 }) if kind == "Mint"
        ));
    }

    #[test]
    fn test_increase_liquidity_decoding() {
        let event = RawEvent {
            block_number: Some(550_861),
            data: felts([42, 0, 7000, 11, 0, 13]),
        };
        let decoded = decode_increase_liquidity(&event);
        assert!(decoded.is_ok());

        if let Ok(decoded) = decoded {
            assert_eq!(decoded.block_number, Some(550_861));
            assert_eq!(decoded.token_id, Felt::from(42_u64));
            assert_eq!(decoded.liquidity, Felt::from(7000_u64));
            assert_eq!(decoded.amount0, Felt::from(11_u64));
            assert_eq!(decoded.amount1, Felt::from(13_u64));
        }
    }

    #[test]
    fn test_increase_liquidity_short_payload() {
        let event = RawEvent {
            block_number: None,
            data: felts([1, 2, 3]),
        };
        assert!(decode_increase_liquidity(&event).is_err());
    }
}
