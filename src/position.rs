//! Position enrichment via `get_position_info` view calls.
//!
//! Each Mint event names an owner and a tick range. For every one of them
//! the pool is asked for its current position accounting, one call at a
//! time, against the `latest` block. The snapshot therefore reflects the
//! chain head, not the block the position was minted in.

use starknet::core::types::{BlockId, BlockTag, Felt};
use tracing::{debug, error, info, instrument};

use crate::config::Config;
use crate::error::{IndexerError, IndexerResult};
use crate::events::layout::POSITION_INFO_LAYOUT;
use crate::models::{MintEvent, PositionInfo};
use crate::rpc::{ContractCall, StarknetSource};

/// Parallel per-position inputs for the view call.
///
/// Entry `i` of every list belongs to the same position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionQueries {
    /// Position owners
    pub owners: Vec<Felt>,
    /// Lower tick magnitudes
    pub tick_lower_mags: Vec<Felt>,
    /// Lower tick sign words
    pub tick_lower_signs: Vec<Felt>,
    /// Upper tick magnitudes
    pub tick_upper_mags: Vec<Felt>,
    /// Upper tick sign words
    pub tick_upper_signs: Vec<Felt>,
}

impl PositionQueries {
    /// Collect owner and tick range of every event, in event order.
    #[must_use]
    pub fn from_mint_events(events: &[MintEvent]) -> Self {
        let mut queries = Self::default();
        for event in events {
            queries.owners.push(event.owner);
            queries.tick_lower_mags.push(event.tick_lower.mag);
            queries.tick_lower_signs.push(event.tick_lower.sign);
            queries.tick_upper_mags.push(event.tick_upper.mag);
            queries.tick_upper_signs.push(event.tick_upper.sign);
        }
        queries
    }

    /// Number of positions, taken from the owner list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Whether there are no owners.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Whether all five lists have the same length.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let n = self.owners.len();
        [
            self.tick_lower_mags.len(),
            self.tick_lower_signs.len(),
            self.tick_upper_mags.len(),
            self.tick_upper_signs.len(),
        ]
        .iter()
        .all(|len| *len == n)
    }

    /// Per-position calldata `[owner, lower_mag, lower_sign, upper_mag, upper_sign]`,
    /// in input order.
    ///
    /// # Errors
    ///
    /// Returns a length mismatch error when the lists are inconsistent, so no
    /// position is ever silently dropped.
    pub fn calldata(&self) -> IndexerResult<Vec<Vec<Felt>>> {
        let expected = self.owners.len();
        if let Some(actual) = [
            self.tick_lower_mags.len(),
            self.tick_lower_signs.len(),
            self.tick_upper_mags.len(),
            self.tick_upper_signs.len(),
        ]
        .into_iter()
        .find(|len| *len != expected)
        {
            return Err(IndexerError::length_mismatch(
                "position calldata",
                expected,
                actual,
            ));
        }

        Ok(self
            .owners
            .iter()
            .zip(&self.tick_lower_mags)
            .zip(&self.tick_lower_signs)
            .zip(&self.tick_upper_mags)
            .zip(&self.tick_upper_signs)
            .map(|((((owner, lower_mag), lower_sign), upper_mag), upper_sign)| {
                vec![*owner, *lower_mag, *lower_sign, *upper_mag, *upper_sign]
            })
            .collect())
    }
}

/// Decode a `get_position_info` response.
///
/// # Errors
///
/// Returns a malformed event error when the response has fewer than seven
/// fields.
pub fn decode_position_info(response: &[Felt]) -> IndexerResult<PositionInfo> {
    let [liquidity, fee_growth_inside0_last_x128, fee_growth_inside1_last_x128, tokens_owed0, tokens_owed1] =
        POSITION_INFO_LAYOUT.extract(response)?;

    Ok(PositionInfo {
        liquidity,
        fee_growth_inside0_last_x128,
        fee_growth_inside1_last_x128,
        tokens_owed0,
        tokens_owed1,
    })
}

/// Read the current state of every queried position.
///
/// Inconsistent input lists are logged and yield an empty list without any
/// call being made. Otherwise calls run sequentially in input order, and the
/// first failing call or undecodable response aborts the whole batch.
///
/// # Errors
///
/// Propagates transport, query and malformed response errors.
#[instrument(skip_all, fields(positions = queries.len()))]
pub async fn fetch_position_infos<S: StarknetSource>(
    source: &S,
    config: &Config,
    queries: &PositionQueries,
) -> IndexerResult<Vec<PositionInfo>> {
    if !queries.is_consistent() {
        error!(
            owners = queries.owners.len(),
            tick_lower_mags = queries.tick_lower_mags.len(),
            tick_lower_signs = queries.tick_lower_signs.len(),
            tick_upper_mags = queries.tick_upper_mags.len(),
            tick_upper_signs = queries.tick_upper_signs.len(),
            "Position inputs do not have the same length"
        );
        return Ok(Vec::new());
    }

    let rows = queries.calldata()?;
    let mut positions = Vec::with_capacity(rows.len());
    for (i, calldata) in rows.into_iter().enumerate() {
        debug!(index = i, owner = %format!("{:#x}", calldata[0]), "Reading position");
        let call = ContractCall {
            contract_address: config.pool_address(),
            selector: config.position_info_selector(),
            calldata,
        };

        let response = source
            .call_contract(&call, BlockId::Tag(BlockTag::Latest))
            .await?;
        positions.push(decode_position_info(&response)?);
    }

    info!(count = positions.len(), "Fetched position info");

    Ok(positions)
}
