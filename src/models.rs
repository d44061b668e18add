//! Data model for decoded events, position snapshots and joined records.
//!
//! All field elements serialize as canonical decimal strings so the output
//! file never loses precision to floating point:
//!
//! ```
//! use starknet::core::types::Felt;
//! use starknet_position_indexer::models::Tick;
//!
//! let tick = Tick::new(Felt::from(100_u64), Felt::ZERO);
//! let json = serde_json::to_string(&tick).unwrap();
//! assert_eq!(json, r#"{"mag":"100","sign":"0"}"#);
//! ```

use serde::{Deserialize, Serialize};
use starknet::core::types::Felt;

/// Serde adapter that writes a [`Felt`] as its decimal string.
pub mod felt_dec {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use starknet::core::types::Felt;

    /// Serialize as a decimal string.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(value: &Felt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_biguint().to_string())
    }

    /// Parse a decimal string back into a field element.
    ///
    /// # Errors
    ///
    /// Fails when the string is not a decimal number inside the field.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Felt, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(D::Error::custom(format!(
                "expected a decimal field element, got {raw:?}"
            )));
        }
        let felt = Felt::from_dec_str(&raw)
            .map_err(|e| D::Error::custom(format!("invalid field element {raw:?}: {e}")))?;

        // Parsing reduces modulo the field prime; values at or above it must not wrap
        let digits = raw.trim_start_matches('0');
        let digits = if digits.is_empty() { "0" } else { digits };
        if felt.to_biguint().to_string() != digits {
            return Err(D::Error::custom(format!(
                "decimal {raw:?} does not fit in a field element"
            )));
        }
        Ok(felt)
    }
}

/// Signed tick encoded as an unsigned magnitude plus a sign word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    /// Absolute value of the tick
    #[serde(with = "felt_dec")]
    pub mag: Felt,
    /// Zero for positive ticks, non-zero for negative ticks
    #[serde(with = "felt_dec")]
    pub sign: Felt,
}

impl Tick {
    /// Build a tick from its raw words.
    #[must_use]
    pub const fn new(mag: Felt, sign: Felt) -> Self {
        Self { mag, sign }
    }

    /// Whether the sign word marks a negative tick.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.sign != Felt::ZERO
    }

    /// Signed tick value, or `None` if the magnitude exceeds `i64`.
    ///
    /// ```
    /// use starknet::core::types::Felt;
    /// use starknet_position_indexer::models::Tick;
    ///
    /// let tick = Tick::new(Felt::from(887_220_u64), Felt::ONE);
    /// assert_eq!(tick.to_i64(), Some(-887_220));
    /// ```
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        let bytes = self.mag.to_bytes_be();
        let (high, low) = bytes.split_at(24);
        if high.iter().any(|b| *b != 0) {
            return None;
        }
        let mut word = [0_u8; 8];
        word.copy_from_slice(low);
        let magnitude = i64::try_from(u64::from_be_bytes(word)).ok()?;
        Some(if self.is_negative() {
            -magnitude
        } else {
            magnitude
        })
    }
}

/// One liquidity mint on the pool contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintEvent {
    /// Account that initiated the mint
    #[serde(with = "felt_dec")]
    pub sender: Felt,
    /// Owner of the minted position
    #[serde(with = "felt_dec")]
    pub owner: Felt,
    /// Lower bound of the position range
    pub tick_lower: Tick,
    /// Upper bound of the position range
    pub tick_upper: Tick,
    /// Liquidity added
    #[serde(with = "felt_dec")]
    pub amount: Felt,
    /// Token0 deposited
    #[serde(with = "felt_dec")]
    pub amount0: Felt,
    /// Token1 deposited
    #[serde(with = "felt_dec")]
    pub amount1: Felt,
}

/// Liquidity increase on an existing position NFT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncreaseLiquidityEvent {
    /// Block the event was emitted in, if the node reported it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// Position NFT id
    #[serde(with = "felt_dec")]
    pub token_id: Felt,
    /// Liquidity added
    #[serde(with = "felt_dec")]
    pub liquidity: Felt,
    /// Token0 deposited
    #[serde(with = "felt_dec")]
    pub amount0: Felt,
    /// Token1 deposited
    #[serde(with = "felt_dec")]
    pub amount1: Felt,
}

/// Position accounting returned by `get_position_info` at call time.
///
/// This is the state at the latest block, not at the block of the mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionInfo {
    /// Current liquidity of the position
    #[serde(with = "felt_dec")]
    pub liquidity: Felt,
    /// Token0 fee growth inside the range at last update
    #[serde(with = "felt_dec", rename = "feeGrowthInside0LastX128")]
    pub fee_growth_inside0_last_x128: Felt,
    /// Token1 fee growth inside the range at last update
    #[serde(with = "felt_dec", rename = "feeGrowthInside1LastX128")]
    pub fee_growth_inside1_last_x128: Felt,
    /// Uncollected token0
    #[serde(with = "felt_dec")]
    pub tokens_owed0: Felt,
    /// Uncollected token1
    #[serde(with = "felt_dec")]
    pub tokens_owed1: Felt,
}

/// A mint event paired with the position it created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedRecord {
    /// Originating event
    pub mint_event: MintEvent,
    /// Position snapshot for the event's owner and tick range
    pub position: PositionInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_mint() -> MintEvent {
        MintEvent {
            sender: Felt::from(1_u64),
            owner: Felt::from(2_u64),
            tick_lower: Tick::new(Felt::from(100_u64), Felt::ZERO),
            tick_upper: Tick::new(Felt::from(200_u64), Felt::ZERO),
            amount: Felt::from(5000_u64),
            amount0: Felt::from(10_u64),
            amount1: Felt::from(20_u64),
        }
    }

    #[test]
    fn test_tick_sign() {
        let positive = Tick::new(Felt::from(60_u64), Felt::ZERO);
        assert!(!positive.is_negative());
        assert_eq!(positive.to_i64(), Some(60));

        let negative = Tick::new(Felt::from(60_u64), Felt::ONE);
        assert!(negative.is_negative());
        assert_eq!(negative.to_i64(), Some(-60));
    }

    #[test]
    fn test_tick_magnitude_out_of_range() {
        let huge = Tick::new(Felt::from(u128::MAX), Felt::ZERO);
        assert_eq!(huge.to_i64(), None);
    }

    #[test]
    fn test_mint_event_field_names() {
        let value = serde_json::to_value(sample_mint());
        assert!(value.is_ok());

        if let Ok(value) = value {
            assert_eq!(value["sender"], "1");
            assert_eq!(value["tickLower"]["mag"], "100");
            assert_eq!(value["tickUpper"]["sign"], "0");
            assert_eq!(value["amount1"], "20");
        }
    }

    #[test]
    fn test_position_field_names() {
        let position = PositionInfo {
            liquidity: Felt::from(5000_u64),
            fee_growth_inside0_last_x128: Felt::from(1_u64),
            fee_growth_inside1_last_x128: Felt::from(3_u64),
            tokens_owed0: Felt::from(6_u64),
            tokens_owed1: Felt::from(7_u64),
        };
        let value = serde_json::to_value(&position);
        assert!(value.is_ok());

        if let Ok(value) = value {
            assert_eq!(value["feeGrowthInside0LastX128"], "1");
            assert_eq!(value["feeGrowthInside1LastX128"], "3");
            assert_eq!(value["tokensOwed1"], "7");
        }
    }

    #[test]
    fn test_large_values_keep_exact_decimals() {
        // P - 1 with P = 2^251 + 17 * 2^192 + 1
        let max = Felt::MAX;
        let mut mint = sample_mint();
        mint.amount = max;

        let json = serde_json::to_string(&mint).unwrap_or_default();
        assert!(json.contains(
            "\"amount\":\"3618502788666131213697322783095070105623107215331596699973092056135872020480\""
        ));

        let parsed: Result<MintEvent, _> = serde_json::from_str(&json);
        assert!(matches!(parsed, Ok(ref m) if m.amount == max));
    }

    #[test]
    fn test_rejects_values_outside_field() {
        // P and P + 1 would otherwise wrap to 0 and 1
        for raw in [
            "3618502788666131213697322783095070105623107215331596699973092056135872020481",
            "3618502788666131213697322783095070105623107215331596699973092056135872020482",
        ] {
            let json = format!(r#"{{"mag":"{raw}","sign":"0"}}"#);
            let parsed: Result<Tick, _> = serde_json::from_str(&json);
            assert!(parsed.is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn test_accepts_leading_zeros() {
        let parsed: Result<Tick, _> = serde_json::from_str(r#"{"mag":"00100","sign":"000"}"#);
        assert!(matches!(parsed, Ok(t) if t == Tick::new(Felt::from(100_u64), Felt::ZERO)));
    }

    #[test]
    fn test_rejects_hex_strings() {
        let json = r#"{"mag":"0x64","sign":"0"}"#;
        let parsed: Result<Tick, _> = serde_json::from_str(json);
        assert!(parsed.is_err());
    }
}
