//! Positional field layouts for untyped Starknet event and call data.
//!
//! Starknet events and view-call results arrive as flat `Vec<Felt>`. Each
//! layout below names the indices it reads; indices not listed are never
//! read. The gaps mirror the remote contract ABI and are kept as observed.

use starknet::core::types::Felt;

use crate::error::{IndexerError, IndexerResult};

/// Ordered `(field_name, source_index)` pairs for one data kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout<const N: usize> {
    /// Name used in diagnostics
    pub kind: &'static str,
    /// Fields in output order
    pub fields: [(&'static str, usize); N],
}

impl<const N: usize> Layout<N> {
    /// Minimum data length needed to decode this layout.
    #[must_use]
    pub fn required_len(&self) -> usize {
        self.fields
            .iter()
            .map(|(_, index)| index + 1)
            .max()
            .unwrap_or(0)
    }

    /// Indices below [`required_len`](Self::required_len) that no field reads.
    #[must_use]
    pub fn skipped_indices(&self) -> Vec<usize> {
        (0..self.required_len())
            .filter(|i| !self.fields.iter().any(|(_, index)| index == i))
            .collect()
    }

    /// Pick this layout's fields out of `data`, in layout order.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::MalformedEventError`] when `data` is shorter
    /// than [`required_len`](Self::required_len). Extra trailing fields are
    /// ignored.
    pub fn extract(&self, data: &[Felt]) -> IndexerResult<[Felt; N]> {
        let required = self.required_len();
        if data.len() < required {
            return Err(IndexerError::malformed_event(self.kind, required, data.len()));
        }
        Ok(std::array::from_fn(|i| data[self.fields[i].1]))
    }
}

/// `Mint` event data. Index 8 is not read.
pub const MINT_LAYOUT: Layout<9> = Layout {
    kind: "Mint",
    fields: [
        ("sender", 0),
        ("owner", 1),
        ("tickLower.mag", 2),
        ("tickLower.sign", 3),
        ("tickUpper.mag", 4),
        ("tickUpper.sign", 5),
        ("amount", 6),
        ("amount0", 7),
        ("amount1", 9),
    ],
};

/// `IncreaseLiquidity` event data. Indices 1 and 4 are not read.
pub const INCREASE_LIQUIDITY_LAYOUT: Layout<4> = Layout {
    kind: "IncreaseLiquidity",
    fields: [
        ("tokenId", 0),
        ("liquidity", 2),
        ("amount0", 3),
        ("amount1", 5),
    ],
};

/// `get_position_info` return data. Indices 2 and 4 are not read.
pub const POSITION_INFO_LAYOUT: Layout<5> = Layout {
    kind: "get_position_info",
    fields: [
        ("liquidity", 0),
        ("feeGrowthInside0LastX128", 1),
        ("feeGrowthInside1LastX128", 3),
        ("tokensOwed0", 5),
        ("tokensOwed1", 6),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    fn felts(values: impl IntoIterator<Item = u64>) -> Vec<Felt> {
        values.into_iter().map(Felt::from).collect()
    }

    #[test]
    fn test_required_lengths() {
        assert_eq!(MINT_LAYOUT.required_len(), 10);
        assert_eq!(INCREASE_LIQUIDITY_LAYOUT.required_len(), 6);
        assert_eq!(POSITION_INFO_LAYOUT.required_len(), 7);
    }

    #[test]
    fn test_skipped_indices() {
        assert_eq!(MINT_LAYOUT.skipped_indices(), vec![8]);
        assert_eq!(INCREASE_LIQUIDITY_LAYOUT.skipped_indices(), vec![1, 4]);
        assert_eq!(POSITION_INFO_LAYOUT.skipped_indices(), vec![2, 4]);
    }

    #[test]
    fn test_extract_in_layout_order() {
        let data = felts(10..20);
        let extracted = POSITION_INFO_LAYOUT.extract(&data);
        let expected = felts([10, 11, 13, 15, 16]);
        assert!(matches!(extracted, Ok(values) if values.to_vec() == expected));
    }

    #[test]
    fn test_extract_short_data() {
        let data = felts(0..9);
        let result = MINT_LAYOUT.extract(&data);
        assert!(matches!(
            result,
            Err(IndexerError::MalformedEventError {
                required: 10,
                actual: 9,
                ..
            })
        ));
    }

    #[test]
    fn test_extract_ignores_trailing_fields() {
        let data = felts(0..12);
        assert!(INCREASE_LIQUIDITY_LAYOUT.extract(&data).is_ok());
    }
}
