//! Error types for the Starknet position indexer.
//!
//! This module provides a unified error type [`IndexerError`] covering every
//! stage of a run: configuration, event fetching, decoding, position
//! enrichment, joining and writing the output file.
//!
//! # Design
//!
//! The error hierarchy is organized by stage:
//! - [`IndexerError::ConfigError`]: Configuration and environment issues
//! - [`IndexerError::TransportError`]: Node unreachable or endpoint malformed
//! - [`IndexerError::QueryError`]: Node rejected an event filter or call
//! - [`IndexerError::MalformedEventError`]: Event or call data too short for its layout
//! - [`IndexerError::LengthMismatchError`]: Parallel lists disagree in length
//! - [`IndexerError::SerializationError`]: JSON encoding failures
//! - [`IndexerError::WriteError`]: Output file creation or write failures
//!
//! None of these are retried. The caller decides whether a failure ends the
//! whole run.
//!
//! # Example
//!
//! ```
//! use starknet_position_indexer::error::{IndexerError, IndexerResult};
//!
//! fn check_range(from: u64, to: u64) -> IndexerResult<()> {
//!     if from > to {
//!         return Err(IndexerError::config("start block is after end block", None));
//!     }
//!     Ok(())
//! }
//! # assert!(check_range(2, 1).is_err());
//! ```

use std::fmt;

/// Boxed source error carried by most variants.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias using [`IndexerError`].
pub type IndexerResult<T> = Result<T, IndexerError>;

/// Unified error type for the position indexer.
#[derive(Debug)]
pub enum IndexerError {
    /// Configuration or environment variable errors.
    ///
    /// Variants include:
    /// - Invalid field element hex strings
    /// - Non-numeric block numbers or chunk sizes
    /// - Inverted block ranges
    ConfigError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<BoxedSource>,
    },

    /// The node endpoint cannot be reached or is malformed.
    TransportError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<BoxedSource>,
    },

    /// The node rejected an event filter or a contract call.
    QueryError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<BoxedSource>,
    },

    /// Event data or a call response is shorter than its layout requires.
    MalformedEventError {
        /// Layout that was being decoded (e.g. "Mint")
        kind: String,
        /// Minimum number of fields the layout reads
        required: usize,
        /// Number of fields actually present
        actual: usize,
    },

    /// Two lists that must be paired by index have different lengths.
    LengthMismatchError {
        /// Which stage detected the mismatch
        context: String,
        /// Length of the reference list
        expected: usize,
        /// Length of the list that disagreed
        actual: usize,
    },

    /// JSON encoding failed.
    SerializationError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<BoxedSource>,
    },

    /// Output file could not be created or written.
    WriteError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<BoxedSource>,
    },
}

impl IndexerError {
    /// Create a new configuration error.
    ///
    /// # Example
    ///
    /// ```
    /// use starknet_position_indexer::error::IndexerError;
    ///
    /// let err = IndexerError::config("POOL_ADDRESS is not a valid felt", None);
    /// assert!(matches!(err, IndexerError::ConfigError { .. }));
    /// ```
    #[must_use]
    pub fn config(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::ConfigError {
            message: message.into(),
            source,
        }
    }

    /// Create a new transport error.
    ///
    /// # Example
    ///
    /// ```
    /// use starknet_position_indexer::error::IndexerError;
    ///
    /// let err = IndexerError::transport("connection refused", None);
    /// assert!(matches!(err, IndexerError::TransportError { .. }));
    /// ```
    #[must_use]
    pub fn transport(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::TransportError {
            message: message.into(),
            source,
        }
    }

    /// Create a new query error.
    #[must_use]
    pub fn query(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::QueryError {
            message: message.into(),
            source,
        }
    }

    /// Create a new malformed event error.
    ///
    /// # Example
    ///
    /// ```
    /// use starknet_position_indexer::error::IndexerError;
    ///
    /// let err = IndexerError::malformed_event("Mint", 10, 7);
    /// assert_eq!(err.to_string(), "Malformed Mint data: expected at least 10 fields, got 7");
    /// ```
    #[must_use]
    pub fn malformed_event(kind: impl Into<String>, required: usize, actual: usize) -> Self {
        Self::MalformedEventError {
            kind: kind.into(),
            required,
            actual,
        }
    }

    /// Create a new length mismatch error.
    #[must_use]
    pub fn length_mismatch(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::LengthMismatchError {
            context: context.into(),
            expected,
            actual,
        }
    }

    /// Create a new serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::SerializationError {
            message: message.into(),
            source,
        }
    }

    /// Create a new write error.
    #[must_use]
    pub fn write(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::WriteError {
            message: message.into(),
            source,
        }
    }
}

impl fmt::Display for IndexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError { message, .. } => write!(f, "Configuration error: {message}"),
            Self::TransportError { message, .. } => write!(f, "Transport error: {message}"),
            Self::QueryError { message, .. } => write!(f, "Query error: {message}"),
            Self::MalformedEventError {
                kind,
                required,
                actual,
            } => write!(
                f,
                "Malformed {kind} data: expected at least {required} fields, got {actual}"
            ),
            Self::LengthMismatchError {
                context,
                expected,
                actual,
            } => write!(
                f,
                "Length mismatch in {context}: expected {expected} entries, got {actual}"
            ),
            Self::SerializationError { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
            Self::WriteError { message, .. } => write!(f, "Write error: {message}"),
        }
    }
}

impl std::error::Error for IndexerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigError { source, .. }
            | Self::TransportError { source, .. }
            | Self::QueryError { source, .. }
            | Self::SerializationError { source, .. }
            | Self::WriteError { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &dyn std::error::Error),
            Self::MalformedEventError { .. } | Self::LengthMismatchError { .. } => None,
        }
    }
}

/// Convert from `eyre::Report` to `IndexerError`.
///
/// Reports without a more specific category are treated as transport
/// failures. The message keeps the full context chain.
impl From<eyre::Report> for IndexerError {
    fn from(err: eyre::Report) -> Self {
        Self::TransportError {
            message: format!("{err:#}"),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_config_error() {
        let err = IndexerError::config("bad value", None);
        assert!(matches!(err, IndexerError::ConfigError { .. }));
        assert_eq!(err.to_string(), "Configuration error: bad value");
    }

    #[test]
    fn test_transport_and_query_errors() {
        let err = IndexerError::transport("connection refused", None);
        assert_eq!(err.to_string(), "Transport error: connection refused");

        let err = IndexerError::query("invalid filter", None);
        assert_eq!(err.to_string(), "Query error: invalid filter");
    }

    #[test]
    fn test_length_mismatch_error() {
        let err = IndexerError::length_mismatch("join", 3, 2);
        assert_eq!(
            err.to_string(),
            "Length mismatch in join: expected 3 entries, got 2"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn test_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = IndexerError::write("failed to create output", Some(Box::new(source)));

        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "Write error: failed to create output");
    }

    #[test]
    fn test_from_eyre_report() {
        let err: IndexerError = eyre::eyre!("node went away").into();
        assert!(matches!(err, IndexerError::TransportError { .. }));
        assert_eq!(err.to_string(), "Transport error: node went away");
    }

    #[test]
    fn test_from_eyre_report_keeps_context() {
        use eyre::WrapErr;

        let report = Err::<(), _>(std::io::Error::other("refused"))
            .wrap_err("connecting to node")
            .err();
        assert!(report.is_some());

        if let Some(report) = report {
            let err: IndexerError = report.into();
            assert_eq!(err.to_string(), "Transport error: connecting to node: refused");
        }
    }
}
