//! Joining mint events with positions and writing the result file.
//!
//! Events and positions are paired by ordinal index only. The file is
//! rendered completely in memory before it is created, so a run either
//! writes the full list or leaves the target path untouched.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::{debug, info};

use crate::error::{IndexerError, IndexerResult};
use crate::models::{CombinedRecord, MintEvent, PositionInfo};

/// Pair each event with the position at the same index.
///
/// # Errors
///
/// Returns [`IndexerError::LengthMismatchError`] when the lists differ in
/// length.
pub fn join_records(
    mint_events: Vec<MintEvent>,
    positions: Vec<PositionInfo>,
) -> IndexerResult<Vec<CombinedRecord>> {
    if mint_events.len() != positions.len() {
        return Err(IndexerError::length_mismatch(
            "mint event / position join",
            mint_events.len(),
            positions.len(),
        ));
    }

    Ok(mint_events
        .into_iter()
        .zip(positions)
        .map(|(mint_event, position)| CombinedRecord {
            mint_event,
            position,
        })
        .collect())
}

/// Render records as JSON with four-space indentation.
///
/// # Errors
///
/// Returns [`IndexerError::SerializationError`] if encoding fails.
pub fn render_json(records: &[CombinedRecord]) -> IndexerResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut serializer).map_err(|e| {
        IndexerError::serialization("Failed to encode combined records", Some(Box::new(e)))
    })?;
    Ok(buffer)
}

/// Write records to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns a serialization error if encoding fails (nothing is written) or a
/// write error if the file cannot be created or written.
pub fn write_json(records: &[CombinedRecord], path: &Path) -> IndexerResult<()> {
    let bytes = render_json(records)?;
    debug!(bytes = bytes.len(), path = %path.display(), "Writing output file");

    fs::write(path, bytes).map_err(|e| {
        IndexerError::write(
            format!("Failed to write {}", path.display()),
            Some(Box::new(e)),
        )
    })?;

    info!(records = records.len(), path = %path.display(), "Combined data written");
    Ok(())
}

/// Join and write in one step. On a join failure the file is not touched.
///
/// # Errors
///
/// See [`join_records`] and [`write_json`].
pub fn write_combined_output(
    mint_events: Vec<MintEvent>,
    positions: Vec<PositionInfo>,
    path: &Path,
) -> IndexerResult<Vec<CombinedRecord>> {
    let records = join_records(mint_events, positions)?;
    write_json(&records, path)?;
    Ok(records)
}
