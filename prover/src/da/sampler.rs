//! Deterministic selection of the files proved in a round.
//!
//! The window is a pure function of the randomness and the candidate pool
//! size `L` reported by the verifier:
//!
//! ```text
//! r     = be_uint(rnd) mod L
//! start = r / 2
//! count = min(selected_file_count, L)
//! end   = start + (count - 1) / 2
//! ids   = [start + 1, end + 1]
//! ```
//!
//! The window is expanded cyclically to exactly `selected_file_count` slots.

use anyhow::{Context, Result};
use num_bigint::BigUint;
use tracing::debug;

use crate::registry::{FileRecord, FileRegistry};
use crate::storage::StorageBackend;

/// Inclusive range of registry IDs sampled for a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleWindow {
    pub start_id: u64,
    pub end_id: u64,
}

impl SampleWindow {
    /// Number of records in the window (never zero).
    pub fn record_count(&self) -> u64 {
        self.end_id - self.start_id + 1
    }
}

/// Compute the sampled ID range, or `None` when there is nothing to sample.
pub fn sample_window(rnd: &[u8], pool_len: u64, selected_file_count: usize) -> Option<SampleWindow> {
    if pool_len == 0 || selected_file_count == 0 {
        return None;
    }

    let r = BigUint::from_bytes_be(rnd) % BigUint::from(pool_len);
    // r < pool_len, so it fits in a single digit (zero has none).
    let r = r.iter_u64_digits().next().unwrap_or(0);

    let count = (selected_file_count as u64).min(pool_len);
    let start = r / 2;
    let end = start + (count - 1) / 2;

    Some(SampleWindow {
        start_id: start + 1,
        end_id: end + 1,
    })
}

/// A sampled record and, when it still has to be proved, its content.
#[derive(Clone, Debug)]
pub struct SampledFile {
    pub record: FileRecord,
    /// `None` for records expired at cycle start (zero placeholder)
    pub content: Option<Vec<u8>>,
}

impl SampledFile {
    pub fn is_live(&self) -> bool {
        self.content.is_some()
    }
}

/// Whether a record must be proved in the cycle starting at `cycle_start`.
pub fn is_live(record: &FileRecord, cycle_start: i64) -> bool {
    record.expiration > cycle_start
}

/// Record index used by each slot: slot `i` takes record `i mod len`.
///
/// Empty when there are no records; the caller fills every slot with a
/// zero placeholder in that case.
pub fn slot_assignment(records: usize, slots: usize) -> Vec<usize> {
    if records == 0 {
        return Vec::new();
    }
    (0..slots).map(|i| i % records).collect()
}

/// Fetch the window from the registry and the content of live records.
///
/// Any content fetch error aborts the sample.
pub async fn collect_samples(
    registry: &dyn FileRegistry,
    storage: &dyn StorageBackend,
    window: SampleWindow,
    cycle_start: i64,
) -> Result<Vec<SampledFile>> {
    let records = registry
        .get_range_file_info(window.start_id, window.end_id)
        .with_context(|| {
            format!(
                "failed to read files {}..={} from registry",
                window.start_id, window.end_id
            )
        })?;

    let mut samples = Vec::with_capacity(records.len());
    for record in records {
        let content = if is_live(&record, cycle_start) {
            let bytes = storage
                .get_object(&record.content_id)
                .await
                .with_context(|| format!("failed to fetch content of file {}", record.id))?;
            debug!(id = record.id, size = bytes.len(), "Sampled live file");
            Some(bytes)
        } else {
            debug!(
                id = record.id,
                expiration = record.expiration,
                "Sampled expired file, using zero placeholder"
            );
            None
        };
        samples.push(SampledFile { record, content });
    }

    Ok(samples)
}
