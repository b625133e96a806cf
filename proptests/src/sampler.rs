//! Property-based tests for file sampling.
//!
//! Tests the following invariants:
//! - SAMPLE-1: Two replicas of the same registry snapshot produce the same
//!   slot commitments, placeholders and fold for the same randomness
//! - SAMPLE-2: The window lies within the registry
//! - SAMPLE-3: Slot expansion always yields exactly the requested slots

use crate::strategies::*;
use da_circuits::{commit_bytes, fr_from_be_bytes};
use da_prover::da::aggregator::{RoundProof, aggregate};
use da_prover::da::sampler::{collect_samples, sample_window, slot_assignment};
use da_prover::mock::{MemoryFileRegistry, MemoryStorage};
use da_prover::registry::{FileRegistry, NewFileRecord};
use proptest::prelude::*;

const CYCLE_START: i64 = 1_000;

/// Files as `(content, live at CYCLE_START)`. Content is never all zero,
/// so only expired files commit to the identity.
fn snapshot_strategy() -> impl Strategy<Value = Vec<(Vec<u8>, bool)>> {
    let content = file_data_strategy(1, max_test_file_bytes())
        .prop_filter("all-zero content", |data| data.iter().any(|b| *b != 0));
    prop::collection::vec((content, any::<bool>()), 1..=12)
}

/// Build a fresh registry replica from `files` and prove one round over it.
fn prove_replica(files: &[(Vec<u8>, bool)], rnd: &[u8], slots: usize) -> RoundProof {
    let srs = test_srs();
    let registry = MemoryFileRegistry::default();
    let storage = MemoryStorage::default();
    for (i, (content, live)) in files.iter().enumerate() {
        let content_id = format!("file-{}", i + 1);
        storage.insert(&content_id, content.clone());
        registry
            .create_file_record(NewFileRecord {
                commitment: commit_bytes(srs, content).unwrap(),
                content_id,
                size_bytes: content.len() as i64,
                expiration: if *live { CYCLE_START + 1 } else { CYCLE_START },
            })
            .unwrap();
    }

    let window = sample_window(rnd, files.len() as u64, slots).unwrap();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let samples = runtime
        .block_on(collect_samples(&registry, &storage, window, CYCLE_START))
        .unwrap();
    aggregate(srs, &samples, slots, fr_from_be_bytes(rnd)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// SAMPLE-1: The round is a pure function of (randomness, L, snapshot,
    /// cycle start), including which slots carry zero placeholders.
    #[test]
    fn prop_round_is_deterministic(
        files in snapshot_strategy(),
        rnd in rnd_strategy(),
        slots in 1usize..30,
    ) {
        let first = prove_replica(&files, &rnd, slots);
        let second = prove_replica(&files, &rnd, slots);

        prop_assert_eq!(&first.commits, &second.commits);
        prop_assert_eq!(&first.proofs, &second.proofs);
        prop_assert_eq!(first.folded_commitment, second.folded_commitment);
        prop_assert_eq!(first.folded_proof, second.folded_proof);

        let window = sample_window(&rnd, files.len() as u64, slots).unwrap();
        let assignment = slot_assignment(window.record_count() as usize, slots);
        prop_assert_eq!(first.commits.len(), slots);
        for (slot, record) in assignment.iter().enumerate() {
            let (_, live) = &files[window.start_id as usize - 1 + *record];
            prop_assert_eq!(first.commits[slot].is_zero(), !live);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// SAMPLE-2: 1 <= start <= end <= L and the window never holds more
    /// records than slots.
    #[test]
    fn prop_window_within_registry(
        rnd in rnd_strategy(),
        file_count in 1u64..1_000_000,
        selected in 1usize..200,
    ) {
        let window = sample_window(&rnd, file_count, selected).unwrap();
        prop_assert!(window.start_id >= 1);
        prop_assert!(window.start_id <= window.end_id);
        prop_assert!(window.end_id <= file_count);
        prop_assert!(window.record_count() <= selected as u64);
    }

    /// SAMPLE-3: Slot i takes record i mod len.
    #[test]
    fn prop_slots_cover_records_cyclically(records in 1usize..100, slots in 0usize..300) {
        let assignment = slot_assignment(records, slots);
        prop_assert_eq!(assignment.len(), slots);
        for (slot, record) in assignment.iter().enumerate() {
            prop_assert_eq!(*record, slot % records);
        }
    }
}
