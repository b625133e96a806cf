//! Property-based tests for the bisection partition.
//!
//! Tests the following invariants:
//! - BISECT-1: A partition has ten slices of at most ceil(n / 10) each,
//!   covering the list in order
//! - BISECT-2: Any five challenger choices narrow the list to at most
//!   ceil(n / 10^5) commitments
//! - BISECT-3: The revealed slice is never larger than a round-1 slice

use crate::strategies::*;
use da_circuits::{
    BISECTION_WAYS, Commitment, commit_bytes, fold_commitments, fold_partition, partition,
    select_slice,
};
use proptest::prelude::*;
use std::sync::OnceLock;

const POOL_SIZE: usize = 300;

/// Distinct commitments, computed once.
fn distinct_commitments() -> &'static [Commitment] {
    static POOL: OnceLock<Vec<Commitment>> = OnceLock::new();
    POOL.get_or_init(|| {
        (1..=POOL_SIZE as u64)
            .map(|i| commit_bytes(test_srs(), &i.to_be_bytes()).unwrap())
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// BISECT-1: Ten ordered slices of ceil(n / 10) that concatenate to the input.
    #[test]
    fn prop_partition_covers_in_order(n in 0usize..=POOL_SIZE) {
        let list = &distinct_commitments()[..n];
        let slices = partition(list);

        prop_assert_eq!(slices.len(), BISECTION_WAYS);
        let size = n.div_ceil(BISECTION_WAYS);
        prop_assert!(slices.iter().all(|s| s.len() <= size));
        prop_assert_eq!(slices.concat(), list.to_vec());

        // Folded slices add up to the fold of the whole list
        let folded = fold_partition(&slices);
        prop_assert_eq!(fold_commitments(&folded), fold_commitments(list));
    }

    /// BISECT-2 / BISECT-3: Five rounds reach ceil(n / 10^5), and the revealed
    /// list never exceeds a round-1 slice.
    #[test]
    fn prop_five_rounds_terminate(
        n in 1usize..120_000,
        choices in prop::collection::vec(0usize..BISECTION_WAYS, 5),
    ) {
        // Values do not affect the partition shape
        let list = vec![Commitment::zero(); n];
        let round_one_size = n.div_ceil(BISECTION_WAYS);

        let mut current = list;
        for choice in choices {
            let slices = partition(&current);
            current = select_slice(&slices, choice).unwrap().to_vec();
        }

        prop_assert!(current.len() <= n.div_ceil(100_000));
        prop_assert!(current.len() <= round_one_size);
    }

    /// Out-of-range challenger indices are rejected.
    #[test]
    fn prop_index_out_of_range_rejected(n in 0usize..50, index in BISECTION_WAYS..1_000) {
        let slices = partition(&distinct_commitments()[..n]);
        prop_assert!(select_slice(&slices, index).is_err());
    }
}
