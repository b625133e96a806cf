//! Shared proptest strategies for property-based testing.

use da_circuits::Srs;
use da_circuits::config::F;
use proptest::prelude::*;
use std::sync::OnceLock;

/// Number of G1 powers in the shared test SRS.
pub const TEST_SRS_SIZE: usize = 64;

/// Largest file the shared test SRS can commit to.
pub fn max_test_file_bytes() -> usize {
    test_srs().max_file_bytes()
}

/// Deterministic SRS shared by all property tests.
pub fn test_srs() -> &'static Srs {
    static SRS: OnceLock<Srs> = OnceLock::new();
    SRS.get_or_init(|| Srs::insecure_from_seed(TEST_SRS_SIZE, b"proptests").unwrap())
}

/// Random file data within a size range.
pub fn file_data_strategy(min_size: usize, max_size: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), min_size..=max_size)
}

/// Up to `max_files` files that all fit the test SRS.
pub fn file_set_strategy(max_files: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(file_data_strategy(0, max_test_file_bytes()), 1..=max_files)
}

/// A non-zero evaluation point.
pub fn point_strategy() -> impl Strategy<Value = F> {
    (1u64..u64::MAX).prop_map(F::from)
}

/// Randomness as returned by the verifier (32 bytes, big-endian).
pub fn rnd_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 32)
}

/// Challenge cycle parameters `(interval, period)`.
pub fn cycle_strategy() -> impl Strategy<Value = (i64, i64)> {
    (1i64..100_000, 0i64..1_000_000)
}
