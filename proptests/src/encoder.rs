//! Property-based tests for the shard encoder.
//!
//! Tests the following invariants:
//! - ENC-1: Every 127-byte block yields exactly four elements
//! - ENC-2: The two most significant bits of every element are zero
//! - ENC-3: Decoding restores the input followed by zero padding

use crate::strategies::*;
use ark_ff::{BigInteger, PrimeField};
use da_circuits::{BLOCK_BYTES, ELEMENTS_PER_BLOCK, decode_elements, encode_bytes};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// ENC-1: Element count is 4 * ceil(len / 127).
    #[test]
    fn prop_element_count(data in file_data_strategy(0, 2_000)) {
        let elements = encode_bytes(&data);
        prop_assert_eq!(
            elements.len(),
            data.len().div_ceil(BLOCK_BYTES) * ELEMENTS_PER_BLOCK
        );
    }

    /// ENC-2: Every element is below 2^254.
    #[test]
    fn prop_top_bits_clear(data in file_data_strategy(1, 1_000)) {
        for element in encode_bytes(&data) {
            let le = element.into_bigint().to_bytes_le();
            prop_assert_eq!(le[31] & 0xC0, 0, "element exceeds 254 bits");
        }
    }

    /// ENC-2b: An all-ones block fills every data bit and nothing else.
    #[test]
    fn prop_dense_block_uses_1016_bits(blocks in 1usize..4) {
        let data = vec![0xFFu8; blocks * BLOCK_BYTES];
        let ones: u32 = encode_bytes(&data)
            .iter()
            .flat_map(|e| e.into_bigint().to_bytes_le())
            .map(|b| b.count_ones())
            .sum();
        prop_assert_eq!(ones as usize, blocks * BLOCK_BYTES * 8);
    }

    /// ENC-3: decode(encode(data)) is data plus zero padding.
    #[test]
    fn prop_decode_restores_input(data in file_data_strategy(0, 1_500)) {
        let decoded = decode_elements(&encode_bytes(&data));
        prop_assert_eq!(decoded.len(), data.len().div_ceil(BLOCK_BYTES) * BLOCK_BYTES);
        prop_assert_eq!(&decoded[..data.len()], &data[..]);
        prop_assert!(decoded[data.len()..].iter().all(|&b| b == 0));
    }
}
