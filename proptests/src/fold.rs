//! Property-based tests for proof folding.
//!
//! Tests the following invariants:
//! - FOLD-1: Folding openings equals opening the summed polynomial
//! - FOLD-2: Folded proofs verify
//! - FOLD-3: Zero placeholders do not change the aggregate

use crate::strategies::*;
use da_circuits::config::F;
use da_circuits::{Commitment, OpeningProof, commit, encode_bytes, fold, open, prove_bytes, verify};
use proptest::prelude::*;

fn sum_polynomials(files: &[Vec<u8>]) -> Vec<F> {
    let mut sum: Vec<F> = Vec::new();
    for file in files {
        let coefficients = encode_bytes(file);
        if coefficients.len() > sum.len() {
            sum.resize(coefficients.len(), F::from(0u64));
        }
        for (acc, c) in sum.iter_mut().zip(coefficients) {
            *acc += c;
        }
    }
    sum
}

fn prove_all(files: &[Vec<u8>], z: F) -> (Vec<Commitment>, Vec<OpeningProof>) {
    files
        .iter()
        .map(|file| prove_bytes(test_srs(), file, z).unwrap())
        .unzip()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// FOLD-1: fold(list) == open(sum of polynomials, z).
    #[test]
    fn prop_fold_is_homomorphic(files in file_set_strategy(6), z in point_strategy()) {
        let srs = test_srs();
        let (commits, proofs) = prove_all(&files, z);
        let (folded_commitment, folded_proof) = fold(&commits, &proofs).unwrap();

        let sum = sum_polynomials(&files);
        prop_assert_eq!(folded_commitment, commit(srs, &sum).unwrap());
        prop_assert_eq!(folded_proof, open(srs, &sum, z).unwrap());
    }

    /// FOLD-2: The folded opening passes the pairing check.
    #[test]
    fn prop_folded_proof_verifies(files in file_set_strategy(6), z in point_strategy()) {
        let (commits, proofs) = prove_all(&files, z);
        let (folded_commitment, folded_proof) = fold(&commits, &proofs).unwrap();
        prop_assert!(verify(test_srs(), &folded_commitment, z, &folded_proof));
    }

    /// FOLD-3: Appending zero placeholders leaves the fold unchanged.
    #[test]
    fn prop_zero_placeholders_are_identity(
        files in file_set_strategy(4),
        zeros in 1usize..8,
        z in point_strategy(),
    ) {
        let (mut commits, mut proofs) = prove_all(&files, z);
        let expected = fold(&commits, &proofs).unwrap();

        commits.extend(std::iter::repeat_n(Commitment::zero(), zeros));
        proofs.extend(std::iter::repeat_n(OpeningProof::zero(), zeros));
        prop_assert_eq!(fold(&commits, &proofs).unwrap(), expected);
    }
}
