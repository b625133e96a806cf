//! Homomorphic folding of KZG openings and the bisection partition.
//!
//! Commitments and witnesses are linear in the polynomial, so summing
//! `(C_i, W_i, v_i)` opened at the same point yields a valid opening of
//! `sum f_i` at that point. Zero placeholders are the group identity and
//! drop out of the sum.

use ark_bls12_381::G1Projective;
use ark_ec::CurveGroup;
use ark_ff::Zero;

use crate::config::F;
use crate::types::{Commitment, OpeningProof};
use crate::{DaError, Result};

/// Number of slices produced per bisection round.
pub const BISECTION_WAYS: usize = 10;

/// Sum of commitments; the identity for an empty slice.
pub fn fold_commitments(commitments: &[Commitment]) -> Commitment {
    let sum = commitments
        .iter()
        .fold(G1Projective::zero(), |acc, c| acc + c.0);
    Commitment(sum.into_affine())
}

/// Sum of witnesses and claimed values.
pub fn fold_proofs(proofs: &[OpeningProof]) -> OpeningProof {
    let (witness, value) = proofs.iter().fold(
        (G1Projective::zero(), F::zero()),
        |(w, v), p| (w + p.witness, v + p.value),
    );
    OpeningProof {
        witness: witness.into_affine(),
        value,
    }
}

/// Fold parallel commitment and proof arrays into one aggregate opening.
pub fn fold(commitments: &[Commitment], proofs: &[OpeningProof]) -> Result<(Commitment, OpeningProof)> {
    if commitments.len() != proofs.len() {
        return Err(DaError::LengthMismatch {
            commitments: commitments.len(),
            proofs: proofs.len(),
        });
    }
    Ok((fold_commitments(commitments), fold_proofs(proofs)))
}

/// Split `commitments` into exactly [`BISECTION_WAYS`] contiguous slices of
/// `ceil(len / 10)` elements; trailing slices may be short or empty.
pub fn partition(commitments: &[Commitment]) -> Vec<Vec<Commitment>> {
    let size = commitments.len().div_ceil(BISECTION_WAYS);
    let mut slices = Vec::with_capacity(BISECTION_WAYS);
    for i in 0..BISECTION_WAYS {
        let start = (i * size).min(commitments.len());
        let end = ((i + 1) * size).min(commitments.len());
        slices.push(commitments[start..end].to_vec());
    }
    slices
}

/// Fold each slice of a partition into its aggregate commitment.
pub fn fold_partition(slices: &[Vec<Commitment>]) -> Vec<Commitment> {
    slices.iter().map(|s| fold_commitments(s)).collect()
}

/// Select the slice the challenger disputed.
pub fn select_slice(slices: &[Vec<Commitment>], index: usize) -> Result<&[Commitment]> {
    slices
        .get(index)
        .map(Vec::as_slice)
        .ok_or(DaError::InvalidPartitionIndex {
            index,
            slices: slices.len(),
        })
}
