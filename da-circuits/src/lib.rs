//! KZG-based data-availability circuits for the DA prover.
//!
//! This crate owns the cryptographic half of the challenge-response protocol:
//! turning file bytes into a polynomial, committing to it, opening it at the
//! chain-supplied randomness and folding many openings into one.
//!
//! # Architecture
//!
//! ```text
//! REGISTER PHASE:
//!   File Bytes → 127-byte Blocks → 4 × 254-bit Field Elements → KZG Commit → FileRecord
//!
//! PROVE PHASE:
//!   Randomness z → Open Each Sampled File at z → Fold (sum) → Submit Aggregate
//!
//! DISPUTE PHASE:
//!   Commitments → 10-way Partition → Fold Each Slice → ... → One-Step Reveal
//! ```
//!
//! # Example
//!
//! ```ignore
//! use da_circuits::{fold, prove_bytes, verify, Srs};
//!
//! let srs = Srs::insecure_from_seed(4096, b"dev")?;
//! let z = da_circuits::fr_from_be_bytes(&chain_randomness);
//!
//! let (c1, p1) = prove_bytes(&srs, b"first file", z)?;
//! let (c2, p2) = prove_bytes(&srs, b"second file", z)?;
//!
//! let (folded_commitment, folded_proof) = fold(&[c1, c2], &[p1, p2])?;
//! assert!(verify(&srs, &folded_commitment, z, &folded_proof));
//! ```

pub mod encoder;
pub mod error;
pub mod fold;
pub mod kzg;
pub mod types;

pub use encoder::{decode_elements, encode_bytes, BLOCK_BYTES, ELEMENTS_PER_BLOCK};
pub use error::{DaError, Result};
pub use fold::{
    fold, fold_commitments, fold_partition, fold_proofs, partition, select_slice, BISECTION_WAYS,
};
pub use kzg::{commit, commit_bytes, open, prove_bytes, verify, Srs};
pub use types::{fr_from_be_bytes, fr_from_hex, fr_to_hex, Commitment, OpeningProof};

/// Curve configuration type aliases
pub mod config {
    /// Pairing engine (BLS12-381: 255-bit scalar field, so 254-bit chunks never reduce)
    pub type Engine = ark_bls12_381::Bls12_381;

    /// Scalar field
    pub type F = ark_bls12_381::Fr;

    /// Commitment group
    pub type G1 = ark_bls12_381::G1Affine;

    /// Verification group
    pub type G2 = ark_bls12_381::G2Affine;

    /// Size of a compressed G1 point in bytes
    pub const G1_COMPRESSED_BYTES: usize = 48;

    /// Size of a canonical scalar in bytes
    pub const SCALAR_BYTES: usize = 32;
}
