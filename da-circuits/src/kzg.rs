//! KZG polynomial commitments over BLS12-381.
//!
//! Encoded file elements are treated as polynomial coefficients (lowest
//! degree first). A commitment is the inner product of the coefficients with
//! the SRS powers `[τ^i]G1`; an opening at `z` commits to the quotient
//! `(f(X) - f(z)) / (X - z)`.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ark_bls12_381::{G1Projective, G2Projective};
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup, Group, VariableBaseMSM};
use ark_ff::{PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::config::{Engine, F, G1, G2};
use crate::encoder::{encode_bytes, max_bytes_for_elements};
use crate::types::{Commitment, OpeningProof};
use crate::DaError;

/// Domain separator for deriving the insecure development τ.
const DEV_TAU_DOMAIN: &[u8] = b"da-circuits/dev-srs/v1";

/// Structured reference string: powers of τ in G1 and `[1]G2`, `[τ]G2`.
#[derive(Debug, Clone, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Srs {
    g1_powers: Vec<G1>,
    g2: G2,
    tau_g2: G2,
}

impl Srs {
    /// Build an SRS from explicit points (e.g. a ceremony transcript).
    pub fn from_points(g1_powers: Vec<G1>, g2: G2, tau_g2: G2) -> crate::Result<Self> {
        if g1_powers.is_empty() {
            return Err(DaError::EmptySrs);
        }
        Ok(Self {
            g1_powers,
            g2,
            tau_g2,
        })
    }

    /// Build an SRS from a known τ.
    ///
    /// Anyone who knows τ can forge openings: development and tests only.
    pub fn insecure_from_tau(size: usize, tau: F) -> crate::Result<Self> {
        if size == 0 {
            return Err(DaError::EmptySrs);
        }
        let g1 = G1Projective::generator();
        let mut powers = Vec::with_capacity(size);
        let mut acc = F::from(1u64);
        for _ in 0..size {
            powers.push(g1 * acc);
            acc *= tau;
        }
        let g2 = G2Projective::generator();
        Ok(Self {
            g1_powers: G1Projective::normalize_batch(&powers),
            g2: g2.into_affine(),
            tau_g2: (g2 * tau).into_affine(),
        })
    }

    /// Deterministic development SRS with τ derived from `seed`.
    pub fn insecure_from_seed(size: usize, seed: &[u8]) -> crate::Result<Self> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(DEV_TAU_DOMAIN);
        hasher.update(seed);
        let mut tau = F::from_le_bytes_mod_order(hasher.finalize().as_bytes());
        if tau.is_zero() {
            tau = F::from(1u64);
        }
        Self::insecure_from_tau(size, tau)
    }

    /// Load a compressed SRS written by [`Srs::save`].
    pub fn load(path: &Path) -> crate::Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let srs = Self::deserialize_compressed(reader)?;
        if srs.g1_powers.is_empty() {
            return Err(DaError::EmptySrs);
        }
        Ok(srs)
    }

    /// Write the SRS in compressed form.
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(path)?);
        self.serialize_compressed(writer)?;
        Ok(())
    }

    /// Maximum number of coefficients that can be committed.
    pub fn max_coefficients(&self) -> usize {
        self.g1_powers.len()
    }

    /// Largest file (in bytes) whose encoding fits this SRS.
    pub fn max_file_bytes(&self) -> usize {
        max_bytes_for_elements(self.g1_powers.len())
    }

    fn check_capacity(&self, coefficients: usize) -> crate::Result<()> {
        if coefficients > self.g1_powers.len() {
            return Err(DaError::DegreeTooLarge {
                coefficients,
                capacity: self.g1_powers.len(),
            });
        }
        Ok(())
    }

    fn msm(&self, coefficients: &[F]) -> crate::Result<G1> {
        self.check_capacity(coefficients.len())?;
        if coefficients.is_empty() {
            return Ok(G1::zero());
        }
        let bases = &self.g1_powers[..coefficients.len()];
        G1Projective::msm(bases, coefficients)
            .map(|p| p.into_affine())
            .map_err(|_| DaError::DegreeTooLarge {
                coefficients: coefficients.len(),
                capacity: bases.len(),
            })
    }
}

/// Commit to a polynomial given by its coefficients.
pub fn commit(srs: &Srs, coefficients: &[F]) -> crate::Result<Commitment> {
    srs.msm(coefficients).map(Commitment)
}

/// Encode bytes and commit to the resulting polynomial.
pub fn commit_bytes(srs: &Srs, data: &[u8]) -> crate::Result<Commitment> {
    commit(srs, &encode_bytes(data))
}

/// Open a polynomial at `z`.
///
/// Synthetic division by `(X - z)` yields both the quotient coefficients and
/// the remainder, which is `f(z)`.
pub fn open(srs: &Srs, coefficients: &[F], z: F) -> crate::Result<OpeningProof> {
    srs.check_capacity(coefficients.len())?;
    if coefficients.is_empty() {
        return Ok(OpeningProof::zero());
    }

    let n = coefficients.len();
    let mut quotient = vec![F::zero(); n - 1];
    let mut acc = F::zero();
    for i in (0..n).rev() {
        acc = acc * z + coefficients[i];
        if i > 0 {
            quotient[i - 1] = acc;
        }
    }

    Ok(OpeningProof {
        witness: srs.msm(&quotient)?,
        value: acc,
    })
}

/// Encode bytes, commit, and open at `z` in one pass.
pub fn prove_bytes(srs: &Srs, data: &[u8], z: F) -> crate::Result<(Commitment, OpeningProof)> {
    let coefficients = encode_bytes(data);
    let commitment = commit(srs, &coefficients)?;
    let proof = open(srs, &coefficients, z)?;
    Ok((commitment, proof))
}

/// Check `e(C - [v]G1, G2) == e(W, [τ]G2 - [z]G2)`.
pub fn verify(srs: &Srs, commitment: &Commitment, z: F, proof: &OpeningProof) -> bool {
    let g1 = G1Projective::generator();
    let lhs_g1 = (commitment.0.into_group() - g1 * proof.value).into_affine();
    let rhs_g2 = (srs.tau_g2.into_group() - srs.g2 * z).into_affine();

    Engine::pairing(lhs_g1, srs.g2) == Engine::pairing(proof.witness, rhs_g2)
}

/// Evaluate a coefficient-form polynomial at `z` (Horner).
pub fn evaluate(coefficients: &[F], z: F) -> F {
    coefficients
        .iter()
        .rev()
        .fold(F::zero(), |acc, c| acc * z + c)
}
