//! Per-slot KZG openings and their aggregation.

use anyhow::{Result, bail};
use rayon::prelude::*;
use tracing::debug;

use da_circuits::config::F;
use da_circuits::{Commitment, OpeningProof, Srs, encode_bytes, fold, open, verify};

use super::sampler::{SampledFile, slot_assignment};

/// Slot arrays and their fold for one round.
#[derive(Clone, Debug)]
pub struct RoundProof {
    /// Per-slot commitments, kept for the dispute phase
    pub commits: Vec<Commitment>,
    pub proofs: Vec<OpeningProof>,
    pub folded_commitment: Commitment,
    pub folded_proof: OpeningProof,
}

/// Opening of each sampled file at `z`, in sample order.
///
/// Live files are opened in parallel; expired files yield zero
/// placeholders. The commitment is the registered one, so a mismatch
/// between registry and stored content surfaces in [`aggregate`]'s check.
pub fn prove_samples(
    srs: &Srs,
    samples: &[SampledFile],
    z: F,
) -> Result<Vec<(Commitment, OpeningProof)>> {
    let proved: Vec<da_circuits::Result<(Commitment, OpeningProof)>> = samples
        .par_iter()
        .map(|sample| match &sample.content {
            Some(content) => {
                let proof = open(srs, &encode_bytes(content), z)?;
                Ok((sample.record.commitment, proof))
            }
            None => Ok((Commitment::zero(), OpeningProof::zero())),
        })
        .collect();

    let mut pairs = Vec::with_capacity(proved.len());
    for (sample, result) in samples.iter().zip(proved) {
        match result {
            Ok(pair) => pairs.push(pair),
            Err(e) => bail!(
                "file {} ({} bytes) cannot be proved with this SRS: {}",
                sample.record.id,
                sample.record.size_bytes,
                e
            ),
        }
    }
    Ok(pairs)
}

/// Spread per-file pairs over `slots` (slot `i` takes pair `i mod len`).
///
/// No pairs means every slot is a zero placeholder.
pub fn expand_slots(
    pairs: &[(Commitment, OpeningProof)],
    slots: usize,
) -> (Vec<Commitment>, Vec<OpeningProof>) {
    if pairs.is_empty() {
        return (
            vec![Commitment::zero(); slots],
            vec![OpeningProof::zero(); slots],
        );
    }
    slot_assignment(pairs.len(), slots)
        .into_iter()
        .map(|i| pairs[i])
        .unzip()
}

/// Prove, expand to `slots`, fold, and check the aggregate locally.
pub fn aggregate(srs: &Srs, samples: &[SampledFile], slots: usize, z: F) -> Result<RoundProof> {
    let pairs = prove_samples(srs, samples, z)?;
    let (commits, proofs) = expand_slots(&pairs, slots);
    let (folded_commitment, folded_proof) = fold(&commits, &proofs)?;

    if !verify(srs, &folded_commitment, z, &folded_proof) {
        bail!("aggregate proof failed local verification; registry commitments do not match stored content");
    }

    debug!(
        files = samples.len(),
        live = samples.iter().filter(|s| s.is_live()).count(),
        slots,
        "Aggregate proof built"
    );

    Ok(RoundProof {
        commits,
        proofs,
        folded_commitment,
        folded_proof,
    })
}
