//! Commitment and opening-proof types with their wire encodings.

use ark_ec::AffineRepr;
use ark_ff::{BigInteger, PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::config::{F, G1, G1_COMPRESSED_BYTES, SCALAR_BYTES};
use crate::DaError;

/// KZG commitment to an encoded file polynomial (a G1 point).
#[derive(Debug, Clone, Copy, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Commitment(pub G1);

impl Commitment {
    /// The identity element, used as the placeholder for expired files.
    pub fn zero() -> Self {
        Commitment(G1::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Compressed 48-byte encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(G1_COMPRESSED_BYTES);
        // Writing into a Vec cannot fail.
        let _ = self.0.serialize_compressed(&mut bytes);
        bytes
    }

    /// Decode a compressed point, accepting only its canonical encoding.
    ///
    /// The infinity flag alone decodes to the identity whatever the other
    /// bits hold, so the re-encoding must match the input byte for byte.
    pub fn from_bytes(bytes: &[u8]) -> crate::Result<Self> {
        let commitment = G1::deserialize_compressed(bytes)
            .map(Commitment)
            .map_err(|e| DaError::InvalidPoint(e.to_string()))?;
        if commitment.to_bytes() != bytes {
            return Err(DaError::InvalidPoint("non-canonical encoding".to_string()));
        }
        Ok(commitment)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn from_hex(s: &str) -> crate::Result<Self> {
        Self::from_bytes(&hex::decode(s.trim_start_matches("0x"))?)
    }
}

/// KZG opening of a committed polynomial at a single point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct OpeningProof {
    /// Commitment to the witness polynomial W(X) = (f(X) - f(z)) / (X - z)
    pub witness: G1,
    /// Claimed value f(z)
    pub value: F,
}

impl OpeningProof {
    /// Zero witness and zero value, paired with [`Commitment::zero`].
    pub fn zero() -> Self {
        OpeningProof {
            witness: G1::zero(),
            value: F::zero(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.witness.is_zero() && self.value.is_zero()
    }

    pub fn witness_hex(&self) -> String {
        Commitment(self.witness).to_hex()
    }

    pub fn value_hex(&self) -> String {
        fr_to_hex(&self.value)
    }

    pub fn from_hex(witness: &str, value: &str) -> crate::Result<Self> {
        Ok(OpeningProof {
            witness: Commitment::from_hex(witness)?.0,
            value: fr_from_hex(value)?,
        })
    }
}

/// Interpret arbitrary bytes (big-endian) as a scalar, reducing modulo r.
pub fn fr_from_be_bytes(bytes: &[u8]) -> F {
    F::from_be_bytes_mod_order(bytes)
}

/// Canonical 32-byte big-endian hex encoding of a scalar.
pub fn fr_to_hex(value: &F) -> String {
    hex::encode(value.into_bigint().to_bytes_be())
}

/// Decode a canonical scalar; rejects values that would need reduction.
pub fn fr_from_hex(s: &str) -> crate::Result<F> {
    let bytes = hex::decode(s.trim_start_matches("0x"))?;
    if bytes.len() != SCALAR_BYTES {
        return Err(DaError::InvalidScalar(format!(
            "expected {} bytes, got {}",
            SCALAR_BYTES,
            bytes.len()
        )));
    }
    let value = F::from_be_bytes_mod_order(&bytes);
    if value.into_bigint().to_bytes_be() != bytes {
        return Err(DaError::InvalidScalar("value is not reduced".to_string()));
    }
    Ok(value)
}
