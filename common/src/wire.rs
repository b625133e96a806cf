//! JSON bodies exchanged with the chain gateway.
//!
//! G1 points are 48-byte compressed hex, scalars and randomness are
//! big-endian hex. Parsing into curve types happens in the prover so this
//! crate stays free of arithmetic dependencies.

use serde::{Deserialize, Serialize};

/// GET /settings - challenge parameters fixed for the lifetime of the prover.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SettingInfoResponse {
    /// Slots per aggregate proof
    pub selected_file_count: u64,
    /// Seconds at the start of each cycle during which proofs are accepted
    pub interval: i64,
    /// Seconds of the remaining cycle reserved for disputes
    pub period: i64,
    /// Seconds granted per dispute step
    pub respond_time: i64,
}

/// GET /verify - current verification state.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct VerifyInfoResponse {
    /// Evaluation point of the current cycle, big-endian hex
    #[serde(default)]
    pub rnd: String,
    /// Start of the cycle the verifier last challenged (Unix seconds)
    pub last_challenge_time: i64,
    /// Whether the randomness for the current cycle is fixed
    pub rnd_locked: bool,
}

/// GET /rnd - current challenge randomness.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RndResponse {
    /// Big-endian randomness bytes (hex)
    pub rnd: String,
}

/// GET /challenge - dispute status.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChallengeInfoResponse {
    /// 0 idle, odd = answer expected, even = challenger's turn, 11 = reveal
    pub status: u8,
    /// Slice selected by the challenger in the previous step
    pub index: u64,
    /// Number of registered files the verifier samples from (`ChalLength`)
    pub length: u64,
}

/// POST /proofs/aggregate
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SubmitAggregateRequest {
    pub rnd: String,
    pub commitment: String,
    pub witness: String,
    pub value: String,
}

/// POST /challenge/response and POST /challenge/one-step
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CommitmentListRequest {
    pub commitments: Vec<String>,
}

/// Response to every state-changing gateway call.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TxResponse {
    #[serde(default)]
    pub tx_hash: String,
}
