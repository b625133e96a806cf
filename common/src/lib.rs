//! Common types and helpers shared by the DA prover crates.
//!
//! - **Wire types**: JSON bodies exchanged with the chain gateway and the
//!   storage gateway (points and scalars travel as hex strings)
//! - **Auth**: X-API-Key credentials for the gateway clients and the
//!   registry's write route
//! - **Time**: panic-free Unix timestamps

pub mod auth;
pub mod wire;

pub use wire::{
    ChallengeInfoResponse, CommitmentListRequest, RndResponse, SettingInfoResponse,
    SubmitAggregateRequest, TxResponse, VerifyInfoResponse,
};

/// Default poll interval of the dispute responder in seconds.
pub const DEFAULT_DISPUTE_POLL_SECS: u64 = 5;

/// Safe timestamp helper - returns current Unix timestamp in seconds.
/// Returns 0 on clock skew or system time errors.
#[inline]
pub fn now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
