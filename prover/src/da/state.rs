//! Prover state owned by the round loop, plus a shared status snapshot.

use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use da_circuits::Srs;

use crate::chain::SettingInfo;

/// State of the prover loop. Owned exclusively by the loop task.
pub struct ProverState {
    /// Challenge parameters read at start-up
    pub settings: SettingInfo,
    /// Proving key
    pub srs: Arc<Srs>,
    /// Start of the most recently completed (or in-progress) cycle
    pub last: i64,
    /// Randomness of the last successful round
    pub last_rnd: Option<Vec<u8>>,
    /// Whether the previous round succeeded
    pub prove_success: bool,
}

impl ProverState {
    /// Anchor the loop on the verifier's last challenge time, or `now` if
    /// the verifier has never challenged.
    pub fn new(settings: SettingInfo, srs: Arc<Srs>, last_challenge_time: i64, now: i64) -> Self {
        let last = if last_challenge_time > 0 {
            last_challenge_time
        } else {
            now
        };
        Self {
            settings,
            srs,
            last,
            last_rnd: None,
            prove_success: false,
        }
    }

    /// True when `rnd` was already proved in the previous, successful round.
    pub fn is_duplicate_rnd(&self, rnd: &[u8]) -> bool {
        self.prove_success && self.last_rnd.as_deref() == Some(rnd)
    }

    /// Record a successful round and move `last` to the next cycle boundary.
    pub fn record_success(&mut self, rnd: Vec<u8>, next: i64) {
        self.prove_success = true;
        self.last_rnd = Some(rnd);
        self.last = next;
    }

    pub fn record_failure(&mut self) {
        self.prove_success = false;
    }
}

/// Last round outcome as exposed on `/health`.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum OutcomeSummary {
    Proved,
    Skipped(String),
    Failed(String),
}

/// Counters and last outcome shared between the loop and the API.
#[derive(Default)]
pub struct ProverStatus {
    last_cycle_start: AtomicI64,
    rounds_proved: AtomicU64,
    rounds_skipped: AtomicU64,
    rounds_failed: AtomicU64,
    last_outcome: RwLock<Option<OutcomeSummary>>,
}

/// Point-in-time copy of [`ProverStatus`].
#[derive(Clone, Debug, Serialize)]
pub struct StatusSnapshot {
    pub last_cycle_start: i64,
    pub rounds_proved: u64,
    pub rounds_skipped: u64,
    pub rounds_failed: u64,
    pub last_outcome: Option<OutcomeSummary>,
}

impl ProverStatus {
    pub fn set_cycle_start(&self, last: i64) {
        self.last_cycle_start.store(last, Ordering::Relaxed);
    }

    pub fn record(&self, outcome: OutcomeSummary) {
        let counter = match outcome {
            OutcomeSummary::Proved => &self.rounds_proved,
            OutcomeSummary::Skipped(_) => &self.rounds_skipped,
            OutcomeSummary::Failed(_) => &self.rounds_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        *self.last_outcome.write() = Some(outcome);
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            last_cycle_start: self.last_cycle_start.load(Ordering::Relaxed),
            rounds_proved: self.rounds_proved.load(Ordering::Relaxed),
            rounds_skipped: self.rounds_skipped.load(Ordering::Relaxed),
            rounds_failed: self.rounds_failed.load(Ordering::Relaxed),
            last_outcome: self.last_outcome.read().clone(),
        }
    }
}
