//! Bisection dispute responder.
//!
//! After an aggregate is submitted, a challenger may dispute it. Each odd
//! status asks the prover to split the disputed list into ten slices and
//! publish their folded commitments; the challenger answers (even status)
//! with the index of the slice it disputes. After five rounds status 11
//! asks for the raw commitments of the final slice.
//!
//! ```text
//! status:  0 ─► 1 ─► 2 ─► 3 ─► ... ─► 9 ─► 10 ─► 11
//!          idle  ▲ prover   ▲ challenger        reveal
//! ```
//!
//! Every step has a deadline of `respond_time * (status + 1)` seconds after
//! the cycle start; once it passes the dispute is closed with
//! `end_challenge`.

use anyhow::{Context, Result, bail};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use da_circuits::{Commitment, fold_partition, partition, select_slice};

use super::{Clock, sleep_or_cancel};
use crate::chain::ChainProofClient;

/// Status value of the terminal reveal step.
pub const REVEAL_STATUS: u8 = 11;

/// Dispute step decoded from the verifier's status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisputePhase {
    /// No dispute open
    Idle,
    /// Prover must answer bisection round `round` (1..=5)
    Respond { round: u8 },
    /// Challenger must pick a slice of round `round`
    Await { round: u8 },
    /// Prover must reveal the final slice
    Reveal,
}

impl DisputePhase {
    pub fn from_status(status: u8) -> Result<Self> {
        match status {
            0 => Ok(Self::Idle),
            REVEAL_STATUS => Ok(Self::Reveal),
            s if s < REVEAL_STATUS && s % 2 == 1 => Ok(Self::Respond { round: s.div_ceil(2) }),
            s if s < REVEAL_STATUS => Ok(Self::Await { round: s / 2 }),
            s => bail!("unknown challenge status {}", s),
        }
    }
}

/// How the dispute phase of a round ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisputeOutcome {
    /// Nobody disputed the aggregate before the deadline
    Undisputed,
    /// The final slice was revealed
    Revealed,
    /// A step timed out and the dispute was closed
    Ended,
    /// Shutdown requested
    Cancelled,
}

/// Timing parameters of the dispute phase.
#[derive(Clone, Copy, Debug)]
pub struct DisputeTiming {
    /// Cycle start the deadlines are anchored on
    pub last: i64,
    pub respond_time: i64,
    pub poll: Duration,
}

impl DisputeTiming {
    pub fn deadline(&self, status: u8) -> i64 {
        self.last + self.respond_time * (status as i64 + 1)
    }
}

/// Defend the aggregate over `commits` until the dispute resolves, times
/// out or shutdown is requested.
pub async fn respond_to_dispute(
    chain: &dyn ChainProofClient,
    clock: &dyn Clock,
    commits: &[Commitment],
    timing: DisputeTiming,
    cancel: &CancellationToken,
) -> Result<DisputeOutcome> {
    // Slices published in the last answered round
    let mut history: Option<Vec<Vec<Commitment>>> = None;
    let mut answered: Option<u8> = None;

    loop {
        if cancel.is_cancelled() {
            return Ok(DisputeOutcome::Cancelled);
        }

        let info = chain
            .get_challenge_info()
            .await
            .context("failed to read challenge status")?;
        let phase = DisputePhase::from_status(info.status)?;

        let now = clock.now();
        if now > timing.deadline(info.status) {
            if info.status == 0 {
                debug!("No dispute opened before the deadline");
                return Ok(DisputeOutcome::Undisputed);
            }
            warn!(status = info.status, now, "Dispute step timed out, ending challenge");
            chain
                .end_challenge()
                .await
                .context("failed to end timed-out challenge")?;
            return Ok(DisputeOutcome::Ended);
        }

        if phase == DisputePhase::Reveal {
            let slices = history
                .as_deref()
                .context("reveal requested before any bisection round was answered")?;
            let slice = select_slice(slices, info.index)?;
            chain
                .one_step_prove(slice)
                .await
                .context("one-step proof failed")?;
            info!(index = info.index, revealed = slice.len(), "Final slice revealed");
            return Ok(DisputeOutcome::Revealed);
        }

        if let DisputePhase::Respond { round } = phase {
            if answered != Some(info.status) {
                let current: &[Commitment] = if round == 1 {
                    commits
                } else {
                    let slices = history
                        .as_deref()
                        .context("bisection round has no previous partition")?;
                    select_slice(slices, info.index)?
                };

                let slices = partition(current);
                let folded = fold_partition(&slices);
                chain
                    .response_challenge(&folded)
                    .await
                    .with_context(|| format!("failed to answer bisection round {}", round))?;

                info!(
                    round,
                    status = info.status,
                    index = info.index,
                    disputed = current.len(),
                    slice_size = slices[0].len(),
                    "Bisection round answered"
                );
                history = Some(slices);
                answered = Some(info.status);
            }
        }

        if !sleep_or_cancel(timing.poll, cancel).await {
            return Ok(DisputeOutcome::Cancelled);
        }
    }
}
