//! Data-availability round driver.
//!
//! One background task runs rounds back to back:
//!
//! ```text
//! schedule ─► randomness ─► sample ─► prove + fold ─► submit ─► dispute ─┐
//!    ▲                                                                   │
//!    └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failures are logged and classified into a [`RoundOutcome`]; nothing
//! escapes the loop.

pub mod aggregator;
pub mod dispute;
pub mod register;
pub mod sampler;
pub mod scheduler;
pub mod state;

use anyhow::{Context, Result, ensure};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use da_circuits::fr_from_be_bytes;

use crate::chain::{ChainProofClient, SettingInfo};
use crate::registry::FileRegistry;
use crate::storage::StorageBackend;

use self::dispute::{DisputeOutcome, DisputeTiming, respond_to_dispute};
use self::sampler::{collect_samples, sample_window};
use self::scheduler::schedule_step;
pub use self::state::{OutcomeSummary, ProverState, ProverStatus, StatusSnapshot};

/// Wall-clock source, injectable for tests.
pub trait Clock: Send + Sync {
    /// Current Unix time in seconds.
    fn now(&self) -> i64;
}

/// [`Clock`] reading the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        common::now_secs()
    }
}

/// Sleep for `duration` unless `cancel` fires first.
///
/// Returns `false` when cancelled.
pub async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}

/// Collaborators and tuning shared by every round.
#[derive(Clone)]
pub struct ProverContext {
    pub chain: Arc<dyn ChainProofClient>,
    pub registry: Arc<dyn FileRegistry>,
    pub storage: Arc<dyn StorageBackend>,
    pub clock: Arc<dyn Clock>,
    pub status: Arc<ProverStatus>,
    /// Poll interval of the dispute responder
    pub dispute_poll: Duration,
    /// Back-off after a round that did not prove
    pub round_retry: Duration,
}

/// Why a round did not submit a proof.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Randomness for the cycle is not final yet
    RndUnlocked,
    /// Randomness already proved in the previous successful round
    DuplicateRnd,
    /// Empty candidate pool, or no slots requested
    NothingToProve,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::RndUnlocked => write!(f, "randomness not locked"),
            SkipReason::DuplicateRnd => write!(f, "randomness already proved"),
            SkipReason::NothingToProve => write!(f, "nothing to prove"),
        }
    }
}

/// Result of one round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Aggregate submitted and the dispute phase closed
    Proved(DisputeOutcome),
    Skipped(SkipReason),
    Failed(String),
    /// Shutdown requested
    Cancelled,
}

impl RoundOutcome {
    fn summary(&self) -> Option<OutcomeSummary> {
        match self {
            RoundOutcome::Proved(_) => Some(OutcomeSummary::Proved),
            RoundOutcome::Skipped(reason) => Some(OutcomeSummary::Skipped(reason.to_string())),
            RoundOutcome::Failed(reason) => Some(OutcomeSummary::Failed(reason.clone())),
            RoundOutcome::Cancelled => None,
        }
    }
}

/// Read the challenge settings, retrying until they are available.
///
/// Returns `None` if shutdown is requested first.
pub async fn wait_for_settings(
    chain: &dyn ChainProofClient,
    retry: Duration,
    cancel: &CancellationToken,
) -> Option<SettingInfo> {
    loop {
        match chain.get_setting_info().await {
            Ok(settings) => {
                info!(
                    selected_file_count = settings.selected_file_count,
                    interval = settings.interval,
                    period = settings.period,
                    respond_time = settings.respond_time,
                    "Challenge settings loaded"
                );
                return Some(settings);
            }
            Err(e) => {
                error!(error = %e, retry_secs = retry.as_secs(), "Failed to read challenge settings");
                if !sleep_or_cancel(retry, cancel).await {
                    return None;
                }
            }
        }
    }
}

/// Run rounds until `cancel` fires.
pub async fn run_prover_loop(ctx: ProverContext, mut state: ProverState, cancel: CancellationToken) {
    info!(
        last = state.last,
        cycle = state.settings.cycle(),
        slots = state.settings.selected_file_count,
        srs_capacity = state.srs.max_coefficients(),
        "Prover loop started"
    );

    loop {
        let outcome = run_round(&ctx, &mut state, &cancel).await;
        if let Some(summary) = outcome.summary() {
            ctx.status.record(summary);
        }

        match outcome {
            RoundOutcome::Cancelled => break,
            RoundOutcome::Proved(dispute) => {
                info!(next_cycle = state.last, dispute = ?dispute, "Round complete");
            }
            RoundOutcome::Skipped(reason) => {
                warn!(%reason, "Round skipped");
                if !sleep_or_cancel(ctx.round_retry, &cancel).await {
                    break;
                }
            }
            RoundOutcome::Failed(reason) => {
                error!(%reason, "Round failed, retrying next wake");
                if !sleep_or_cancel(ctx.round_retry, &cancel).await {
                    break;
                }
            }
        }
    }

    info!("Prover loop stopped");
}

/// Wait for the proving window of the current cycle and run one round.
pub async fn run_round(
    ctx: &ProverContext,
    state: &mut ProverState,
    cancel: &CancellationToken,
) -> RoundOutcome {
    let step = schedule_step(
        ctx.clock.now(),
        state.last,
        state.settings.interval,
        state.settings.period,
    );

    if step.wait_secs > 0 {
        debug!(wait_secs = step.wait_secs, cycle_start = step.last, "Waiting for proving window");
        if !sleep_or_cancel(Duration::from_secs(step.wait_secs as u64), cancel).await {
            return RoundOutcome::Cancelled;
        }
    }

    state.last = step.last;
    ctx.status.set_cycle_start(step.last);
    info!(cycle_start = step.last, next = step.next, "Challenge cycle boundary");

    match prove_cycle(ctx, state, cancel).await {
        Ok(Cycle::Proved { rnd, dispute }) => {
            if dispute == DisputeOutcome::Cancelled {
                return RoundOutcome::Cancelled;
            }
            state.record_success(rnd, step.next);
            RoundOutcome::Proved(dispute)
        }
        Ok(Cycle::Skipped(reason)) => RoundOutcome::Skipped(reason),
        Err(e) => {
            state.record_failure();
            RoundOutcome::Failed(format!("{:#}", e))
        }
    }
}

enum Cycle {
    Proved { rnd: Vec<u8>, dispute: DisputeOutcome },
    Skipped(SkipReason),
}

async fn prove_cycle(
    ctx: &ProverContext,
    state: &ProverState,
    cancel: &CancellationToken,
) -> Result<Cycle> {
    let chain = ctx.chain.as_ref();

    chain.generate_rnd().await.context("failed to request randomness")?;
    let verify_info = chain.get_verify_info().await.context("failed to read verify info")?;
    if !verify_info.rnd_locked {
        return Ok(Cycle::Skipped(SkipReason::RndUnlocked));
    }
    debug!(rnd = %hex::encode(&verify_info.rnd), "Randomness locked");

    let rnd = chain.get_rnd_raw_bytes().await.context("failed to read randomness")?;
    if state.is_duplicate_rnd(&rnd) {
        return Ok(Cycle::Skipped(SkipReason::DuplicateRnd));
    }

    // Window over the verifier's pool size, not the local registry count.
    let challenge = chain.get_challenge_info().await.context("failed to read challenge status")?;
    let slots = state.settings.selected_file_count;
    let Some(window) = sample_window(&rnd, challenge.length, slots) else {
        return Ok(Cycle::Skipped(SkipReason::NothingToProve));
    };

    let file_count = ctx.registry.get_file_count().context("failed to read file count")?;
    ensure!(
        file_count >= window.end_id,
        "registry holds {} files but the chain pool has {}",
        file_count,
        challenge.length
    );

    // A dispute left open by an earlier round blocks the new submission.
    if challenge.status != 0 {
        warn!(status = challenge.status, "Closing dispute left from a previous round");
        chain.end_challenge().await.context("failed to end stale challenge")?;
    }

    info!(
        pool = challenge.length,
        file_count,
        start_id = window.start_id,
        end_id = window.end_id,
        slots,
        "Sampling files"
    );

    let samples = collect_samples(ctx.registry.as_ref(), ctx.storage.as_ref(), window, state.last)
        .await?;

    let z = fr_from_be_bytes(&rnd);
    let srs = state.srs.clone();
    let round = tokio::task::spawn_blocking(move || aggregator::aggregate(&srs, &samples, slots, z))
        .await
        .context("proof task panicked")?
        .context("failed to build aggregate proof")?;

    chain
        .submit_aggregation_proof(&rnd, &round.folded_commitment, &round.folded_proof)
        .await
        .context("failed to submit aggregate proof")?;
    info!(
        slots,
        commitment = %round.folded_commitment.to_hex(),
        "Aggregate proof submitted"
    );

    let timing = DisputeTiming {
        last: state.last,
        respond_time: state.settings.respond_time,
        poll: ctx.dispute_poll,
    };
    let dispute = respond_to_dispute(chain, ctx.clock.as_ref(), &round.commits, timing, cancel).await?;

    Ok(Cycle::Proved { rnd, dispute })
}
