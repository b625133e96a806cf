//! In-memory doubles of the prover's collaborators.
//!
//! Available under `cfg(test)` and the `test-utils` feature.

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use da_circuits::{Commitment, OpeningProof};

use crate::chain::{ChainProofClient, ChallengeInfo, SettingInfo, VerifyInfo};
use crate::da::Clock;
use crate::registry::{FileRecord, FileRegistry, NewFileRecord};
use crate::storage::StorageBackend;

#[derive(Default)]
struct ChainState {
    settings: Option<SettingInfo>,
    settings_failures: usize,
    settings_reads: usize,
    verify: Option<VerifyInfo>,
    rnd: Vec<u8>,
    challenges: VecDeque<ChallengeInfo>,
    challenge_reads: usize,
    generate_calls: usize,
    fail_submit: bool,
    submissions: Vec<(Vec<u8>, Commitment, OpeningProof)>,
    responses: Vec<Vec<Commitment>>,
    one_step_proofs: Vec<Vec<Commitment>>,
    end_calls: usize,
}

/// Scriptable [`ChainProofClient`] that records every transaction.
#[derive(Default)]
pub struct MockChain {
    state: Mutex<ChainState>,
}

impl MockChain {
    pub fn set_settings(&self, settings: SettingInfo) {
        self.state.lock().settings = Some(settings);
    }

    /// Fail the next `n` settings reads.
    pub fn fail_settings_reads(&self, n: usize) {
        self.state.lock().settings_failures = n;
    }

    pub fn set_verify_info(&self, info: VerifyInfo) {
        self.state.lock().verify = Some(info);
    }

    pub fn set_rnd(&self, rnd: Vec<u8>) {
        self.state.lock().rnd = rnd;
    }

    /// Statuses returned by successive challenge reads; the last one repeats.
    pub fn script_challenges(&self, script: Vec<ChallengeInfo>) {
        self.state.lock().challenges = script.into();
    }

    pub fn fail_submissions(&self, fail: bool) {
        self.state.lock().fail_submit = fail;
    }

    pub fn settings_reads(&self) -> usize {
        self.state.lock().settings_reads
    }

    pub fn generate_calls(&self) -> usize {
        self.state.lock().generate_calls
    }

    pub fn challenge_reads(&self) -> usize {
        self.state.lock().challenge_reads
    }

    pub fn submissions(&self) -> Vec<(Vec<u8>, Commitment, OpeningProof)> {
        self.state.lock().submissions.clone()
    }

    pub fn responses(&self) -> Vec<Vec<Commitment>> {
        self.state.lock().responses.clone()
    }

    pub fn one_step_proofs(&self) -> Vec<Vec<Commitment>> {
        self.state.lock().one_step_proofs.clone()
    }

    pub fn end_calls(&self) -> usize {
        self.state.lock().end_calls
    }
}

#[async_trait]
impl ChainProofClient for MockChain {
    async fn get_setting_info(&self) -> Result<SettingInfo> {
        let mut state = self.state.lock();
        state.settings_reads += 1;
        if state.settings_failures > 0 {
            state.settings_failures -= 1;
            bail!("settings unavailable");
        }
        state.settings.clone().ok_or_else(|| anyhow!("settings not set"))
    }

    async fn generate_rnd(&self) -> Result<()> {
        self.state.lock().generate_calls += 1;
        Ok(())
    }

    async fn get_verify_info(&self) -> Result<VerifyInfo> {
        self.state
            .lock()
            .verify
            .clone()
            .ok_or_else(|| anyhow!("verify info not set"))
    }

    async fn get_rnd_raw_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.state.lock().rnd.clone())
    }

    async fn get_challenge_info(&self) -> Result<ChallengeInfo> {
        let mut state = self.state.lock();
        state.challenge_reads += 1;
        let info = if state.challenges.len() > 1 {
            state.challenges.pop_front()
        } else {
            state.challenges.front().copied()
        };
        Ok(info.unwrap_or(ChallengeInfo {
            status: 0,
            index: 0,
            length: 0,
        }))
    }

    async fn submit_aggregation_proof(
        &self,
        rnd: &[u8],
        commitment: &Commitment,
        proof: &OpeningProof,
    ) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_submit {
            bail!("transaction reverted");
        }
        state.submissions.push((rnd.to_vec(), *commitment, *proof));
        Ok(())
    }

    async fn response_challenge(&self, commitments: &[Commitment]) -> Result<()> {
        self.state.lock().responses.push(commitments.to_vec());
        Ok(())
    }

    async fn one_step_prove(&self, commitments: &[Commitment]) -> Result<()> {
        self.state.lock().one_step_proofs.push(commitments.to_vec());
        Ok(())
    }

    async fn end_challenge(&self) -> Result<()> {
        self.state.lock().end_calls += 1;
        Ok(())
    }
}

/// [`Clock`] that is fixed or advances by `step` on every reading.
pub struct MockClock {
    now: AtomicI64,
    step: i64,
}

impl MockClock {
    pub fn fixed(now: i64) -> Self {
        Self::stepping(now, 0)
    }

    pub fn stepping(start: i64, step: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
            step,
        }
    }
}

impl Clock for MockClock {
    fn now(&self) -> i64 {
        self.now.fetch_add(self.step, Ordering::SeqCst)
    }
}

/// [`FileRegistry`] over a vector; record `id` lives at index `id - 1`.
#[derive(Default)]
pub struct MemoryFileRegistry {
    records: RwLock<Vec<FileRecord>>,
}

impl FileRegistry for MemoryFileRegistry {
    fn create_file_record(&self, record: NewFileRecord) -> Result<u64> {
        let mut records = self.records.write();
        let id = records.len() as u64 + 1;
        records.push(record.into_record(id));
        Ok(id)
    }

    fn get_range_file_info(&self, start: u64, end: u64) -> Result<Vec<FileRecord>> {
        let records = self.records.read();
        let end = end.min(records.len() as u64);
        if start == 0 || start > end {
            return Ok(Vec::new());
        }
        Ok(records[(start - 1) as usize..end as usize].to_vec())
    }

    fn get_file_count(&self) -> Result<u64> {
        Ok(self.records.read().len() as u64)
    }
}

/// [`StorageBackend`] over a map, counting fetches.
#[derive(Default)]
pub struct MemoryStorage {
    objects: RwLock<HashMap<String, Vec<u8>>>,
    fetches: AtomicUsize,
}

impl MemoryStorage {
    pub fn insert(&self, content_id: &str, content: Vec<u8>) {
        self.objects.write().insert(content_id.to_string(), content);
    }

    pub fn remove(&self, content_id: &str) {
        self.objects.write().remove(content_id);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn get_object(&self, content_id: &str) -> Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.objects
            .read()
            .get(content_id)
            .cloned()
            .ok_or_else(|| anyhow!("object {} not found", content_id))
    }
}
