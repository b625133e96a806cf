//! Chain proof client: challenge state reads and proof transactions.
//!
//! The prover talks to the verifier contract through a chain gateway that
//! exposes the contract calls as JSON endpoints. [`ChainProofClient`] is the
//! seam the round driver depends on; [`HttpChainClient`] is the gateway
//! implementation.

use anyhow::{Context, Result, bail, ensure};
use async_trait::async_trait;
use common::auth::{API_KEY_HEADER, ApiKey};
use common::{
    ChallengeInfoResponse, CommitmentListRequest, RndResponse, SettingInfoResponse,
    SubmitAggregateRequest, TxResponse, VerifyInfoResponse,
};
use da_circuits::{Commitment, OpeningProof};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Challenge parameters, read once at start-up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingInfo {
    /// Slots per aggregate proof
    pub selected_file_count: usize,
    /// Seconds at the start of each cycle before proving starts
    pub interval: i64,
    /// Seconds of the cycle after the interval
    pub period: i64,
    /// Seconds granted per dispute step
    pub respond_time: i64,
}

impl SettingInfo {
    /// Length of one challenge cycle.
    pub fn cycle(&self) -> i64 {
        self.interval + self.period
    }

    fn from_wire(wire: SettingInfoResponse) -> Result<Self> {
        ensure!(wire.interval > 0, "interval must be positive, got {}", wire.interval);
        ensure!(wire.period >= 0, "period must not be negative, got {}", wire.period);
        ensure!(
            wire.respond_time > 0,
            "respond_time must be positive, got {}",
            wire.respond_time
        );
        Ok(Self {
            selected_file_count: usize::try_from(wire.selected_file_count)
                .context("selected_file_count does not fit in usize")?,
            interval: wire.interval,
            period: wire.period,
            respond_time: wire.respond_time,
        })
    }
}

/// Verification state of the current cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifyInfo {
    /// Evaluation point as reported by the verifier, big-endian (may be empty)
    pub rnd: Vec<u8>,
    /// Start of the last challenged cycle (0 if none yet)
    pub last_challenge_time: i64,
    /// Randomness for the current cycle is final
    pub rnd_locked: bool,
}

/// Dispute status as reported by the verifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChallengeInfo {
    /// 0 idle, odd = prover's turn, even = challenger's turn, 11 = reveal
    pub status: u8,
    /// Slice chosen by the challenger in the previous step
    pub index: usize,
    /// Size of the candidate pool the sample window is drawn from
    pub length: u64,
}

/// Contract calls the round driver depends on.
#[async_trait]
pub trait ChainProofClient: Send + Sync {
    async fn get_setting_info(&self) -> Result<SettingInfo>;

    /// Ask the verifier to draw randomness for the current cycle.
    async fn generate_rnd(&self) -> Result<()>;

    async fn get_verify_info(&self) -> Result<VerifyInfo>;

    /// Current randomness, big-endian.
    async fn get_rnd_raw_bytes(&self) -> Result<Vec<u8>>;

    async fn get_challenge_info(&self) -> Result<ChallengeInfo>;

    async fn submit_aggregation_proof(
        &self,
        rnd: &[u8],
        commitment: &Commitment,
        proof: &OpeningProof,
    ) -> Result<()>;

    /// Answer a bisection step with exactly ten folded commitments.
    async fn response_challenge(&self, commitments: &[Commitment]) -> Result<()>;

    /// Reveal the commitments of the final disputed slice.
    async fn one_step_prove(&self, commitments: &[Commitment]) -> Result<()>;

    async fn end_challenge(&self) -> Result<()>;
}

/// [`ChainProofClient`] backed by the chain gateway's JSON API.
#[derive(Clone)]
pub struct HttpChainClient {
    base_url: String,
    api_key: Option<ApiKey>,
    client: reqwest::Client,
}

impl HttpChainClient {
    /// Create a new gateway client.
    ///
    /// # Arguments
    /// * `base_url` - Chain gateway endpoint URL
    /// * `api_key` - Optional key sent in the X-API-Key header
    /// * `insecure_tls` - If true, skip TLS certificate verification (dev only)
    pub fn new(base_url: &str, api_key: Option<ApiKey>, insecure_tls: bool) -> Result<Self> {
        let mut builder = reqwest::Client::builder();

        if insecure_tls {
            warn!(
                "TLS certificate verification disabled for chain gateway. \
                 This is insecure and should only be used in development."
            );
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: builder.build().context("failed to build chain gateway client")?,
        })
    }

    fn with_key(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key.header_value()),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .with_key(self.client.get(&url))
            .send()
            .await
            .with_context(|| format!("GET {} failed", path))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("GET {} returned {}: {}", path, status, body);
        }
        response
            .json::<T>()
            .await
            .with_context(|| format!("GET {} returned a malformed body", path))
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<TxResponse> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .with_key(self.client.post(&url))
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {} failed", path))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("POST {} returned {}: {}", path, status, body);
        }
        let tx = response.json::<TxResponse>().await.unwrap_or_default();
        debug!(path, tx_hash = %tx.tx_hash, "Chain transaction accepted");
        Ok(tx)
    }
}

fn commitments_to_hex(commitments: &[Commitment]) -> CommitmentListRequest {
    CommitmentListRequest {
        commitments: commitments.iter().map(Commitment::to_hex).collect(),
    }
}

#[async_trait]
impl ChainProofClient for HttpChainClient {
    async fn get_setting_info(&self) -> Result<SettingInfo> {
        SettingInfo::from_wire(self.get_json("/settings").await?)
    }

    async fn generate_rnd(&self) -> Result<()> {
        self.post_json("/rnd/generate", &serde_json::json!({})).await?;
        Ok(())
    }

    async fn get_verify_info(&self) -> Result<VerifyInfo> {
        let wire: VerifyInfoResponse = self.get_json("/verify").await?;
        Ok(VerifyInfo {
            rnd: hex::decode(wire.rnd.trim_start_matches("0x"))
                .context("verify info randomness is not valid hex")?,
            last_challenge_time: wire.last_challenge_time,
            rnd_locked: wire.rnd_locked,
        })
    }

    async fn get_rnd_raw_bytes(&self) -> Result<Vec<u8>> {
        let wire: RndResponse = self.get_json("/rnd").await?;
        hex::decode(wire.rnd.trim_start_matches("0x")).context("randomness is not valid hex")
    }

    async fn get_challenge_info(&self) -> Result<ChallengeInfo> {
        let wire: ChallengeInfoResponse = self.get_json("/challenge").await?;
        Ok(ChallengeInfo {
            status: wire.status,
            index: usize::try_from(wire.index).context("challenge index does not fit in usize")?,
            length: wire.length,
        })
    }

    async fn submit_aggregation_proof(
        &self,
        rnd: &[u8],
        commitment: &Commitment,
        proof: &OpeningProof,
    ) -> Result<()> {
        let body = SubmitAggregateRequest {
            rnd: hex::encode(rnd),
            commitment: commitment.to_hex(),
            witness: proof.witness_hex(),
            value: proof.value_hex(),
        };
        self.post_json("/proofs/aggregate", &body).await?;
        Ok(())
    }

    async fn response_challenge(&self, commitments: &[Commitment]) -> Result<()> {
        self.post_json("/challenge/response", &commitments_to_hex(commitments))
            .await?;
        Ok(())
    }

    async fn one_step_prove(&self, commitments: &[Commitment]) -> Result<()> {
        self.post_json("/challenge/one-step", &commitments_to_hex(commitments))
            .await?;
        Ok(())
    }

    async fn end_challenge(&self) -> Result<()> {
        self.post_json("/challenge/end", &serde_json::json!({})).await?;
        Ok(())
    }
}
