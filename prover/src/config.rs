//! Configuration loading for the DA prover.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Prover configuration loaded from TOML + environment overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct ProverConfig {
    /// Data directory for prover state
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Sled database path for the file registry
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// HTTP listen address for the registry API
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Chain gateway endpoint (verification state and transactions)
    #[serde(default = "default_chain_gateway_url")]
    pub chain_gateway_url: String,

    /// Optional API key sent to the chain gateway
    #[serde(default)]
    pub chain_gateway_api_key: Option<String>,

    /// Whether to skip TLS certificate verification for the chain gateway
    /// Set to true only in development with self-signed certificates
    #[serde(default)]
    pub chain_gateway_insecure_tls: bool,

    /// Storage gateway endpoint serving file content by content ID
    #[serde(default = "default_storage_url")]
    pub storage_url: String,

    /// Optional API key sent to the storage gateway
    #[serde(default)]
    pub storage_api_key: Option<String>,

    /// Key required on `POST /files`; registration is disabled without one
    #[serde(default)]
    pub registry_api_key: Option<String>,

    /// Serialized structured reference string
    #[serde(default = "default_srs_path")]
    pub srs_path: PathBuf,

    /// Derive an insecure SRS from `dev_srs_seed` when `srs_path` is missing
    #[serde(default)]
    pub allow_dev_srs: bool,

    /// Number of G1 powers in the development SRS
    #[serde(default = "default_dev_srs_size")]
    pub dev_srs_size: usize,

    /// Seed of the development SRS
    #[serde(default = "default_dev_srs_seed")]
    pub dev_srs_seed: String,

    /// Seconds between challenge status polls during a dispute
    #[serde(default = "default_dispute_poll_secs")]
    pub dispute_poll_secs: u64,

    /// Seconds between attempts to read challenge settings at start-up
    #[serde(default = "default_settings_retry_secs")]
    pub settings_retry_secs: u64,

    /// Seconds to back off after a skipped or failed round
    #[serde(default = "default_round_retry_secs")]
    pub round_retry_secs: u64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data/da-prover")
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data/da-prover/files.db")
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3010))
}

fn default_chain_gateway_url() -> String {
    "http://localhost:3011".to_string()
}

fn default_storage_url() -> String {
    "http://localhost:3012".to_string()
}

fn default_srs_path() -> PathBuf {
    PathBuf::from("data/da-prover/srs.bin")
}

fn default_dev_srs_size() -> usize {
    1 << 16
}

fn default_dev_srs_seed() -> String {
    "da-prover-dev".to_string()
}

fn default_dispute_poll_secs() -> u64 {
    common::DEFAULT_DISPUTE_POLL_SECS
}

fn default_settings_retry_secs() -> u64 {
    30
}

fn default_round_retry_secs() -> u64 {
    30
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            db_path: default_db_path(),
            listen_addr: default_listen_addr(),
            chain_gateway_url: default_chain_gateway_url(),
            chain_gateway_api_key: None,
            chain_gateway_insecure_tls: false,
            storage_url: default_storage_url(),
            storage_api_key: None,
            registry_api_key: None,
            srs_path: default_srs_path(),
            allow_dev_srs: false,
            dev_srs_size: default_dev_srs_size(),
            dev_srs_seed: default_dev_srs_seed(),
            dispute_poll_secs: default_dispute_poll_secs(),
            settings_retry_secs: default_settings_retry_secs(),
            round_retry_secs: default_round_retry_secs(),
        }
    }
}

/// Load configuration from TOML file with environment variable overrides.
///
/// Without an explicit path, `da-prover.toml` in the working directory is
/// used when present.
pub fn load_config(path: Option<&str>) -> anyhow::Result<ProverConfig> {
    let config_path = path.map(std::path::Path::new).or_else(|| {
        let default = std::path::Path::new("da-prover.toml");
        default.exists().then_some(default)
    });

    let config = match config_path {
        Some(p) => parse_config(&std::fs::read_to_string(p)?)?,
        None => ProverConfig::default(),
    };

    Ok(apply_env_overrides(config))
}

/// Parse a TOML document; missing keys take their defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<ProverConfig> {
    Ok(toml::from_str(contents)?)
}

/// Read an env var and parse it, returning None if missing or parse fails.
fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|v| v == "true" || v == "1")
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn apply_env_overrides(mut config: ProverConfig) -> ProverConfig {
    if let Ok(val) = std::env::var("DA_PROVER_DATA_DIR") {
        config.data_dir = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("DA_PROVER_DB_PATH") {
        config.db_path = PathBuf::from(val);
    }
    if let Some(addr) = env_parse("DA_PROVER_LISTEN_ADDR") {
        config.listen_addr = addr;
    }
    if let Ok(val) = std::env::var("DA_PROVER_CHAIN_GATEWAY_URL") {
        config.chain_gateway_url = val;
    }
    if let Some(val) = env_non_empty("DA_PROVER_CHAIN_GATEWAY_API_KEY") {
        config.chain_gateway_api_key = Some(val);
    }
    if let Some(v) = env_flag("DA_PROVER_CHAIN_GATEWAY_INSECURE_TLS") {
        config.chain_gateway_insecure_tls = v;
    }
    if let Ok(val) = std::env::var("DA_PROVER_STORAGE_URL") {
        config.storage_url = val;
    }
    if let Some(val) = env_non_empty("DA_PROVER_STORAGE_API_KEY") {
        config.storage_api_key = Some(val);
    }
    if let Some(val) = env_non_empty("DA_PROVER_REGISTRY_API_KEY") {
        config.registry_api_key = Some(val);
    }
    if let Ok(val) = std::env::var("DA_PROVER_SRS_PATH") {
        config.srs_path = PathBuf::from(val);
    }
    if let Some(v) = env_flag("DA_PROVER_ALLOW_DEV_SRS") {
        config.allow_dev_srs = v;
    }
    if let Some(v) = env_parse("DA_PROVER_DEV_SRS_SIZE") {
        config.dev_srs_size = v;
    }
    if let Ok(val) = std::env::var("DA_PROVER_DEV_SRS_SEED") {
        config.dev_srs_seed = val;
    }
    if let Some(v) = env_parse("DA_PROVER_DISPUTE_POLL_SECS") {
        config.dispute_poll_secs = v;
    }
    if let Some(v) = env_parse("DA_PROVER_SETTINGS_RETRY_SECS") {
        config.settings_retry_secs = v;
    }
    if let Some(v) = env_parse("DA_PROVER_ROUND_RETRY_SECS") {
        config.round_retry_secs = v;
    }
    config
}
