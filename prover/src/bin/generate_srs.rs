//! Generate a structured reference string for the DA prover.
//!
//! The SRS is derived from a secret τ taken from the seed, so anyone who
//! knows the seed can forge openings. Use it for development and test
//! networks only; production deployments load an SRS from a ceremony.
//!
//! # Example Usage
//!
//! ```bash
//! generate_srs --size 65536 --seed devnet --out data/da-prover/srs.bin
//! ```

use anyhow::{Context, Result, ensure};
use clap::Parser;
use da_circuits::Srs;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Write an insecure, seed-derived SRS to disk.
#[derive(Parser)]
#[command(name = "generate_srs")]
#[command(about = "Generate a development SRS for the DA prover")]
struct Args {
    /// Number of G1 powers (maximum polynomial length)
    #[arg(long, default_value_t = 1 << 16)]
    size: usize,

    /// Seed τ is derived from
    #[arg(long, default_value = "da-prover-dev")]
    seed: String,

    /// Output file
    #[arg(long, default_value = "data/da-prover/srs.bin")]
    out: PathBuf,

    /// Overwrite an existing output file
    #[arg(long)]
    force: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    ensure!(args.size > 0, "size must be positive");
    ensure!(
        args.force || !args.out.exists(),
        "{} already exists (use --force to overwrite)",
        args.out.display()
    );

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    warn!("Generated SRS is insecure - anyone with the seed can forge proofs");
    let srs = Srs::insecure_from_seed(args.size, args.seed.as_bytes())?;
    srs.save(&args.out)
        .with_context(|| format!("failed to write {}", args.out.display()))?;

    info!(
        size = srs.max_coefficients(),
        max_file_bytes = srs.max_file_bytes(),
        out = %args.out.display(),
        "SRS written"
    );
    Ok(())
}
