//! DA prover library.
//!
//! Keeps a registry of committed files and proves to the on-chain verifier,
//! once per challenge cycle, that a randomly sampled subset of them is still
//! retrievable. Disputed proofs are defended by bisection.
//!
//! - `registry`: sled-backed file records
//! - `chain`: verifier reads and proof transactions
//! - `storage`: file content by content ID
//! - `da`: scheduler, sampler, aggregator, dispute responder and round loop
//! - `api`: registry HTTP API

pub mod api;
pub mod chain;
pub mod config;
pub mod da;
pub mod registry;
pub mod storage;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
