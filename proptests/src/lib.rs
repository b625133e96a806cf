//! Property-based tests for the DA prover.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all property tests
//! cargo test -p proptests
//!
//! # Run with more test cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p proptests
//!
//! # Run specific test module
//! cargo test -p proptests bisection
//! ```
//!
//! ## Test Categories
//!
//! - **Encoder tests**: block density, top-bit clearing, decode inverse
//! - **Fold tests**: homomorphism with polynomial addition, zero placeholders
//! - **Sampler tests**: round determinism over a registry snapshot, window bounds, cyclic slot expansion
//! - **Scheduler tests**: boundary alignment whenever the loop wakes up
//! - **Bisection tests**: five rounds narrow any list to its final slice

/// Shared test strategies and helpers.
pub mod strategies;

#[cfg(test)]
mod bisection;
#[cfg(test)]
mod encoder;
#[cfg(test)]
mod fold;
#[cfg(test)]
mod sampler;
#[cfg(test)]
mod scheduler;
