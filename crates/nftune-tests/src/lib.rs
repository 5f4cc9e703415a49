//! NFTune End-to-End Test Infrastructure
//!
//! This crate provides integration tests for the battle flows:
//!
//! - Battles: catalogue import, creation, reveals, actions and submission
//! - CLI: the `nftune` commands against a JSON-file store
//! - **Determinism**: same seed, same queue and reveal sequence
//! - Server: a live WebSocket round trip
//! - Contention: two services racing on one store directory
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p nftune-tests
//! ```

pub mod determinism;
pub mod fixtures;
