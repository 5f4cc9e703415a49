//! NFTune CLI library.
//!
//! This crate provides the commands behind the `nftune` binary: catalogue
//! import, battle creation, the scoring actions, card reveals, the gallery
//! and the WebSocket server.

pub mod app;
pub mod commands;
pub mod logging;
