//! CLI command implementations

pub mod action;
pub mod battle;
pub mod catalog;
pub mod daily;
pub mod gallery;
pub mod json_output;
pub mod reveal;

#[cfg(feature = "serve")]
pub mod serve;

mod reporting;
