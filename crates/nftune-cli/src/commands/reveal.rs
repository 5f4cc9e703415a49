//! Reveal command: flip cards on a stored battle.
//!
//! Reveal progress is session-local and never persisted, so each invocation
//! starts from `--from` consumed seed digits (default 0). The flip animation
//! is simulated: every flip waits out the configured delay on a virtual clock.

use anyhow::Result;
use colored::Colorize;
use nftune_battle::{
    BattleResult, FlipOutcome, RejectReason, RevealContext, RevealResult, RevealSnapshot,
    RevealState,
};
use serde::{Deserialize, Serialize};
use std::process::ExitCode;
use std::time::Instant;

use super::reporting::finish;
use crate::app::{AppOptions, CliService};

/// Result of a reveal session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealReport {
    /// Battle flipped.
    pub battle_id: String,
    /// Flips that consumed a seed digit, in order.
    pub flips: Vec<RevealResult>,
    /// Why the session stopped early, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopped: Option<RejectReason>,
    /// Reveal state after the last flip.
    pub state: RevealSnapshot,
}

/// Flips up to `flips` cards on a battle.
///
/// # Arguments
/// * `app` - Global options
/// * `battle_id` - Battle to flip
/// * `from` - Seed digits already consumed in earlier sessions
/// * `flips` - Number of flips to attempt
/// * `json` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 if the battle was found and active, 1 otherwise
pub fn run(
    app: &AppOptions,
    battle_id: &str,
    from: usize,
    flips: usize,
    json: bool,
) -> Result<ExitCode> {
    let service = app.open_service()?;
    let result = reveal(&service, battle_id, from, flips);
    finish(result, json, print_report)
}

/// Runs a reveal session against the stored battle.
pub fn reveal(
    service: &CliService,
    battle_id: &str,
    from: usize,
    flips: usize,
) -> BattleResult<RevealReport> {
    let battle = service.battle(battle_id)?;
    battle.ensure_active()?;
    let ctx = RevealContext::from_battle(&battle);
    let mut state = RevealState::rebuild(&battle.random_seed, &battle.queue_songs, from)
        .delayed_by(service.config().flip_delay());

    let mut now = Instant::now();
    let mut results = Vec::with_capacity(flips);
    let mut stopped = None;
    for _ in 0..flips {
        match state.flip(&ctx, now) {
            FlipOutcome::Flipped(result) => results.push(result),
            FlipOutcome::Rejected(reason) => {
                stopped = Some(reason);
                break;
            }
            FlipOutcome::FlippedBack => {}
        }
        now += state.flip_delay();
        state.flip_back(now);
    }

    Ok(RevealReport {
        battle_id: battle.id.clone(),
        flips: results,
        stopped,
        state: state.snapshot(&ctx, now),
    })
}

fn print_report(report: &RevealReport) {
    println!("{} {}", "Revealing:".cyan().bold(), report.battle_id);
    for flip in &report.flips {
        let outcome = match &flip.song_id {
            Some(song) => format!("revealed {}", song).green().to_string(),
            None => "nothing".dimmed().to_string(),
        };
        println!("  {} {}", format!("#{:<3}", flip.attempt + 1).dimmed(), outcome);
    }
    if let Some(reason) = report.stopped {
        println!("  {} {}", "stopped:".yellow(), reason);
    }

    let state = &report.state;
    println!(
        "  {}: {}/{} used, {} revealed of {} queued",
        "Seed".dimmed(),
        state.current_seed_index,
        state.total_attempts,
        state.revealed_count,
        state.total_queue_songs
    );
    if !state.revealed_queue_songs.is_empty() {
        let names: Vec<String> = state
            .revealed_queue_songs
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("  {}: {}", "Ready".dimmed(), names.join(", "));
    }
}
