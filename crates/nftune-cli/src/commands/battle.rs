//! Battle lifecycle commands: new, show, list and abandon.

use anyhow::Result;
use colored::Colorize;
use nftune_battle::SongId;
use nftune_service::{BattleView, NewBattle};
use std::process::ExitCode;

use super::reporting::{self, finish};
use crate::app::{runtime, AppOptions};

/// Creates a battle for a wallet and prompt.
///
/// # Arguments
/// * `app` - Global options
/// * `wallet` - Player wallet address
/// * `prompt` - Prompt id
/// * `songs` - Candidate song ids (empty for the whole catalogue)
/// * `json` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 if the battle was created, 1 otherwise
pub fn new(
    app: &AppOptions,
    wallet: &str,
    prompt: &str,
    songs: &[String],
    json: bool,
) -> Result<ExitCode> {
    let service = app.open_service()?;
    let request = NewBattle {
        wallet_address: wallet.to_string(),
        prompt_id: prompt.to_string(),
        songs: songs.iter().map(|s| SongId::from(s.as_str())).collect(),
    };

    if !json {
        println!("{}", "Waiting for randomness...".dimmed());
    }
    let result = runtime()?.block_on(async {
        let battle = service.create_battle(&request).await?;
        service.view(battle)
    });

    finish(result, json, |view| {
        println!("{} {}", "SUCCESS".green().bold(), "battle created".bold());
        print_view(view);
    })
}

/// Shows a battle with its resolved songs.
pub fn show(app: &AppOptions, id: &str, json: bool) -> Result<ExitCode> {
    let service = app.open_service()?;
    let result = service.battle(id).and_then(|battle| service.view(battle));
    finish(result, json, print_view)
}

/// Lists a wallet's battles, newest first.
pub fn list(app: &AppOptions, wallet: &str, json: bool) -> Result<ExitCode> {
    let service = app.open_service()?;
    finish(service.battles_for(wallet), json, |battles| {
        println!("{} {} ({})", "Battles of".cyan().bold(), wallet, battles.len());
        for battle in battles {
            println!(
                "  {} {} {} {}",
                battle.id,
                battle.status.as_str().dimmed(),
                reporting::energy_label(battle.energy_units.units()),
                format!(
                    "{} in playlist, {} queued",
                    battle.playlist_songs.len(),
                    battle.queue_songs.len()
                )
                .dimmed()
            );
        }
    })
}

/// Abandons an active battle.
pub fn abandon(app: &AppOptions, id: &str, json: bool) -> Result<ExitCode> {
    let service = app.open_service()?;
    let result = runtime()?.block_on(service.abandon(id));
    finish(result, json, |battle| {
        println!("{} battle {} abandoned", "SUCCESS".green().bold(), battle.id);
    })
}

/// Prints a battle view.
pub fn print_view(view: &BattleView) {
    reporting::print_battle_summary(&view.updated_battle_instance);
    let actions = [
        ("add", view.can_add_song),
        ("pass", view.can_pass_song),
    ]
    .iter()
    .map(|(name, ok)| {
        if *ok {
            name.green().to_string()
        } else {
            name.dimmed().strikethrough().to_string()
        }
    })
    .collect::<Vec<_>>()
    .join(" ");
    println!("  {}: {}", "Actions".dimmed(), actions);
    println!();
    reporting::print_songs("Playlist", &view.playlist_songs);
    reporting::print_songs("Queue", &view.queue_songs);
}
