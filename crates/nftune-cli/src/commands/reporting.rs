//! Shared output helpers for commands.

use anyhow::Result;
use colored::Colorize;
use nftune_battle::{BattleError, BattleInstance, Song};
use serde::Serialize;
use std::process::ExitCode;

use super::json_output::{to_json_string, CommandOutput};

/// Prints the outcome of a service call and picks the exit code.
///
/// With `json`, the [`CommandOutput`] envelope is printed. Otherwise
/// `human` renders a success and failures print their code and message.
pub fn finish<T: Serialize>(
    result: Result<T, BattleError>,
    json: bool,
    human: impl FnOnce(&T),
) -> Result<ExitCode> {
    let ok = result.is_ok();
    if json {
        println!("{}", to_json_string(&CommandOutput::from(result)));
    } else {
        match &result {
            Ok(value) => human(value),
            Err(err) => print_battle_error(err),
        }
    }
    Ok(exit_code(ok))
}

/// Exit code for a success flag.
pub fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

/// Prints a battle error to stderr.
pub fn print_battle_error(err: &BattleError) {
    eprintln!(
        "{} {} {}",
        "FAILED".red().bold(),
        format!("[{}]", err.code()).dimmed(),
        err
    );
}

/// Prints the header lines of a battle.
pub fn print_battle_summary(battle: &BattleInstance) {
    println!("{} {}", "Battle:".cyan().bold(), battle.id);
    println!("  {}: {}", "Status".dimmed(), battle.status.as_str());
    println!("  {}: {}", "Prompt".dimmed(), battle.prompt_id);
    println!("  {}: {}", "Seed".dimmed(), battle.random_seed);
    println!(
        "  {}: {}",
        "Energy".dimmed(),
        energy_label(battle.energy_units.units())
    );
    println!("  {}: {}", "Version".dimmed(), battle.version);
}

/// Energy formatted with a color for how much is left.
pub fn energy_label(units: u8) -> String {
    let label = format!("{}/100", units);
    match units {
        0..=2 => label.red().bold().to_string(),
        3..=19 => label.yellow().to_string(),
        _ => label.green().to_string(),
    }
}

/// Prints a numbered song list.
pub fn print_songs(title: &str, songs: &[Song]) {
    println!("{} ({})", title.cyan().bold(), songs.len());
    if songs.is_empty() {
        println!("  {}", "(empty)".dimmed());
    }
    for (i, song) in songs.iter().enumerate() {
        println!(
            "  {:>2}. {} {} {} {}",
            i + 1,
            song.title,
            "by".dimmed(),
            song.artist,
            format!("[{} {}]", song.id, song.duration_label()).dimmed()
        );
    }
}
