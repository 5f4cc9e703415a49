//! Daily playlists command.

use anyhow::Result;
use colored::Colorize;
use nftune_battle::{DailyPlaylist, RandomSeed};
use std::process::ExitCode;

use super::json_output::{error_codes, to_json_string, CommandOutput, JsonError};
use super::reporting::finish;
use crate::app::AppOptions;

/// Prints the six daily playlists.
///
/// Without `--seed` (or with an all-zero seed) the playlists come from the
/// service's own generator and differ between runs.
pub fn run(app: &AppOptions, seed: Option<&str>, json: bool) -> Result<ExitCode> {
    let seed = match seed.map(RandomSeed::parse).transpose() {
        Ok(seed) => seed,
        Err(err) if json => {
            let output = CommandOutput::<()>::failure(vec![JsonError::new(
                error_codes::INVALID_SEED,
                err.to_string(),
            )]);
            println!("{}", to_json_string(&output));
            return Ok(ExitCode::from(1));
        }
        Err(err) => return Err(err.into()),
    };

    let service = app.open_service()?;
    finish(service.daily_playlists(seed.as_ref()), json, |playlists| {
        print_playlists(playlists)
    })
}

fn print_playlists(playlists: &[DailyPlaylist]) {
    for playlist in playlists {
        println!(
            "{} {} {}",
            format!("{}.", playlist.id).dimmed(),
            playlist.name.cyan().bold(),
            format!("({} songs)", playlist.song_count()).dimmed()
        );
        println!("   {}", playlist.description.dimmed());
        for song in &playlist.songs {
            println!("     {} {} {}", song.title, "by".dimmed(), song.artist);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_on_empty_store() {
        let tmp = tempfile::tempdir().unwrap();
        let app = AppOptions::with_store(tmp.path());
        assert_eq!(run(&app, Some("0x1234abcd"), true).unwrap(), ExitCode::SUCCESS);
        assert_eq!(run(&app, None, false).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn test_bad_seed() {
        let tmp = tempfile::tempdir().unwrap();
        let app = AppOptions::with_store(tmp.path());
        assert_eq!(run(&app, Some("zz"), true).unwrap(), ExitCode::from(1));
        assert!(run(&app, Some("zz"), false).is_err());
    }
}
