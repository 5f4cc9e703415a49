//! Gallery commands: submit a battle, browse, like and play entries.

use anyhow::Result;
use colored::Colorize;
use nftune_battle::{GalleryGroup, GalleryPlaylist, Song};
use serde::{Deserialize, Serialize};
use std::process::ExitCode;

use super::reporting::{self, finish};
use crate::app::{runtime, AppOptions};

/// Submits an active battle's playlist to the gallery.
///
/// # Arguments
/// * `app` - Global options
/// * `battle_id` - Battle to close
/// * `name` - Playlist name
/// * `description` - Playlist description
/// * `json` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 if submitted, 1 otherwise
pub fn submit(
    app: &AppOptions,
    battle_id: &str,
    name: &str,
    description: &str,
    json: bool,
) -> Result<ExitCode> {
    let service = app.open_service()?;
    let result = runtime()?.block_on(service.submit_to_gallery(battle_id, name, description));
    finish(result, json, |entry| {
        println!("{} submitted {}", "SUCCESS".green().bold(), entry.id);
        print_entry(entry);
    })
}

/// Lists gallery entries grouped by prompt.
pub fn list(app: &AppOptions, wallet: Option<&str>, json: bool) -> Result<ExitCode> {
    let service = app.open_service()?;
    finish(service.gallery(wallet), json, |groups| print_groups(groups))
}

/// Shows one gallery entry with its songs.
pub fn show(app: &AppOptions, id: &str, json: bool) -> Result<ExitCode> {
    let service = app.open_service()?;
    let result = service.gallery_entry(id).and_then(|entry| {
        Ok(EntryView {
            songs: service.songs_for(&entry.playlist_songs)?,
            entry,
        })
    });
    finish(result, json, |view| {
        print_entry(&view.entry);
        reporting::print_songs("Songs", &view.songs);
    })
}

/// A gallery entry with its songs resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryView {
    /// The entry.
    pub entry: GalleryPlaylist,
    /// Its songs, in playlist order.
    pub songs: Vec<Song>,
}

/// Likes a gallery entry.
pub fn like(app: &AppOptions, id: &str, json: bool) -> Result<ExitCode> {
    let service = app.open_service()?;
    let result = runtime()?.block_on(service.like_gallery_playlist(id));
    finish(result, json, |entry| {
        println!(
            "{} {} ({} likes)",
            "Liked".green().bold(),
            entry.playlist_name,
            entry.likes
        );
    })
}

/// Counts a play of a gallery entry.
pub fn play(app: &AppOptions, id: &str, json: bool) -> Result<ExitCode> {
    let service = app.open_service()?;
    let result = runtime()?.block_on(service.record_gallery_play(id));
    finish(result, json, |entry| {
        println!(
            "{} {} ({} plays)",
            "Played".green().bold(),
            entry.playlist_name,
            entry.play_count
        );
    })
}

fn print_groups(groups: &[GalleryGroup]) {
    if groups.is_empty() {
        println!("{}", "Gallery is empty".dimmed());
    }
    for group in groups {
        let title = group
            .prompt
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_else(|| group.prompt_id.clone());
        println!("{} ({})", title.cyan().bold(), group.playlists.len());
        for entry in &group.playlists {
            println!(
                "  {} {} {}",
                entry.id.dimmed(),
                entry.playlist_name,
                format!(
                    "{} songs, {} energy left, {} likes",
                    entry.playlist_songs.len(),
                    entry.energy_remaining,
                    entry.likes
                )
                .dimmed()
            );
        }
    }
}

fn print_entry(entry: &GalleryPlaylist) {
    println!("{} {}", "Playlist:".cyan().bold(), entry.playlist_name);
    if !entry.playlist_description.is_empty() {
        println!("  {}", entry.playlist_description.dimmed());
    }
    println!("  {}: {}", "Battle".dimmed(), entry.battle_id);
    println!("  {}: {}", "Prompt".dimmed(), entry.prompt_id);
    println!(
        "  {}: {}",
        "Energy left".dimmed(),
        reporting::energy_label(entry.energy_remaining)
    );
    println!(
        "  {}: {}",
        "Submitted".dimmed(),
        entry.submitted_at.format("%Y-%m-%d %H:%M UTC")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_gallery_lists() {
        let tmp = tempfile::tempdir().unwrap();
        let app = AppOptions::with_store(tmp.path());
        assert_eq!(list(&app, None, true).unwrap(), ExitCode::SUCCESS);
        assert_eq!(list(&app, Some("0xabc"), false).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn test_unknown_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let app = AppOptions::with_store(tmp.path());
        assert_eq!(show(&app, "gal-none", true).unwrap(), ExitCode::from(1));
        assert_eq!(like(&app, "gal-none", true).unwrap(), ExitCode::from(1));
    }

    #[test]
    fn test_submit_requires_name() {
        let tmp = tempfile::tempdir().unwrap();
        let app = AppOptions::with_store(tmp.path());
        assert_eq!(submit(&app, "b1", " ", "", true).unwrap(), ExitCode::from(1));
    }
}
