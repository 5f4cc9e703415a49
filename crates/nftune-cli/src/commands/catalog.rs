//! Catalogue commands: import, songs and prompts.

use anyhow::{Context, Result};
use colored::Colorize;
use nftune_battle::SongId;
use nftune_service::Catalog;
use std::path::Path;
use std::process::ExitCode;

use super::json_output::{error_codes, to_json_string, CommandOutput, JsonError};
use super::reporting::{self, finish};
use crate::app::{runtime, AppOptions};

/// Imports a catalogue file (songs and prompts) into the store.
///
/// # Arguments
/// * `app` - Global options
/// * `path` - Catalogue JSON file
/// * `json` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 on success, 1 if the file could not be read or parsed
pub fn import(app: &AppOptions, path: &str, json: bool) -> Result<ExitCode> {
    let catalog = match read_catalog(Path::new(path)) {
        Ok(catalog) => catalog,
        Err(error) if json => {
            let output = CommandOutput::<()>::failure(vec![error.with_file(path)]);
            println!("{}", to_json_string(&output));
            return Ok(ExitCode::from(1));
        }
        Err(error) => anyhow::bail!("{}: {}", path, error.message),
    };

    let service = app.open_service()?;
    finish(service.import_catalog(&catalog), json, |summary| {
        println!("{} {}", "Imported:".cyan().bold(), path);
        println!("  {}: {}", "Songs".dimmed(), summary.songs);
        println!("  {}: {}", "Prompts".dimmed(), summary.prompts);
    })
}

fn read_catalog(path: &Path) -> Result<Catalog, JsonError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        JsonError::new(error_codes::FILE_READ, format!("Failed to read file: {}", e))
    })?;
    Catalog::from_json(&text).map_err(|e| {
        JsonError::new(
            error_codes::JSON_PARSE,
            format!("Invalid catalogue JSON: {}", e),
        )
    })
}

/// Lists every song in the catalogue.
pub fn list_songs(app: &AppOptions, json: bool) -> Result<ExitCode> {
    let service = app.open_service()?;
    finish(service.songs(), json, |songs| {
        reporting::print_songs("Songs", songs);
    })
}

/// Likes a song.
pub fn like_song(app: &AppOptions, id: &str, json: bool) -> Result<ExitCode> {
    let service = app.open_service()?;
    let result = runtime()?.block_on(service.like_song(&SongId::from(id)));
    finish(result, json, |song| {
        println!("{} {} ({} likes)", "Liked".green().bold(), song.title, song.likes);
    })
}

/// Counts a play of a song.
pub fn play_song(app: &AppOptions, id: &str, json: bool) -> Result<ExitCode> {
    let service = app.open_service()?;
    let result = runtime()?.block_on(service.record_song_play(&SongId::from(id)));
    finish(result, json, |song| {
        println!(
            "{} {} ({} plays)",
            "Played".green().bold(),
            song.title,
            song.play_count
        );
    })
}

/// Lists the playlist prompts.
pub fn list_prompts(app: &AppOptions, json: bool) -> Result<ExitCode> {
    let service = app.open_service()?;
    finish(service.prompts(), json, |prompts| {
        println!("{} ({})", "Prompts".cyan().bold(), prompts.len());
        for prompt in prompts {
            println!("  {} {}", prompt.id.dimmed(), prompt.name);
            if !prompt.description.is_empty() {
                println!("      {}", prompt.description.dimmed());
            }
        }
    })
}

/// Reads a catalogue for callers outside this module.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    read_catalog(path).map_err(|e| anyhow::anyhow!(e.message)).with_context(|| {
        format!("Failed to load catalogue: {}", path.display())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "songs": [
            {"id": "s1", "title": "Intro", "artist": "Band"},
            {"id": "s2", "title": "Outro", "artist": "Band", "duration": 185}
        ],
        "prompts": [{"id": "p1", "name": "Late Night"}]
    }"#;

    #[test]
    fn test_import_then_list() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("catalog.json");
        std::fs::write(&file, CATALOG).unwrap();
        let app = AppOptions::with_store(tmp.path().join("store"));

        let code = import(&app, file.to_str().unwrap(), true).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let service = app.open_service().unwrap();
        assert_eq!(service.songs().unwrap().len(), 2);
        assert_eq!(service.prompts().unwrap()[0].name, "Late Night");
    }

    #[test]
    fn test_import_missing_file_json() {
        let tmp = tempfile::tempdir().unwrap();
        let app = AppOptions::with_store(tmp.path());
        let code = import(&app, "/nonexistent/catalog.json", true).unwrap();
        assert_eq!(code, ExitCode::from(1));
    }

    #[test]
    fn test_import_invalid_json_human() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("catalog.json");
        std::fs::write(&file, "{ not json").unwrap();
        let app = AppOptions::with_store(tmp.path().join("store"));

        let err = import(&app, file.to_str().unwrap(), false).unwrap_err();
        assert!(err.to_string().contains("Invalid catalogue JSON"));
    }

    #[test]
    fn test_like_unknown_song_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let app = AppOptions::with_store(tmp.path());
        assert_eq!(like_song(&app, "ghost", true).unwrap(), ExitCode::from(1));
    }
}
