//! Scoring action commands: add, pass, rearrange and pause.
//!
//! Under `--json` these print the same response body the WebSocket server
//! sends, so scripts can treat both front-ends alike.

use anyhow::Result;
use colored::Colorize;
use nftune_battle::Tariff;
use nftune_service::{ActionKind, ActionRequest, ActionResponse};
use std::process::ExitCode;

use super::battle::print_view;
use super::json_output::to_json_string;
use super::reporting::exit_code;
use crate::app::{runtime, AppOptions};

/// Runs one scoring action against a stored battle.
///
/// # Arguments
/// * `app` - Global options
/// * `kind` - Action to apply
/// * `battle_id` - Target battle
/// * `song_id` - Song for add and pass
/// * `json` - Whether to output the wire response
///
/// # Returns
/// Exit code: 0 if the action was applied, 1 if it was rejected
pub fn run(
    app: &AppOptions,
    kind: ActionKind,
    battle_id: &str,
    song_id: Option<&str>,
    json: bool,
) -> Result<ExitCode> {
    let service = app.open_service()?;
    let mut request = ActionRequest::new(battle_id);
    if let Some(song_id) = song_id {
        request = request.with_song(song_id);
    }

    let response = runtime()?.block_on(service.handle(kind, &request));

    if json {
        println!("{}", to_json_string(&response));
    } else {
        print_response(kind, &response);
    }
    Ok(exit_code(response.is_success()))
}

fn print_response(kind: ActionKind, response: &ActionResponse) {
    match response {
        ActionResponse::Success(body) => {
            println!(
                "{} {} ({:+} energy)",
                "SUCCESS".green().bold(),
                tariff(kind).as_str(),
                tariff(kind).delta()
            );
            print_view(&body.view);
        }
        ActionResponse::Failure(body) => {
            eprintln!(
                "{} {} {} {}",
                "FAILED".red().bold(),
                format!("[{} {}]", body.code, body.status).dimmed(),
                tariff(kind).as_str(),
                body.error
            );
        }
    }
}

fn tariff(kind: ActionKind) -> Tariff {
    match kind {
        ActionKind::AddSong => Tariff::AddSong,
        ActionKind::PassSong => Tariff::PassSong,
        ActionKind::Rearrange => Tariff::Rearrange,
        ActionKind::Pause => Tariff::Pause,
    }
}
