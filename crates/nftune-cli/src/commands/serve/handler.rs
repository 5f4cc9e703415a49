//! Request handler logic for the WebSocket battle server.

use std::time::Instant;

use nftune_battle::{BattleError, BattleResult, FlipOutcome, RevealContext};
use nftune_service::{ActionResponse, BattleService, RandomnessSource};
use serde::Serialize;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use crate::commands::json_output::error_codes;

use super::session::Session;
use super::types::{protocol_error, ErrorResponse, RevealResponse, ServerRequest};

/// Process a single WebSocket message and return a response.
pub async fn process_message<R: RandomnessSource>(
    service: &BattleService<R>,
    session: &mut Session,
    msg: Message,
) -> Option<String> {
    match msg {
        Message::Text(text) => Some(handle_request(service, session, &text).await),
        Message::Binary(data) => match String::from_utf8(data) {
            Ok(text) => Some(handle_request(service, session, &text).await),
            Err(_) => Some(to_json(&protocol_error(
                error_codes::INVALID_UTF8,
                "Binary message must be valid UTF-8 JSON",
            ))),
        },
        // Ping/Pong are answered by tungstenite; Close ends the read loop.
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_) => None,
    }
}

/// Handle a JSON request and return a JSON response.
pub async fn handle_request<R: RandomnessSource>(
    service: &BattleService<R>,
    session: &mut Session,
    json_text: &str,
) -> String {
    let request: ServerRequest = match serde_json::from_str(json_text) {
        Ok(req) => req,
        Err(e) => {
            return to_json(&protocol_error(
                error_codes::INVALID_REQUEST,
                format!("Invalid request JSON: {}", e),
            ));
        }
    };
    let battle_id = request.body().battle_instance_id.clone();
    debug!(battle = %battle_id, request = ?request, "request received");

    if let Some(kind) = request.action_kind() {
        let response = service.handle(kind, request.body()).await;
        if let (ActionResponse::Success(_), Some(song)) = (&response, &request.body().song_id) {
            session.consume(&battle_id, song);
        }
        return to_json(&response);
    }

    let result = match &request {
        ServerRequest::GetBattle(_) => {
            let view = service.battle(&battle_id).and_then(|b| service.view(b));
            return to_json(&ActionResponse::from_result(view));
        }
        ServerRequest::Flip(_) => flip(service, session, &battle_id),
        ServerRequest::FlipBack(_) => flip_back(service, session, &battle_id),
        ServerRequest::ResetReveal(_) => {
            session.reveal_for(&battle_id).reset_reveal_state();
            reveal_response(service, session, &battle_id)
        }
        _ => Err(BattleError::invalid_request("unsupported request")),
    };

    match result {
        Ok(response) => to_json(&response),
        Err(err) => to_json(&ErrorResponse::from(&err)),
    }
}

fn flip<R: RandomnessSource>(
    service: &BattleService<R>,
    session: &mut Session,
    battle_id: &str,
) -> BattleResult<RevealResponse> {
    let battle = service.battle(battle_id)?;
    battle.ensure_active()?;
    let ctx = RevealContext::from_battle(&battle);
    let now = Instant::now();

    let reveal = session.reveal_for(battle_id);
    let result = reveal.flip(&ctx, now).into_result()?;
    Ok(RevealResponse {
        success: true,
        battle_instance_id: battle.id.clone(),
        result,
        reveal: reveal.snapshot(&ctx, now),
    })
}

fn flip_back<R: RandomnessSource>(
    service: &BattleService<R>,
    session: &mut Session,
    battle_id: &str,
) -> BattleResult<RevealResponse> {
    let now = Instant::now();
    match session.reveal_for(battle_id).flip_back(now) {
        FlipOutcome::Rejected(reason) => Err(reason.into()),
        _ => reveal_response(service, session, battle_id),
    }
}

fn reveal_response<R: RandomnessSource>(
    service: &BattleService<R>,
    session: &mut Session,
    battle_id: &str,
) -> BattleResult<RevealResponse> {
    let battle = service.battle(battle_id)?;
    let ctx = RevealContext::from_battle(&battle);
    Ok(RevealResponse {
        success: true,
        battle_instance_id: battle.id.clone(),
        result: None,
        reveal: session.reveal_for(battle_id).snapshot(&ctx, Instant::now()),
    })
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        let error = protocol_error(
            error_codes::JSON_SERIALIZE,
            format!("Failed to serialize response: {}", e),
        );
        serde_json::to_string(&error).unwrap_or_else(|_| {
            r#"{"success":false,"error":"Failed to serialize response","code":"CLI_009","status":500}"#
                .to_string()
        })
    })
}
