//! Request and response types for the WebSocket battle server.

use nftune_battle::{RevealResult, RevealSnapshot};
use nftune_service::{ActionKind, ActionRequest, ErrorBody};
use serde::{Deserialize, Serialize};

/// Request types supported by the server.
///
/// Every request carries the action body (`battle_instance_id` and, for add
/// and pass, `song_id`) next to its `type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerRequest {
    /// Fetch the persisted battle with its songs.
    GetBattle(ActionRequest),
    /// Move a song from the queue to the playlist.
    AddSong(ActionRequest),
    /// Drop a song from the queue.
    PassSong(ActionRequest),
    /// Shuffle the playlist.
    Rearrange(ActionRequest),
    /// Recover energy.
    Pause(ActionRequest),
    /// Flip the next card.
    Flip(ActionRequest),
    /// Turn the face-up card back over.
    FlipBack(ActionRequest),
    /// Forget this connection's reveal progress.
    ResetReveal(ActionRequest),
}

impl ServerRequest {
    /// The request body.
    pub fn body(&self) -> &ActionRequest {
        match self {
            ServerRequest::GetBattle(body)
            | ServerRequest::AddSong(body)
            | ServerRequest::PassSong(body)
            | ServerRequest::Rearrange(body)
            | ServerRequest::Pause(body)
            | ServerRequest::Flip(body)
            | ServerRequest::FlipBack(body)
            | ServerRequest::ResetReveal(body) => body,
        }
    }

    /// The scoring action, for mutating requests.
    pub fn action_kind(&self) -> Option<ActionKind> {
        match self {
            ServerRequest::AddSong(_) => Some(ActionKind::AddSong),
            ServerRequest::PassSong(_) => Some(ActionKind::PassSong),
            ServerRequest::Rearrange(_) => Some(ActionKind::Rearrange),
            ServerRequest::Pause(_) => Some(ActionKind::Pause),
            _ => None,
        }
    }
}

/// Response to `flip`, `flip_back` and `reset_reveal`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealResponse {
    /// Always true.
    pub success: bool,
    /// Battle the reveal state belongs to.
    pub battle_instance_id: String,
    /// Outcome of a flip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RevealResult>,
    /// Reveal state after the request.
    pub reveal: RevealSnapshot,
}

/// Error response for requests the server could not interpret.
pub type ErrorResponse = ErrorBody;

/// Builds a 400 error response with a CLI code.
pub fn protocol_error(code: &str, message: impl Into<String>) -> ErrorResponse {
    ErrorBody {
        success: false,
        error: message.into(),
        code: code.to_string(),
        status: 400,
    }
}
