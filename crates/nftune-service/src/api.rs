//! Request and response shapes of the mutating battle actions.
//!
//! Request:
//! ```json
//! {"battle_instance_id": "btl-1f0c...", "song_id": "s7"}
//! ```
//!
//! Success:
//! ```json
//! {"success": true, "updated_battle_instance": {...}, "playlist_songs": [...],
//!  "queue_songs": [...], "energy_units": 45, "can_add_song": true, "can_pass_song": true}
//! ```
//!
//! Failure:
//! ```json
//! {"success": false, "error": "not enough energy to add song: need 5, have 4",
//!  "code": "BTL_001", "status": 400}
//! ```

use nftune_battle::{Action, BattleError, BattleInstance, BattleResult, Song, SongId};
use serde::{Deserialize, Serialize};

/// The four mutating actions by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Add a revealed song.
    AddSong,
    /// Pass a revealed song.
    PassSong,
    /// Shuffle the playlist.
    Rearrange,
    /// Take a break.
    Pause,
}

impl ActionKind {
    /// Returns the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::AddSong => "add_song",
            ActionKind::PassSong => "pass_song",
            ActionKind::Rearrange => "rearrange",
            ActionKind::Pause => "pause",
        }
    }

    /// Parses a kind name (`add-song` and `add_song` both accepted).
    pub fn parse(name: &str) -> Option<Self> {
        match name.replace('-', "_").as_str() {
            "add_song" => Some(ActionKind::AddSong),
            "pass_song" => Some(ActionKind::PassSong),
            "rearrange" => Some(ActionKind::Rearrange),
            "pause" => Some(ActionKind::Pause),
            _ => None,
        }
    }

    /// Whether the action names a song.
    pub fn needs_song(&self) -> bool {
        matches!(self, ActionKind::AddSong | ActionKind::PassSong)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a mutating request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Target battle.
    pub battle_instance_id: String,
    /// Song for add/pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub song_id: Option<SongId>,
}

impl ActionRequest {
    /// Request without a song.
    pub fn new(battle_instance_id: impl Into<String>) -> Self {
        Self {
            battle_instance_id: battle_instance_id.into(),
            song_id: None,
        }
    }

    /// Adds the song.
    pub fn with_song(mut self, song_id: impl Into<SongId>) -> Self {
        self.song_id = Some(song_id.into());
        self
    }

    /// Builds the action, checking that add/pass name a song.
    pub fn to_action(&self, kind: ActionKind) -> BattleResult<Action> {
        if self.battle_instance_id.trim().is_empty() {
            return Err(BattleError::invalid_request("battle_instance_id is required"));
        }
        let song = || {
            self.song_id
                .clone()
                .filter(|s| !s.as_str().is_empty())
                .ok_or_else(|| {
                    BattleError::invalid_request(format!("song_id is required for {}", kind))
                })
        };
        Ok(match kind {
            ActionKind::AddSong => Action::AddSong { song_id: song()? },
            ActionKind::PassSong => Action::PassSong { song_id: song()? },
            ActionKind::Rearrange => Action::Rearrange,
            ActionKind::Pause => Action::Pause,
        })
    }
}

/// A battle with its song lists resolved against the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleView {
    /// The persisted battle after the action.
    pub updated_battle_instance: BattleInstance,
    /// Playlist songs, in order.
    pub playlist_songs: Vec<Song>,
    /// Queue songs, in order.
    pub queue_songs: Vec<Song>,
    /// Energy after the action.
    pub energy_units: u8,
    /// Add is affordable.
    pub can_add_song: bool,
    /// Pass is affordable.
    pub can_pass_song: bool,
}

/// Success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessBody {
    /// Always true.
    pub success: bool,
    /// Resolved battle.
    #[serde(flatten)]
    pub view: BattleView,
}

/// Failure body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always false.
    pub success: bool,
    /// Human-readable message.
    pub error: String,
    /// Stable error code.
    pub code: String,
    /// Non-2xx transport status.
    pub status: u16,
}

impl From<&BattleError> for ErrorBody {
    fn from(err: &BattleError) -> Self {
        Self {
            success: false,
            error: err.to_string(),
            code: err.code().to_string(),
            status: err.status(),
        }
    }
}

/// Outcome of a mutating request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionResponse {
    /// The action was applied.
    Success(Box<SuccessBody>),
    /// The action was rejected; nothing changed.
    Failure(ErrorBody),
}

impl ActionResponse {
    /// Wraps a view.
    pub fn success(view: BattleView) -> Self {
        ActionResponse::Success(Box::new(SuccessBody {
            success: true,
            view,
        }))
    }

    /// Wraps an error.
    pub fn failure(err: &BattleError) -> Self {
        ActionResponse::Failure(err.into())
    }

    /// Builds the response from a service result.
    pub fn from_result(result: BattleResult<BattleView>) -> Self {
        match result {
            Ok(view) => Self::success(view),
            Err(err) => Self::failure(&err),
        }
    }

    /// Transport status: 200 on success.
    pub fn status(&self) -> u16 {
        match self {
            ActionResponse::Success(_) => 200,
            ActionResponse::Failure(body) => body.status,
        }
    }

    /// Whether the action was applied.
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResponse::Success(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kind_parse() {
        assert_eq!(ActionKind::parse("add-song"), Some(ActionKind::AddSong));
        assert_eq!(ActionKind::parse("pass_song"), Some(ActionKind::PassSong));
        assert_eq!(ActionKind::parse("shuffle"), None);
        assert!(ActionKind::AddSong.needs_song());
        assert!(!ActionKind::Pause.needs_song());
    }

    #[test]
    fn test_request_requires_song_for_add() {
        let request = ActionRequest::new("b1");
        let err = request.to_action(ActionKind::AddSong).unwrap_err();
        assert_eq!(err.code(), "BTL_012");
        assert!(err.to_string().contains("add_song"));

        assert_eq!(request.to_action(ActionKind::Pause).unwrap(), Action::Pause);
        assert_eq!(
            request.with_song("s1").to_action(ActionKind::PassSong).unwrap(),
            Action::PassSong {
                song_id: "s1".into()
            }
        );
    }

    #[test]
    fn test_request_requires_battle_id() {
        let err = ActionRequest::new(" ").to_action(ActionKind::Pause).unwrap_err();
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn test_request_json_shape() {
        let request: ActionRequest =
            serde_json::from_str(r#"{"battle_instance_id":"b1","song_id":"s2"}"#).unwrap();
        assert_eq!(request, ActionRequest::new("b1").with_song("s2"));

        let request: ActionRequest =
            serde_json::from_str(r#"{"battle_instance_id":"b1"}"#).unwrap();
        assert_eq!(request.song_id, None);
    }

    #[test]
    fn test_failure_body() {
        let response = ActionResponse::failure(&BattleError::EmptyPlaylist);
        assert_eq!(response.status(), 400);
        assert!(!response.is_success());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "BTL_002");
        assert_eq!(json["status"], 400);
        assert!(json["error"].as_str().unwrap().contains("rearrange"));
    }
}
