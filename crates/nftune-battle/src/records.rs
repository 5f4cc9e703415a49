//! Catalogue, user, prompt and gallery records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::battle::SongId;

/// A song in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Song identifier.
    pub id: SongId,
    /// Title.
    pub title: String,
    /// Artist name.
    pub artist: String,
    /// Album, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: u32,
    /// Path or URL of the audio file.
    #[serde(default)]
    pub file_path: String,
    /// Like counter.
    #[serde(default)]
    pub likes: u64,
    /// Play counter.
    #[serde(default)]
    pub play_count: u64,
}

impl Song {
    /// Creates a song with zeroed counters.
    pub fn new(id: impl Into<SongId>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            album: None,
            duration: 0,
            file_path: String::new(),
            likes: 0,
            play_count: 0,
        }
    }

    /// Formats the duration as `m:ss`.
    pub fn duration_label(&self) -> String {
        format!("{}:{:02}", self.duration / 60, self.duration % 60)
    }
}

/// A player, identified by wallet address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: String,
    /// Wallet address, lower-cased.
    pub wallet_address: String,
    /// Display name.
    #[serde(default)]
    pub username: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Normalizes a wallet address for lookups.
    pub fn normalize_wallet(address: &str) -> String {
        address.trim().to_ascii_lowercase()
    }

    /// Display name, falling back to a shortened wallet.
    pub fn display_name(&self) -> String {
        match &self.username {
            Some(name) if !name.is_empty() => name.clone(),
            _ => {
                let w = &self.wallet_address;
                let head = w.get(..6);
                let tail = w.len().checked_sub(4).and_then(|at| w.get(at..));
                match (head, tail) {
                    (Some(head), Some(tail)) if w.len() > 10 => format!("{}...{}", head, tail),
                    _ => w.clone(),
                }
            }
        }
    }
}

/// The theme a battle's playlist answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistPrompt {
    /// Prompt identifier.
    pub id: String,
    /// Short name.
    pub name: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Color gradient shown behind the prompt.
    #[serde(default)]
    pub color: String,
}

/// A playlist submitted at the end of a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryPlaylist {
    /// Entry identifier.
    pub id: String,
    /// Battle that produced the playlist.
    pub battle_id: String,
    /// Submitting user.
    pub user_id: String,
    /// Prompt the playlist answers.
    pub prompt_id: String,
    /// Name chosen on submission.
    pub playlist_name: String,
    /// Description chosen on submission.
    #[serde(default)]
    pub playlist_description: String,
    /// Final playlist order.
    pub playlist_songs: Vec<SongId>,
    /// Energy left when submitted.
    pub energy_remaining: u8,
    /// Like counter.
    #[serde(default)]
    pub likes: u64,
    /// Play counter.
    #[serde(default)]
    pub play_count: u64,
    /// Submission time.
    pub submitted_at: DateTime<Utc>,
}

/// Gallery entries sharing a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryGroup {
    /// The prompt, when it is still in the store.
    pub prompt: Option<PlaylistPrompt>,
    /// Prompt identifier.
    pub prompt_id: String,
    /// Entries, newest first.
    pub playlists: Vec<GalleryPlaylist>,
}

/// Groups entries by prompt, sorting each group newest first.
///
/// Groups appear in the order of their newest entry.
pub fn group_by_prompt(
    mut entries: Vec<GalleryPlaylist>,
    prompts: &[PlaylistPrompt],
) -> Vec<GalleryGroup> {
    entries.sort_by(|a, b| {
        b.submitted_at
            .cmp(&a.submitted_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut groups: Vec<GalleryGroup> = Vec::new();
    for entry in entries {
        match groups.iter_mut().find(|g| g.prompt_id == entry.prompt_id) {
            Some(group) => group.playlists.push(entry),
            None => groups.push(GalleryGroup {
                prompt: prompts.iter().find(|p| p.id == entry.prompt_id).cloned(),
                prompt_id: entry.prompt_id.clone(),
                playlists: vec![entry],
            }),
        }
    }
    groups
}
