//! Submitting finished playlists and browsing the gallery.

use nftune_battle::{
    group_by_prompt, BattleError, BattleInstance, BattleResult, BattleStatus, GalleryGroup,
    GalleryPlaylist, PlaylistPrompt,
};
use tracing::{info, warn};

use super::BattleService;
use crate::randomness::RandomnessSource;
use crate::store::StoreExt;

/// Gallery entry id for a battle: `gal-` followed by 16 hex digits.
///
/// A battle has at most one entry, so a repeated submit finds the same id.
pub fn gallery_entry_id(battle_id: &str) -> String {
    let hash = blake3::hash(battle_id.as_bytes());
    format!("gal-{}", &hash.to_hex().as_str()[..16])
}

impl<R: RandomnessSource> BattleService<R> {
    /// Closes an active battle and records its playlist in the gallery.
    ///
    /// If an earlier submit closed the battle but failed to write the entry,
    /// this writes it.
    pub async fn submit_to_gallery(
        &self,
        battle_id: &str,
        playlist_name: &str,
        playlist_description: &str,
    ) -> BattleResult<GalleryPlaylist> {
        let playlist_name = playlist_name.trim();
        if playlist_name.is_empty() {
            return Err(BattleError::invalid_request("playlist name is required"));
        }

        let submitted = self
            .mutate(battle_id, "submit", |battle| {
                battle.ensure_active()?;
                if battle.playlist_songs.is_empty() {
                    return Err(BattleError::EmptyPlaylist);
                }
                let mut next = battle.clone();
                next.status = BattleStatus::Submitted;
                Ok(next)
            })
            .await;
        let battle = match submitted {
            Ok(battle) => battle,
            Err(err @ BattleError::BattleClosed { .. }) => {
                let battle = self.unrecorded_submission(battle_id)?.ok_or(err)?;
                warn!(battle = battle_id, "recording gallery entry for an earlier submit");
                battle
            }
            Err(err) => return Err(err),
        };

        let entry = GalleryPlaylist {
            id: gallery_entry_id(&battle.id),
            battle_id: battle.id.clone(),
            user_id: battle.user_id.clone(),
            prompt_id: battle.prompt_id.clone(),
            playlist_name: playlist_name.to_string(),
            playlist_description: playlist_description.trim().to_string(),
            playlist_songs: battle.playlist_songs.clone(),
            energy_remaining: battle.energy_units.units(),
            likes: 0,
            play_count: 0,
            submitted_at: battle.updated_at,
        };
        self.store.insert(&entry)?;

        info!(
            entry = %entry.id,
            battle = %entry.battle_id,
            songs = entry.playlist_songs.len(),
            energy = entry.energy_remaining,
            "playlist submitted to gallery"
        );
        Ok(entry)
    }

    /// A submitted battle whose gallery entry was never written.
    fn unrecorded_submission(&self, battle_id: &str) -> BattleResult<Option<BattleInstance>> {
        let battle = self.battle(battle_id)?;
        if battle.status != BattleStatus::Submitted {
            return Ok(None);
        }
        let entry: Option<GalleryPlaylist> = self.store.get(&gallery_entry_id(battle_id))?;
        Ok(entry.is_none().then_some(battle))
    }

    /// Gallery entries grouped by prompt, newest first.
    ///
    /// With a wallet, only that player's entries; an unknown wallet has none.
    pub fn gallery(&self, wallet_address: Option<&str>) -> BattleResult<Vec<GalleryGroup>> {
        let mut entries: Vec<GalleryPlaylist> = self.store.all()?;
        if let Some(wallet) = wallet_address {
            match self.user_by_wallet(wallet)? {
                Some(user) => entries.retain(|e| e.user_id == user.id),
                None => entries.clear(),
            }
        }
        let prompts: Vec<PlaylistPrompt> = self.store.all()?;
        Ok(group_by_prompt(entries, &prompts))
    }

    /// A single gallery entry.
    pub fn gallery_entry(&self, id: &str) -> BattleResult<GalleryPlaylist> {
        self.store.require(id)
    }

    /// Increments an entry's like counter.
    pub async fn like_gallery_playlist(&self, id: &str) -> BattleResult<GalleryPlaylist> {
        self.update_gallery_entry(id, |entry| entry.likes += 1).await
    }

    /// Increments an entry's play counter.
    pub async fn record_gallery_play(&self, id: &str) -> BattleResult<GalleryPlaylist> {
        self.update_gallery_entry(id, |entry| entry.play_count += 1).await
    }

    async fn update_gallery_entry(
        &self,
        id: &str,
        update: impl FnOnce(&mut GalleryPlaylist),
    ) -> BattleResult<GalleryPlaylist> {
        let _guard = self.locks.acquire(&format!("gallery:{}", id)).await;
        let mut entry = self.gallery_entry(id)?;
        update(&mut entry);
        self.store.put(&entry)?;
        Ok(entry)
    }
}
