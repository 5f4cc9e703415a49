//! Battle creation and the scoring actions.

use chrono::Utc;
use nftune_battle::{
    apply_action, create_queue_rng, shuffled, Action, BattleError, BattleInstance, BattleResult,
    BattleStatus, PlaylistPrompt, SongId, User,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::BattleService;
use crate::api::{ActionKind, ActionRequest, ActionResponse, BattleView};
use crate::randomness::{wait_for_result, RandomnessResult, RandomnessSource};
use crate::store::StoreExt;

/// Parameters of a new battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBattle {
    /// Player wallet address (any case).
    pub wallet_address: String,
    /// Prompt the playlist answers.
    pub prompt_id: String,
    /// Candidate songs. Empty means the whole catalogue.
    #[serde(default)]
    pub songs: Vec<SongId>,
}

impl<R: RandomnessSource> BattleService<R> {
    /// Requests a seed and waits for it within the configured bound.
    pub async fn fetch_randomness(&self) -> BattleResult<RandomnessResult> {
        let result = wait_for_result(
            &self.randomness,
            self.config.randomness_timeout(),
            self.config.poll_interval(),
        )
        .await;
        if let Err(err) = &result {
            warn!(error = %err, "randomness request failed");
        }
        result
    }

    /// Creates and persists a battle.
    ///
    /// The queue is the candidate list shuffled with a generator keyed on the
    /// new seed. Nothing is written (not even the user) if the randomness
    /// source times out.
    pub async fn create_battle(&self, request: &NewBattle) -> BattleResult<BattleInstance> {
        if User::normalize_wallet(&request.wallet_address).is_empty() {
            return Err(BattleError::invalid_request("wallet address is required"));
        }
        let prompt: PlaylistPrompt = self.store.require(&request.prompt_id)?;
        let library = self.resolve_library(&request.songs)?;

        let randomness = self.fetch_randomness().await?;
        let user = self.ensure_user(&request.wallet_address).await?;
        let seed = randomness.seed;
        let queue = shuffled(&library, &mut create_queue_rng(&seed));

        let id = self.new_record_id("btl", &[seed.as_str(), &user.id, &prompt.id]);
        let battle = BattleInstance::builder(id, seed)
            .user(user.id)
            .prompt(prompt.id)
            .coin_flip(randomness.coin_flip)
            .energy(self.config.initial_energy as i64)
            .library(library)
            .queue(queue)
            .created_at(Utc::now())
            .build();

        self.store.insert(&battle)?;
        info!(
            battle = %battle.id,
            user = %battle.user_id,
            prompt = %battle.prompt_id,
            songs = battle.queue_songs.len(),
            attempts = battle.initial_seed_count,
            "battle created"
        );
        Ok(battle)
    }

    fn resolve_library(&self, requested: &[SongId]) -> BattleResult<Vec<SongId>> {
        let library: Vec<SongId> = if requested.is_empty() {
            self.songs()?.into_iter().map(|s| s.id).collect()
        } else {
            let mut seen = std::collections::HashSet::new();
            let mut library = Vec::with_capacity(requested.len());
            for id in requested {
                if !seen.insert(id) {
                    continue;
                }
                self.song(id)?;
                library.push(id.clone());
            }
            library
        };

        if library.is_empty() {
            return Err(BattleError::invalid_request(
                "no songs available for a battle; import a catalogue first",
            ));
        }
        Ok(library)
    }

    /// Loads a battle.
    pub fn battle(&self, id: &str) -> BattleResult<BattleInstance> {
        self.store.require(id)
    }

    /// Battles owned by the wallet, newest first.
    pub fn battles_for(&self, wallet_address: &str) -> BattleResult<Vec<BattleInstance>> {
        let Some(user) = self.user_by_wallet(wallet_address)? else {
            return Ok(Vec::new());
        };
        let mut battles: Vec<BattleInstance> = self
            .store
            .all::<BattleInstance>()?
            .into_iter()
            .filter(|b| b.user_id == user.id)
            .collect();
        battles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(battles)
    }

    /// Resolves a battle's song lists against the catalogue.
    pub fn view(&self, battle: BattleInstance) -> BattleResult<BattleView> {
        Ok(BattleView {
            playlist_songs: self.songs_for(&battle.playlist_songs)?,
            queue_songs: self.songs_for(&battle.queue_songs)?,
            energy_units: battle.energy_units.units(),
            can_add_song: battle.energy_units.can_add_song(),
            can_pass_song: battle.energy_units.can_pass_song(),
            updated_battle_instance: battle,
        })
    }

    /// Applies a scoring action and returns the committed snapshot.
    pub async fn apply(&self, battle_id: &str, action: &Action) -> BattleResult<BattleInstance> {
        self.mutate(battle_id, action.as_str(), |battle| {
            let mut rng = self.shuffle_rng()?;
            apply_action(battle, action, &mut *rng)
        })
        .await
    }

    /// Handles a mutating request end to end, producing the wire response.
    pub async fn handle(&self, kind: ActionKind, request: &ActionRequest) -> ActionResponse {
        let result = async {
            let action = request.to_action(kind)?;
            let battle = self.apply(&request.battle_instance_id, &action).await?;
            self.view(battle)
        }
        .await;

        if let Err(err) = &result {
            info!(
                battle = %request.battle_instance_id,
                action = kind.as_str(),
                code = err.code(),
                "action rejected: {}",
                err
            );
        }
        ActionResponse::from_result(result)
    }

    /// Marks an active battle abandoned.
    pub async fn abandon(&self, battle_id: &str) -> BattleResult<BattleInstance> {
        self.mutate(battle_id, "abandon", |battle| {
            battle.ensure_active()?;
            let mut next = battle.clone();
            next.status = BattleStatus::Abandoned;
            Ok(next)
        })
        .await
    }
}
