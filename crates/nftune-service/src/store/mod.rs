//! Persistence for battles and their supporting records.
//!
//! Backends implement the untyped [`Store`] trait over JSON payloads; callers
//! use the typed helpers in [`StoreExt`]. Every write carries a
//! [`WritePrecondition`] so read-modify-write cycles can detect concurrent
//! writers (compare-and-swap on the record version).

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use std::sync::OnceLock;

use nftune_battle::{
    BattleError, BattleInstance, BattleResult, GalleryPlaylist, PlaylistPrompt, Song, User,
};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A group of records of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    /// Battle instances.
    Battles,
    /// Song catalogue.
    Songs,
    /// Players.
    Users,
    /// Playlist prompts.
    Prompts,
    /// Submitted playlists.
    Gallery,
}

impl Collection {
    /// Directory / key prefix for the collection.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Battles => "battles",
            Collection::Songs => "songs",
            Collection::Users => "users",
            Collection::Prompts => "prompts",
            Collection::Gallery => "gallery",
        }
    }

    /// All collections.
    pub fn all() -> &'static [Collection] {
        &[
            Collection::Battles,
            Collection::Songs,
            Collection::Users,
            Collection::Prompts,
            Collection::Gallery,
        ]
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condition a write must satisfy against the currently stored version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePrecondition {
    /// The record must not exist yet.
    Absent,
    /// Overwrite whatever is stored.
    Any,
    /// The stored record must have exactly this version.
    Version(u64),
}

/// Raw stored payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    /// Record version (0 for unversioned kinds).
    pub version: u64,
    /// JSON payload.
    pub json: String,
}

/// Untyped storage backend.
pub trait Store: Send + Sync {
    /// Loads a record, or `None` if it does not exist.
    fn load_raw(&self, collection: Collection, id: &str) -> BattleResult<Option<StoredRecord>>;

    /// Loads every record of a collection, ordered by id.
    fn list_raw(&self, collection: Collection) -> BattleResult<Vec<StoredRecord>>;

    /// Writes a record if `precondition` holds, atomically with the check.
    fn write_raw(
        &self,
        collection: Collection,
        id: &str,
        record: StoredRecord,
        precondition: WritePrecondition,
    ) -> BattleResult<()>;
}

/// A record kind the store knows how to place.
pub trait Record: Serialize + DeserializeOwned {
    /// Collection the kind lives in.
    const COLLECTION: Collection;
    /// Label used in not-found errors.
    const KIND: &'static str;

    /// Record identifier.
    fn record_id(&self) -> &str;

    /// Record version; unversioned kinds return 0.
    fn record_version(&self) -> u64 {
        0
    }
}

impl Record for BattleInstance {
    const COLLECTION: Collection = Collection::Battles;
    const KIND: &'static str = "battle";

    fn record_id(&self) -> &str {
        &self.id
    }

    fn record_version(&self) -> u64 {
        self.version
    }
}

impl Record for Song {
    const COLLECTION: Collection = Collection::Songs;
    const KIND: &'static str = "song";

    fn record_id(&self) -> &str {
        self.id.as_str()
    }
}

impl Record for User {
    const COLLECTION: Collection = Collection::Users;
    const KIND: &'static str = "user";

    fn record_id(&self) -> &str {
        &self.id
    }
}

impl Record for PlaylistPrompt {
    const COLLECTION: Collection = Collection::Prompts;
    const KIND: &'static str = "prompt";

    fn record_id(&self) -> &str {
        &self.id
    }
}

impl Record for GalleryPlaylist {
    const COLLECTION: Collection = Collection::Gallery;
    const KIND: &'static str = "gallery playlist";

    fn record_id(&self) -> &str {
        &self.id
    }
}

/// Typed helpers over any [`Store`].
pub trait StoreExt: Store {
    /// Loads a typed record.
    fn get<R: Record>(&self, id: &str) -> BattleResult<Option<R>> {
        match self.load_raw(R::COLLECTION, id)? {
            Some(stored) => Ok(Some(serde_json::from_str(&stored.json)?)),
            None => Ok(None),
        }
    }

    /// Loads a typed record, failing with `NotFound`.
    fn require<R: Record>(&self, id: &str) -> BattleResult<R> {
        self.get::<R>(id)?
            .ok_or_else(|| BattleError::not_found(R::KIND, id))
    }

    /// Loads every record of a kind.
    fn all<R: Record>(&self) -> BattleResult<Vec<R>> {
        self.list_raw(R::COLLECTION)?
            .iter()
            .map(|stored| serde_json::from_str(&stored.json).map_err(BattleError::from))
            .collect()
    }

    /// Creates a record that must not exist yet.
    fn insert<R: Record>(&self, record: &R) -> BattleResult<()> {
        self.write(record, WritePrecondition::Absent)
    }

    /// Creates or overwrites a record.
    fn put<R: Record>(&self, record: &R) -> BattleResult<()> {
        self.write(record, WritePrecondition::Any)
    }

    /// Replaces a record only if its stored version is still `expected_version`.
    fn compare_and_swap<R: Record>(&self, expected_version: u64, record: &R) -> BattleResult<()> {
        self.write(record, WritePrecondition::Version(expected_version))
    }

    /// Serializes and writes a record.
    fn write<R: Record>(&self, record: &R, precondition: WritePrecondition) -> BattleResult<()> {
        let stored = StoredRecord {
            version: record.record_version(),
            json: serde_json::to_string_pretty(record)?,
        };
        self.write_raw(R::COLLECTION, record.record_id(), stored, precondition)
    }
}

impl<S: Store + ?Sized> StoreExt for S {}

const RECORD_ID_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9_-]{0,127}$";

static RECORD_ID_REGEX: OnceLock<Regex> = OnceLock::new();

fn record_id_regex() -> &'static Regex {
    RECORD_ID_REGEX.get_or_init(|| Regex::new(RECORD_ID_PATTERN).expect("invalid regex pattern"))
}

/// Validates a record id: 1-128 chars, `[A-Za-z0-9_-]`, alphanumeric first.
///
/// Ids double as file names in [`JsonFileStore`], so anything that could
/// escape the collection directory is rejected.
pub fn is_valid_record_id(id: &str) -> bool {
    record_id_regex().is_match(id)
}

pub(crate) fn check_record_id(id: &str) -> BattleResult<()> {
    if is_valid_record_id(id) {
        Ok(())
    } else {
        Err(BattleError::invalid_request(format!("invalid record id '{}'", id)))
    }
}

/// Checks `precondition` against the currently stored record.
pub(crate) fn check_precondition(
    id: &str,
    current: Option<&StoredRecord>,
    precondition: WritePrecondition,
) -> BattleResult<()> {
    match (precondition, current) {
        (WritePrecondition::Any, _) => Ok(()),
        (WritePrecondition::Absent, None) => Ok(()),
        (WritePrecondition::Absent, Some(existing)) => Err(BattleError::PersistenceConflict {
            id: id.to_string(),
            expected: 0,
            found: existing.version,
        }),
        (WritePrecondition::Version(expected), Some(existing)) if existing.version == expected => {
            Ok(())
        }
        (WritePrecondition::Version(expected), Some(existing)) => {
            Err(BattleError::PersistenceConflict {
                id: id.to_string(),
                expected,
                found: existing.version,
            })
        }
        (WritePrecondition::Version(_), None) => Err(BattleError::not_found("record", id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_ids() {
        assert!(is_valid_record_id("btl-0123abcd"));
        assert!(is_valid_record_id("song_1"));
        assert!(!is_valid_record_id(""));
        assert!(!is_valid_record_id("../etc/passwd"));
        assert!(!is_valid_record_id("-leading"));
        assert!(!is_valid_record_id("a/b"));
        assert!(!is_valid_record_id(&"x".repeat(129)));
    }

    #[test]
    fn test_preconditions() {
        let stored = StoredRecord {
            version: 3,
            json: "{}".into(),
        };
        assert!(check_precondition("b1", None, WritePrecondition::Absent).is_ok());
        assert!(check_precondition("b1", Some(&stored), WritePrecondition::Absent).is_err());
        assert!(check_precondition("b1", Some(&stored), WritePrecondition::Version(3)).is_ok());

        let err =
            check_precondition("b1", Some(&stored), WritePrecondition::Version(2)).unwrap_err();
        assert_eq!(
            err,
            BattleError::PersistenceConflict {
                id: "b1".into(),
                expected: 2,
                found: 3
            }
        );
        assert_eq!(
            check_precondition("b1", None, WritePrecondition::Version(0))
                .unwrap_err()
                .code(),
            "BTL_005"
        );
    }
}
