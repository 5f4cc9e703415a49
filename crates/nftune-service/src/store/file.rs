//! JSON-file store.
//!
//! Layout: one directory per collection, one pretty-printed JSON file per
//! record.
//!
//! ```text
//! <root>/battles/<id>.json
//! <root>/songs/<id>.json
//! <root>/.../.lock
//! ```
//!
//! Writes take an exclusive advisory lock on the collection's `.lock` file,
//! check the precondition against the file on disk and replace it through a
//! temp file + rename, so readers never observe a half-written record.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use nftune_battle::{BattleError, BattleResult};
use tempfile::NamedTempFile;

use super::{check_precondition, check_record_id, Collection, Store, StoredRecord, WritePrecondition};

const LOCK_FILE: &str = ".lock";
const RECORD_EXT: &str = "json";

/// Store that keeps each record in its own JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Opens (and creates if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> BattleResult<Self> {
        let root = root.into();
        for collection in Collection::all() {
            fs::create_dir_all(root.join(collection.as_str())).map_err(|e| {
                BattleError::storage(format!(
                    "failed to create store directory {}: {}",
                    root.join(collection.as_str()).display(),
                    e
                ))
            })?;
        }
        Ok(Self { root })
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.as_str())
    }

    fn record_path(&self, collection: Collection, id: &str) -> PathBuf {
        self.collection_dir(collection)
            .join(format!("{}.{}", id, RECORD_EXT))
    }

    fn lock_collection(&self, collection: Collection) -> BattleResult<File> {
        let path = self.collection_dir(collection).join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;
        file.lock_exclusive()
            .map_err(|e| BattleError::storage(format!("failed to lock {}: {}", path.display(), e)))?;
        Ok(file)
    }

    fn read_record(path: &Path) -> BattleResult<Option<StoredRecord>> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(BattleError::storage(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        let version = stored_version(&json)?;
        Ok(Some(StoredRecord { version, json }))
    }
}

/// Reads the `version` field of a stored payload (0 when absent).
fn stored_version(json: &str) -> BattleResult<u64> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    Ok(value.get("version").and_then(|v| v.as_u64()).unwrap_or(0))
}

impl Store for JsonFileStore {
    fn load_raw(&self, collection: Collection, id: &str) -> BattleResult<Option<StoredRecord>> {
        check_record_id(id)?;
        Self::read_record(&self.record_path(collection, id))
    }

    fn list_raw(&self, collection: Collection) -> BattleResult<Vec<StoredRecord>> {
        let dir = self.collection_dir(collection);
        let mut paths = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(RECORD_EXT) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            if let Some(record) = Self::read_record(&path)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn write_raw(
        &self,
        collection: Collection,
        id: &str,
        record: StoredRecord,
        precondition: WritePrecondition,
    ) -> BattleResult<()> {
        check_record_id(id)?;
        let _lock = self.lock_collection(collection)?;

        let path = self.record_path(collection, id);
        let current = Self::read_record(&path)?;
        check_precondition(id, current.as_ref(), precondition)?;

        let mut tmp = NamedTempFile::new_in(self.collection_dir(collection))?;
        tmp.write_all(record.json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path)
            .map_err(|e| BattleError::storage(format!("failed to persist {}: {}", path.display(), e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreExt;
    use nftune_battle::{BattleInstance, GalleryPlaylist, RandomSeed};
    use tempfile::TempDir;

    fn battle(id: &str) -> BattleInstance {
        BattleInstance::builder(id, RandomSeed::parse("0x12ab").unwrap())
            .user("u1")
            .prompt("p1")
            .queue(["s1", "s2"])
            .build()
    }

    #[test]
    fn test_open_creates_layout() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::open(tmp.path().join("store")).unwrap();
        for collection in Collection::all() {
            assert!(store.root().join(collection.as_str()).is_dir());
        }
    }

    #[test]
    fn test_records_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        let original = battle("b1");
        {
            let store = JsonFileStore::open(tmp.path()).unwrap();
            store.insert(&original).unwrap();
        }

        let store = JsonFileStore::open(tmp.path()).unwrap();
        let loaded: BattleInstance = store.require("b1").unwrap();
        assert_eq!(loaded, original);
        assert!(tmp.path().join("battles").join("b1.json").is_file());
    }

    #[test]
    fn test_compare_and_swap_on_disk() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::open(tmp.path()).unwrap();
        let original = battle("b1");
        store.insert(&original).unwrap();

        let mut first = original.clone();
        first.energy_units = nftune_battle::Energy::new(10);
        first.touch(chrono::Utc::now());
        store.compare_and_swap(0, &first).unwrap();

        let mut second = original.clone();
        second.touch(chrono::Utc::now());
        let err = store.compare_and_swap(0, &second).unwrap_err();
        assert_eq!(err.code(), "BTL_007");

        let loaded: BattleInstance = store.require("b1").unwrap();
        assert_eq!(loaded.energy_units.units(), 10);
        assert_eq!(loaded.version, 1);
    }

    #[test]
    fn test_list_ignores_foreign_files() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::open(tmp.path()).unwrap();
        store.insert(&battle("b1")).unwrap();
        store.insert(&battle("b2")).unwrap();
        fs::write(tmp.path().join("battles").join("notes.txt"), "hi").unwrap();

        let all: Vec<BattleInstance> = store.all().unwrap();
        let ids: Vec<&str> = all.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b2"]);
        assert!(store.all::<GalleryPlaylist>().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_record_is_storage_error() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::open(tmp.path()).unwrap();
        fs::write(tmp.path().join("battles").join("b1.json"), "{not json").unwrap();

        let err = store.get::<BattleInstance>("b1").unwrap_err();
        assert_eq!(err.code(), "BTL_013");
    }

    #[test]
    fn test_rejects_path_traversal() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::open(tmp.path()).unwrap();
        let err = store.get::<BattleInstance>("../../etc/passwd").unwrap_err();
        assert_eq!(err.code(), "BTL_012");
    }
}
