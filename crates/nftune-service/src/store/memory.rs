//! In-process store.

use std::collections::BTreeMap;
use std::sync::Mutex;

use nftune_battle::{BattleError, BattleResult};

use super::{check_precondition, check_record_id, Collection, Store, StoredRecord, WritePrecondition};

/// Store backed by a map. Used by tests and by `serve --memory`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<(Collection, String), StoredRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn records(
        &self,
    ) -> BattleResult<std::sync::MutexGuard<'_, BTreeMap<(Collection, String), StoredRecord>>> {
        self.records
            .lock()
            .map_err(|_| BattleError::storage("memory store lock poisoned"))
    }
}

impl Store for MemoryStore {
    fn load_raw(&self, collection: Collection, id: &str) -> BattleResult<Option<StoredRecord>> {
        Ok(self.records()?.get(&(collection, id.to_string())).cloned())
    }

    fn list_raw(&self, collection: Collection) -> BattleResult<Vec<StoredRecord>> {
        Ok(self
            .records()?
            .iter()
            .filter(|((c, _), _)| *c == collection)
            .map(|(_, record)| record.clone())
            .collect())
    }

    fn write_raw(
        &self,
        collection: Collection,
        id: &str,
        record: StoredRecord,
        precondition: WritePrecondition,
    ) -> BattleResult<()> {
        check_record_id(id)?;
        let mut records = self.records()?;
        let key = (collection, id.to_string());
        check_precondition(id, records.get(&key), precondition)?;
        records.insert(key, record);
        Ok(())
    }
}
