//! File-backed storage adapter: one JSON file per record, id as filename.
//!
//! Layout under the data directory:
//!
//! ```text
//! <root>/dispatches/<dispatch-id>.json
//! <root>/replays/<replay-id>.json
//! <root>/honors/<honor-id>.json
//! ```
//!
//! Appends are serialized per collection by a write lock and land via a
//! `.tmp` write followed by a rename, so an interrupted write never leaves
//! a partial record. A restarted process recovers simply by reading the
//! directory back.

use crate::traits::{DispatchStore, HonorStore, QueryWindow, ReplayStore};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use rite_types::{DispatchId, HonorAward, HonorId, LedgerEntry, Replay, ReplayId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

const DISPATCH_DIR: &str = "dispatches";
const REPLAY_DIR: &str = "replays";
const HONOR_DIR: &str = "honors";

/// File-backed storage adapter rooted at a data directory.
pub struct FileRiteStorage {
    root: PathBuf,
    dispatch_lock: RwLock<()>,
    replay_lock: RwLock<()>,
    honor_lock: RwLock<()>,
}

impl FileRiteStorage {
    /// Open (and create if needed) a store at the given directory.
    pub fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        for dir in [DISPATCH_DIR, REPLAY_DIR, HONOR_DIR] {
            std::fs::create_dir_all(root.join(dir))?;
        }
        debug!(root = %root.display(), "File store opened");
        Ok(Self {
            root,
            dispatch_lock: RwLock::new(()),
            replay_lock: RwLock::new(()),
            honor_lock: RwLock::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, dir: &str, id: &str) -> StorageResult<PathBuf> {
        // Ids are generator-produced, but defend against path traversal in
        // caller-supplied lookups.
        if id.is_empty() || id.contains(['/', '\\', '.']) {
            return Err(StorageError::InvalidInput(format!(
                "malformed identifier: {id}"
            )));
        }
        Ok(self.root.join(dir).join(format!("{id}.json")))
    }

    fn write_new<T: Serialize>(&self, path: &Path, id: &str, record: &T) -> StorageResult<()> {
        if path.exists() {
            return Err(StorageError::Conflict(format!("{id} already exists")));
        }
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    fn read_record<T: DeserializeOwned>(&self, path: &Path) -> StorageResult<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)?;
        let record = serde_json::from_str(&contents)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(Some(record))
    }

    fn read_collection<T: DeserializeOwned>(&self, dir: &str) -> StorageResult<Vec<T>> {
        let mut records = Vec::new();
        for entry in std::fs::read_dir(self.root.join(dir))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(record) = self.read_record(&path)? {
                records.push(record);
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl DispatchStore for FileRiteStorage {
    async fn append_dispatch(&self, entry: LedgerEntry) -> StorageResult<()> {
        let path = self.record_path(DISPATCH_DIR, &entry.dispatch_id.0)?;
        let _guard = self
            .dispatch_lock
            .write()
            .map_err(|_| StorageError::Unavailable("dispatch lock poisoned".to_string()))?;
        self.write_new(&path, &entry.dispatch_id.0, &entry)
    }

    async fn get_dispatch(&self, id: &DispatchId) -> StorageResult<Option<LedgerEntry>> {
        let path = self.record_path(DISPATCH_DIR, &id.0)?;
        self.read_record(&path)
    }

    async fn list_dispatches(&self, window: QueryWindow) -> StorageResult<Vec<LedgerEntry>> {
        let mut entries: Vec<LedgerEntry> = self.read_collection(DISPATCH_DIR)?;
        entries.sort_by(|a, b| a.dispatch_id.0.cmp(&b.dispatch_id.0));
        let iter = entries.into_iter().skip(window.offset);
        Ok(if window.limit == 0 {
            iter.collect()
        } else {
            iter.take(window.limit).collect()
        })
    }
}

#[async_trait]
impl ReplayStore for FileRiteStorage {
    async fn append_replay(&self, replay: Replay) -> StorageResult<()> {
        let path = self.record_path(REPLAY_DIR, &replay.replay_id.0)?;
        let _guard = self
            .replay_lock
            .write()
            .map_err(|_| StorageError::Unavailable("replay lock poisoned".to_string()))?;
        self.write_new(&path, &replay.replay_id.0, &replay)
    }

    async fn get_replay(&self, id: &ReplayId) -> StorageResult<Option<Replay>> {
        let path = self.record_path(REPLAY_DIR, &id.0)?;
        self.read_record(&path)
    }

    async fn list_replays_for(&self, source: &DispatchId) -> StorageResult<Vec<Replay>> {
        let mut replays: Vec<Replay> = self.read_collection(REPLAY_DIR)?;
        replays.retain(|r| &r.source_dispatch_id == source);
        replays.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(replays)
    }
}

#[async_trait]
impl HonorStore for FileRiteStorage {
    async fn append_honor(&self, award: HonorAward) -> StorageResult<()> {
        let path = self.record_path(HONOR_DIR, &award.honor_id.0)?;
        let _guard = self
            .honor_lock
            .write()
            .map_err(|_| StorageError::Unavailable("honor lock poisoned".to_string()))?;
        self.write_new(&path, &award.honor_id.0, &award)
    }

    async fn get_honor(&self, id: &HonorId) -> StorageResult<Option<HonorAward>> {
        let path = self.record_path(HONOR_DIR, &id.0)?;
        self.read_record(&path)
    }

    async fn list_honors(&self, recipient: Option<&str>) -> StorageResult<Vec<HonorAward>> {
        let mut awards: Vec<HonorAward> = self.read_collection(HONOR_DIR)?;
        if let Some(recipient) = recipient {
            awards.retain(|a| a.recipient == recipient);
        }
        awards.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(awards)
    }
}
