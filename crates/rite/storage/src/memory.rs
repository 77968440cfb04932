//! In-memory reference implementation of the Rite storage traits.
//!
//! Deterministic and test-friendly. Durable deployments should use the
//! file-backed adapter (or another backend honoring the same contract).

use crate::traits::{DispatchStore, HonorStore, QueryWindow, ReplayStore};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use rite_types::{DispatchId, HonorAward, HonorId, LedgerEntry, Replay, ReplayId};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage adapter.
#[derive(Default)]
pub struct InMemoryRiteStorage {
    dispatches: RwLock<HashMap<DispatchId, LedgerEntry>>,
    replays: RwLock<HashMap<ReplayId, Replay>>,
    honors: RwLock<HashMap<HonorId, HonorAward>>,
}

impl InMemoryRiteStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DispatchStore for InMemoryRiteStorage {
    async fn append_dispatch(&self, entry: LedgerEntry) -> StorageResult<()> {
        let mut guard = self
            .dispatches
            .write()
            .map_err(|_| StorageError::Unavailable("dispatch lock poisoned".to_string()))?;
        if guard.contains_key(&entry.dispatch_id) {
            return Err(StorageError::Conflict(format!(
                "dispatch {} already exists",
                entry.dispatch_id
            )));
        }
        guard.insert(entry.dispatch_id.clone(), entry);
        Ok(())
    }

    async fn get_dispatch(&self, id: &DispatchId) -> StorageResult<Option<LedgerEntry>> {
        let guard = self
            .dispatches
            .read()
            .map_err(|_| StorageError::Unavailable("dispatch lock poisoned".to_string()))?;
        Ok(guard.get(id).cloned())
    }

    async fn list_dispatches(&self, window: QueryWindow) -> StorageResult<Vec<LedgerEntry>> {
        let guard = self
            .dispatches
            .read()
            .map_err(|_| StorageError::Unavailable("dispatch lock poisoned".to_string()))?;
        let mut values = guard.values().cloned().collect::<Vec<_>>();
        values.sort_by(|a, b| a.dispatch_id.0.cmp(&b.dispatch_id.0));
        Ok(apply_window(values, window))
    }
}

#[async_trait]
impl ReplayStore for InMemoryRiteStorage {
    async fn append_replay(&self, replay: Replay) -> StorageResult<()> {
        let mut guard = self
            .replays
            .write()
            .map_err(|_| StorageError::Unavailable("replay lock poisoned".to_string()))?;
        if guard.contains_key(&replay.replay_id) {
            return Err(StorageError::Conflict(format!(
                "replay {} already exists",
                replay.replay_id
            )));
        }
        guard.insert(replay.replay_id.clone(), replay);
        Ok(())
    }

    async fn get_replay(&self, id: &ReplayId) -> StorageResult<Option<Replay>> {
        let guard = self
            .replays
            .read()
            .map_err(|_| StorageError::Unavailable("replay lock poisoned".to_string()))?;
        Ok(guard.get(id).cloned())
    }

    async fn list_replays_for(&self, source: &DispatchId) -> StorageResult<Vec<Replay>> {
        let guard = self
            .replays
            .read()
            .map_err(|_| StorageError::Unavailable("replay lock poisoned".to_string()))?;
        let mut values = guard
            .values()
            .filter(|r| &r.source_dispatch_id == source)
            .cloned()
            .collect::<Vec<_>>();
        values.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(values)
    }
}

#[async_trait]
impl HonorStore for InMemoryRiteStorage {
    async fn append_honor(&self, award: HonorAward) -> StorageResult<()> {
        let mut guard = self
            .honors
            .write()
            .map_err(|_| StorageError::Unavailable("honor lock poisoned".to_string()))?;
        if guard.contains_key(&award.honor_id) {
            return Err(StorageError::Conflict(format!(
                "honor {} already exists",
                award.honor_id
            )));
        }
        guard.insert(award.honor_id.clone(), award);
        Ok(())
    }

    async fn get_honor(&self, id: &HonorId) -> StorageResult<Option<HonorAward>> {
        let guard = self
            .honors
            .read()
            .map_err(|_| StorageError::Unavailable("honor lock poisoned".to_string()))?;
        Ok(guard.get(id).cloned())
    }

    async fn list_honors(&self, recipient: Option<&str>) -> StorageResult<Vec<HonorAward>> {
        let guard = self
            .honors
            .read()
            .map_err(|_| StorageError::Unavailable("honor lock poisoned".to_string()))?;
        let mut values = guard
            .values()
            .filter(|award| recipient.map_or(true, |r| award.recipient == r))
            .cloned()
            .collect::<Vec<_>>();
        values.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(values)
    }
}

fn apply_window<T>(items: Vec<T>, window: QueryWindow) -> Vec<T> {
    let iter = items.into_iter().skip(window.offset);
    if window.limit == 0 {
        iter.collect()
    } else {
        iter.take(window.limit).collect()
    }
}
