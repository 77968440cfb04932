//! Rite Replay - derived replay records over the dispatch ledger.
//!
//! A replay reads a committed dispatch, re-derives its consistency verdict
//! against the current registry, and persists a new, separately-identified
//! record referencing the source. The source entry is never mutated.
//! Replaying the same dispatch repeatedly is safe: each call adds a new
//! replay record and, under an unchanged registry, re-derives the same
//! verdict.

#![deny(unsafe_code)]

use chrono::Utc;
use rite_audit::{assess_entry, AuditError};
use rite_idgen::IdGenerator;
use rite_ledger::{DispatchLedger, LedgerError};
use rite_registry::RegistryStore;
use rite_storage::{ReplayStore, StorageError};
use rite_types::{DispatchId, Replay, ReplayAudit, ReplayId, ReplayStatus};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// The replay generator.
pub struct ReplayGenerator {
    registry: Arc<RegistryStore>,
    ledger: Arc<DispatchLedger>,
    replays: Arc<dyn ReplayStore>,
    ids: Arc<IdGenerator>,
}

impl ReplayGenerator {
    pub fn new(
        registry: Arc<RegistryStore>,
        ledger: Arc<DispatchLedger>,
        replays: Arc<dyn ReplayStore>,
        ids: Arc<IdGenerator>,
    ) -> Self {
        Self {
            registry,
            ledger,
            replays,
            ids,
        }
    }

    /// Produce and persist a replay of a committed dispatch.
    pub async fn replay(&self, source: &DispatchId) -> Result<Replay, ReplayError> {
        let entry = self
            .ledger
            .get(source)
            .await?
            .ok_or_else(|| ReplayError::SourceNotFound(source.0.clone()))?;

        let report = assess_entry(&self.registry, &entry)?;
        let status = if report.consistent {
            ReplayStatus::Verified
        } else {
            ReplayStatus::Inconsistent
        };

        let replay = Replay {
            replay_id: self.ids.next_replay(),
            source_dispatch_id: entry.dispatch_id.clone(),
            timestamp: Utc::now(),
            audit: ReplayAudit {
                status,
                notes: report.notes,
            },
        };

        self.replays.append_replay(replay.clone()).await?;
        info!(
            replay_id = %replay.replay_id,
            source = %replay.source_dispatch_id,
            status = ?replay.audit.status,
            "Replay recorded"
        );
        Ok(replay)
    }

    /// Fetch a previously generated replay.
    pub async fn get(&self, id: &ReplayId) -> Result<Option<Replay>, ReplayError> {
        Ok(self.replays.get_replay(id).await?)
    }

    /// All replays of one source dispatch, oldest first.
    pub async fn history(&self, source: &DispatchId) -> Result<Vec<Replay>, ReplayError> {
        Ok(self.replays.list_replays_for(source).await?)
    }
}

/// Replay-related errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("source dispatch not found: {0}")]
    SourceNotFound(String),

    #[error("audit error: {0}")]
    Audit(#[from] AuditError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
