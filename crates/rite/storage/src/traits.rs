use crate::StorageResult;
use async_trait::async_trait;
use rite_types::{DispatchId, HonorAward, HonorId, LedgerEntry, Replay, ReplayId};

/// Generic query window for paged reads. A limit of zero means unbounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryWindow {
    pub limit: usize,
    pub offset: usize,
}

/// Storage interface for append-only dispatch entries.
#[async_trait]
pub trait DispatchStore: Send + Sync {
    /// Append a committed entry. Fails with `Conflict` if the identifier
    /// already exists; entries are never mutated or deleted.
    async fn append_dispatch(&self, entry: LedgerEntry) -> StorageResult<()>;

    /// Get one entry by dispatch identifier.
    async fn get_dispatch(&self, id: &DispatchId) -> StorageResult<Option<LedgerEntry>>;

    /// List entries ordered by identifier (and therefore by date prefix).
    async fn list_dispatches(&self, window: QueryWindow) -> StorageResult<Vec<LedgerEntry>>;
}

/// Storage interface for derived replay records.
#[async_trait]
pub trait ReplayStore: Send + Sync {
    async fn append_replay(&self, replay: Replay) -> StorageResult<()>;

    async fn get_replay(&self, id: &ReplayId) -> StorageResult<Option<Replay>>;

    /// All replays referencing one source dispatch, oldest first.
    async fn list_replays_for(&self, source: &DispatchId) -> StorageResult<Vec<Replay>>;
}

/// Storage interface for honor awards.
#[async_trait]
pub trait HonorStore: Send + Sync {
    async fn append_honor(&self, award: HonorAward) -> StorageResult<()>;

    async fn get_honor(&self, id: &HonorId) -> StorageResult<Option<HonorAward>>;

    /// Awards ordered by timestamp ascending, optionally filtered by
    /// recipient.
    async fn list_honors(&self, recipient: Option<&str>) -> StorageResult<Vec<HonorAward>>;
}

/// Unified storage bundle consumed by the service facade.
pub trait RiteStorage: DispatchStore + ReplayStore + HonorStore + Send + Sync {}

impl<T> RiteStorage for T where T: DispatchStore + ReplayStore + HonorStore + Send + Sync {}
