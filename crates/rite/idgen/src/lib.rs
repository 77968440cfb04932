//! Rite Idgen - identifier generation for the dispatch ledger.
//!
//! Identifiers follow the literal pattern `PREFIX-YYYY-MM-DD-XXXXXXXX`:
//! a namespace prefix, the UTC date of creation, and eight hex characters
//! of entropy. The date segment keeps ids lexically sortable by day; the
//! suffix makes collisions negligible under concurrent callers. Stored data
//! depends on this format, so it must not change.

#![deny(unsafe_code)]

use chrono::{NaiveDate, Utc};
use rand::Rng;
use rite_types::{DispatchId, HonorId, ReplayId};

/// Identifier namespaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdKind {
    Dispatch,
    Replay,
    Honor,
}

impl IdKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            IdKind::Dispatch => "RITE",
            IdKind::Replay => "RPLY",
            IdKind::Honor => "HNR",
        }
    }
}

/// Generator for dispatch, replay, and honor identifiers.
///
/// Generation is infallible: the thread-local RNG aborts the process if the
/// OS entropy source is unavailable, which is the intended failure mode.
#[derive(Debug, Default)]
pub struct IdGenerator {
    // Fixed date for deterministic tests; None means "today, UTC".
    fixed_date: Option<NaiveDate>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the date segment, for tests that assert on full identifiers.
    pub fn with_date(date: NaiveDate) -> Self {
        Self {
            fixed_date: Some(date),
        }
    }

    /// Produce the next identifier in the given namespace.
    pub fn next(&self, kind: IdKind) -> String {
        let date = self
            .fixed_date
            .unwrap_or_else(|| Utc::now().date_naive());
        let suffix: u32 = rand::thread_rng().gen();
        format!("{}-{}-{:08x}", kind.prefix(), date.format("%Y-%m-%d"), suffix)
    }

    pub fn next_dispatch(&self) -> DispatchId {
        DispatchId::new(self.next(IdKind::Dispatch))
    }

    pub fn next_replay(&self) -> ReplayId {
        ReplayId::new(self.next(IdKind::Replay))
    }

    pub fn next_honor(&self) -> HonorId {
        HonorId::new(self.next(IdKind::Honor))
    }
}
