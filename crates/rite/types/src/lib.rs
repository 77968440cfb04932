//! Rite Types - the shared data model of the dispatch ledger.
//!
//! Everything persisted or crossing the service boundary lives here:
//! identifiers, seal levels, ledger entries, replays, and honor awards.

#![deny(unsafe_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DispatchId(pub String);
impl DispatchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}
impl std::fmt::Display for DispatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplayId(pub String);
impl ReplayId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}
impl std::fmt::Display for ReplayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HonorId(pub String);
impl HonorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}
impl std::fmt::Display for HonorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered governance strength. Derived ordering is the authority ordering:
/// `Temporal < Eternal < Immutable < Sacred`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SealLevel {
    Temporal,
    Eternal,
    Immutable,
    Sacred,
}

impl SealLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SealLevel::Temporal => "temporal",
            SealLevel::Eternal => "eternal",
            SealLevel::Immutable => "immutable",
            SealLevel::Sacred => "sacred",
        }
    }
}

impl std::fmt::Display for SealLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Governance stamp fixed at commit time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceStamp {
    pub seal_level: SealLevel,
    pub audit_required: bool,
}

/// Advisory back-reference from one record to another. Directed and acyclic
/// by convention only; never validated at write time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryLink {
    Dispatch(DispatchId),
    Replay(ReplayId),
}

/// The atomic unit of record. Immutable once committed; corrections are new
/// entries carrying a `links` back-reference.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub dispatch_id: DispatchId,
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub realm: String,
    pub capsule: String,
    pub intent: String,
    pub input: Value,
    pub output: Value,
    pub governance: GovernanceStamp,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<EntryLink>,
    pub content_hash: String,
}

impl LedgerEntry {
    /// Recompute the blake3 digest over the immutable fields.
    ///
    /// The digest is taken over a canonical JSON value so that field order
    /// in storage never changes the hash.
    pub fn compute_hash(&self) -> Result<String, HashError> {
        compute_entry_hash(
            &self.dispatch_id,
            self.timestamp,
            &self.actor,
            &self.realm,
            &self.capsule,
            &self.intent,
            &self.input,
            &self.output,
            &self.governance,
            &self.links,
        )
    }

    /// Whether the stored `content_hash` still matches the entry's fields.
    pub fn verify_hash(&self) -> Result<bool, HashError> {
        Ok(self.compute_hash()? == self.content_hash)
    }
}

/// Hash the immutable fields of a ledger entry before the entry itself
/// exists, so the hash can be embedded at construction time.
#[allow(clippy::too_many_arguments)]
pub fn compute_entry_hash(
    dispatch_id: &DispatchId,
    timestamp: DateTime<Utc>,
    actor: &str,
    realm: &str,
    capsule: &str,
    intent: &str,
    input: &Value,
    output: &Value,
    governance: &GovernanceStamp,
    links: &[EntryLink],
) -> Result<String, HashError> {
    let canonical = serde_json::json!({
        "dispatch_id": dispatch_id.0,
        "timestamp": timestamp,
        "actor": actor,
        "realm": realm,
        "capsule": capsule,
        "intent": intent,
        "input": input,
        "output": output,
        "governance": governance,
        "links": links,
    });
    let serialized =
        serde_json::to_vec(&canonical).map_err(|e| HashError::Serialization(e.to_string()))?;
    Ok(blake3::hash(&serialized).to_hex().to_string())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayStatus {
    Verified,
    Inconsistent,
}

/// Consistency verdict attached to a replay.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplayAudit {
    pub status: ReplayStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// Derived record re-verifying a prior dispatch. Generating one never
/// mutates the source entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Replay {
    pub replay_id: ReplayId,
    pub source_dispatch_id: DispatchId,
    pub timestamp: DateTime<Utc>,
    pub audit: ReplayAudit,
}

/// Immutable award record, keyed by recipient.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HonorAward {
    pub honor_id: HonorId,
    pub recipient: String,
    pub achievement: String,
    pub seal_level: SealLevel,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verification_refs: Vec<String>,
}

/// Hashing errors.
#[derive(Debug, Error)]
pub enum HashError {
    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> LedgerEntry {
        let mut entry = LedgerEntry {
            dispatch_id: DispatchId::new("RITE-2026-01-05-0a1b2c3d"),
            timestamp: Utc::now(),
            actor: "Custodian".to_string(),
            realm: "Planetary:Jackson-NC".to_string(),
            capsule: "SovereignCrown".to_string(),
            intent: "Reasoning.Replay.Audit".to_string(),
            input: serde_json::json!({"prompt": "test"}),
            output: serde_json::json!({"summary": "ok"}),
            governance: GovernanceStamp {
                seal_level: SealLevel::Eternal,
                audit_required: false,
            },
            links: vec![],
            content_hash: String::new(),
        };
        entry.content_hash = entry.compute_hash().unwrap();
        entry
    }

    #[test]
    fn seal_levels_are_ordered_by_authority() {
        assert!(SealLevel::Temporal < SealLevel::Eternal);
        assert!(SealLevel::Eternal < SealLevel::Immutable);
        assert!(SealLevel::Immutable < SealLevel::Sacred);
    }

    #[test]
    fn seal_level_serializes_lowercase() {
        let serialized = serde_json::to_string(&SealLevel::Sacred).unwrap();
        assert_eq!(serialized, "\"sacred\"");
        let parsed: SealLevel = serde_json::from_str("\"temporal\"").unwrap();
        assert_eq!(parsed, SealLevel::Temporal);
    }

    #[test]
    fn content_hash_is_stable_across_recomputation() {
        let entry = sample_entry();
        assert_eq!(entry.compute_hash().unwrap(), entry.content_hash);
        assert!(entry.verify_hash().unwrap());
    }

    #[test]
    fn content_hash_detects_field_mutation() {
        let mut entry = sample_entry();
        entry.intent = "Reasoning.Replay.Tampered".to_string();
        assert!(!entry.verify_hash().unwrap());
    }

    #[test]
    fn entry_round_trips_through_json() {
        let entry = sample_entry();
        let json = serde_json::to_string(&entry).unwrap();
        let back: LedgerEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.dispatch_id, entry.dispatch_id);
        assert_eq!(back.content_hash, entry.content_hash);
        assert!(back.verify_hash().unwrap());
    }
}
