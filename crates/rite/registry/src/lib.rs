//! Rite Registry - the governance registry consulted by every write path.
//!
//! Holds named actors, capsules (action categories), and realms
//! (jurisdictions), each carrying seal-level constraints and an active flag.
//! The registry is read-mostly: dispatch, replay, audit, and honor
//! operations only ever read it. Mutation happens through the
//! administrative surface (`register_*`, `deactivate_*`) or by replacing
//! the whole snapshot via `reload`.

#![deny(unsafe_code)]

use rite_types::SealLevel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use thiserror::Error;
use tracing::info;

/// A principal permitted to submit dispatches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub max_seal_level: SealLevel,
    pub active: bool,
}

/// A named category of action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capsule {
    pub name: String,
    pub min_seal_level: SealLevel,
    pub audit_required: bool,
    pub active: bool,
}

/// A named jurisdiction tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Realm {
    pub name: String,
    pub scope: String,
    pub active: bool,
}

/// Declarative registry contents, loadable from a JSON document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    #[serde(default)]
    pub actors: Vec<Actor>,
    #[serde(default)]
    pub capsules: Vec<Capsule>,
    #[serde(default)]
    pub realms: Vec<Realm>,
}

/// How a realm name relates to the registry. Unregistered names are
/// accepted as freeform tags by policy; only a deactivated registered
/// realm rejects dispatches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RealmStatus {
    Unregistered,
    Active,
    Inactive,
}

struct RegistryState {
    actors: HashMap<String, Actor>,
    capsules: HashMap<String, Capsule>,
    realms: HashMap<String, Realm>,
}

impl RegistryState {
    fn from_snapshot(snapshot: RegistrySnapshot) -> Self {
        Self {
            actors: snapshot
                .actors
                .into_iter()
                .map(|a| (a.name.clone(), a))
                .collect(),
            capsules: snapshot
                .capsules
                .into_iter()
                .map(|c| (c.name.clone(), c))
                .collect(),
            realms: snapshot
                .realms
                .into_iter()
                .map(|r| (r.name.clone(), r))
                .collect(),
        }
    }
}

/// Registry store for actors, capsules, and realms.
pub struct RegistryStore {
    state: RwLock<RegistryState>,
}

impl RegistryStore {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::from_snapshot(RegistrySnapshot::default())
    }

    /// Create a registry from a snapshot.
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Self {
        Self {
            state: RwLock::new(RegistryState::from_snapshot(snapshot)),
        }
    }

    /// Load a registry from a JSON snapshot file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| RegistryError::Io(e.to_string()))?;
        let snapshot: RegistrySnapshot = serde_json::from_str(&contents)
            .map_err(|e| RegistryError::Parse(e.to_string()))?;
        info!(
            path = %path.as_ref().display(),
            actors = snapshot.actors.len(),
            capsules = snapshot.capsules.len(),
            realms = snapshot.realms.len(),
            "Registry snapshot loaded"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    /// Replace the registry contents wholesale.
    pub fn reload(&self, snapshot: RegistrySnapshot) -> Result<(), RegistryError> {
        let mut state = self.state.write().map_err(|_| RegistryError::LockError)?;
        *state = RegistryState::from_snapshot(snapshot);
        info!(
            actors = state.actors.len(),
            capsules = state.capsules.len(),
            realms = state.realms.len(),
            "Registry reloaded"
        );
        Ok(())
    }

    /// Export the current contents as a snapshot.
    pub fn snapshot(&self) -> Result<RegistrySnapshot, RegistryError> {
        let state = self.state.read().map_err(|_| RegistryError::LockError)?;
        Ok(RegistrySnapshot {
            actors: state.actors.values().cloned().collect(),
            capsules: state.capsules.values().cloned().collect(),
            realms: state.realms.values().cloned().collect(),
        })
    }

    pub fn get_actor(&self, name: &str) -> Result<Option<Actor>, RegistryError> {
        let state = self.state.read().map_err(|_| RegistryError::LockError)?;
        Ok(state.actors.get(name).cloned())
    }

    pub fn get_capsule(&self, name: &str) -> Result<Option<Capsule>, RegistryError> {
        let state = self.state.read().map_err(|_| RegistryError::LockError)?;
        Ok(state.capsules.get(name).cloned())
    }

    pub fn get_realm(&self, name: &str) -> Result<Option<Realm>, RegistryError> {
        let state = self.state.read().map_err(|_| RegistryError::LockError)?;
        Ok(state.realms.get(name).cloned())
    }

    /// Whether a realm name may be attached to a new dispatch.
    pub fn realm_status(&self, name: &str) -> Result<RealmStatus, RegistryError> {
        Ok(match self.get_realm(name)? {
            None => RealmStatus::Unregistered,
            Some(realm) if realm.active => RealmStatus::Active,
            Some(_) => RealmStatus::Inactive,
        })
    }

    /// The governance predicate: both parties active, and the requested
    /// seal level within `capsule.min ..= actor.max`.
    pub fn is_permitted(
        &self,
        actor_name: &str,
        capsule_name: &str,
        requested: SealLevel,
    ) -> Result<bool, RegistryError> {
        let state = self.state.read().map_err(|_| RegistryError::LockError)?;
        let (Some(actor), Some(capsule)) = (
            state.actors.get(actor_name),
            state.capsules.get(capsule_name),
        ) else {
            return Ok(false);
        };
        Ok(actor.active
            && capsule.active
            && actor.max_seal_level >= requested
            && requested >= capsule.min_seal_level)
    }

    // ---- administrative surface ----

    /// Insert or replace an actor definition.
    pub fn register_actor(&self, actor: Actor) -> Result<(), RegistryError> {
        let mut state = self.state.write().map_err(|_| RegistryError::LockError)?;
        state.actors.insert(actor.name.clone(), actor);
        Ok(())
    }

    pub fn register_capsule(&self, capsule: Capsule) -> Result<(), RegistryError> {
        let mut state = self.state.write().map_err(|_| RegistryError::LockError)?;
        state.capsules.insert(capsule.name.clone(), capsule);
        Ok(())
    }

    pub fn register_realm(&self, realm: Realm) -> Result<(), RegistryError> {
        let mut state = self.state.write().map_err(|_| RegistryError::LockError)?;
        state.realms.insert(realm.name.clone(), realm);
        Ok(())
    }

    /// Deactivate an actor. Committed history is untouched; later audits
    /// of their dispatches will report governance drift.
    pub fn deactivate_actor(&self, name: &str) -> Result<(), RegistryError> {
        let mut state = self.state.write().map_err(|_| RegistryError::LockError)?;
        let actor = state
            .actors
            .get_mut(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        actor.active = false;
        info!(actor = name, "Actor deactivated");
        Ok(())
    }

    pub fn deactivate_capsule(&self, name: &str) -> Result<(), RegistryError> {
        let mut state = self.state.write().map_err(|_| RegistryError::LockError)?;
        let capsule = state
            .capsules
            .get_mut(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        capsule.active = false;
        info!(capsule = name, "Capsule deactivated");
        Ok(())
    }

    pub fn deactivate_realm(&self, name: &str) -> Result<(), RegistryError> {
        let mut state = self.state.write().map_err(|_| RegistryError::LockError)?;
        let realm = state
            .realms
            .get_mut(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        realm.active = false;
        info!(realm = name, "Realm deactivated");
        Ok(())
    }
}

impl Default for RegistryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry-related errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("not found in registry: {0}")]
    NotFound(String),

    #[error("snapshot parse error: {0}")]
    Parse(String),

    #[error("snapshot io error: {0}")]
    Io(String),

    #[error("lock error")]
    LockError,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> RegistryStore {
        RegistryStore::from_snapshot(RegistrySnapshot {
            actors: vec![Actor {
                name: "Custodian".to_string(),
                max_seal_level: SealLevel::Eternal,
                active: true,
            }],
            capsules: vec![Capsule {
                name: "SovereignCrown".to_string(),
                min_seal_level: SealLevel::Temporal,
                audit_required: false,
                active: true,
            }],
            realms: vec![Realm {
                name: "Planetary:Jackson-NC".to_string(),
                scope: "Planetary".to_string(),
                active: true,
            }],
        })
    }

    #[test]
    fn lookup_returns_registered_entities() {
        let registry = seeded();
        assert!(registry.get_actor("Custodian").unwrap().is_some());
        assert!(registry.get_capsule("SovereignCrown").unwrap().is_some());
        assert!(registry.get_actor("GhostUser").unwrap().is_none());
    }

    #[test]
    fn permission_respects_the_seal_window() {
        let registry = seeded();
        assert!(registry
            .is_permitted("Custodian", "SovereignCrown", SealLevel::Temporal)
            .unwrap());
        assert!(registry
            .is_permitted("Custodian", "SovereignCrown", SealLevel::Eternal)
            .unwrap());
        // Above the actor's maximum.
        assert!(!registry
            .is_permitted("Custodian", "SovereignCrown", SealLevel::Sacred)
            .unwrap());
    }

    #[test]
    fn permission_fails_below_capsule_minimum() {
        let registry = seeded();
        registry
            .register_capsule(Capsule {
                name: "HighCrown".to_string(),
                min_seal_level: SealLevel::Immutable,
                audit_required: true,
                active: true,
            })
            .unwrap();
        assert!(!registry
            .is_permitted("Custodian", "HighCrown", SealLevel::Eternal)
            .unwrap());
    }

    #[test]
    fn deactivation_revokes_permission() {
        let registry = seeded();
        registry.deactivate_actor("Custodian").unwrap();
        assert!(!registry
            .is_permitted("Custodian", "SovereignCrown", SealLevel::Temporal)
            .unwrap());
    }

    #[test]
    fn realm_status_distinguishes_freeform_from_deactivated() {
        let registry = seeded();
        assert_eq!(
            registry.realm_status("Lunar:Unknown").unwrap(),
            RealmStatus::Unregistered
        );
        assert_eq!(
            registry.realm_status("Planetary:Jackson-NC").unwrap(),
            RealmStatus::Active
        );
        registry.deactivate_realm("Planetary:Jackson-NC").unwrap();
        assert_eq!(
            registry.realm_status("Planetary:Jackson-NC").unwrap(),
            RealmStatus::Inactive
        );
    }

    #[test]
    fn reload_replaces_contents_wholesale() {
        let registry = seeded();
        registry.reload(RegistrySnapshot::default()).unwrap();
        assert!(registry.get_actor("Custodian").unwrap().is_none());
    }

    #[test]
    fn snapshot_file_round_trip() {
        let registry = seeded();
        let snapshot = registry.snapshot().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(&path, serde_json::to_string_pretty(&snapshot).unwrap()).unwrap();

        let loaded = RegistryStore::load_file(&path).unwrap();
        assert!(loaded
            .is_permitted("Custodian", "SovereignCrown", SealLevel::Eternal)
            .unwrap());
    }
}
