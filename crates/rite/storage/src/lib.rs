//! Rite unified storage abstractions.
//!
//! This crate defines the durable-store contract for the dispatch ledger:
//! - append-only dispatch entries keyed by dispatch identifier
//! - derived replay records keyed by replay identifier
//! - honor awards keyed by honor identifier, listed by recipient
//!
//! Design stance:
//! - Appends are serialized per store; reads never block reads.
//! - Identifiers are pre-generated by the caller; a duplicate append is a
//!   conflict, never an overwrite.
//! - Any backend satisfies the contract as long as append is atomic and
//!   get-by-key is available.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod error;
pub mod fs;
pub mod memory;
mod traits;

pub use error::{StorageError, StorageResult};
pub use fs::FileRiteStorage;
pub use memory::InMemoryRiteStorage;
pub use traits::{DispatchStore, HonorStore, QueryWindow, ReplayStore, RiteStorage};
