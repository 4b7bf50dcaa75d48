//! KVQ KV Engine
//!
//! Per-tenant key-value store with optional time-to-live.
//!
//! Expiry is enforced twice, independently:
//! - on read: an entry with `now >= expires_at` is treated as absent and
//!   removed on the spot (authoritative)
//! - by the sweeper: [`KvEngine::sweep_expired`] reclaims entries nobody
//!   reads again (memory bound only)

#![warn(missing_docs)]

pub mod engine;
pub mod entry;

pub use engine::KvEngine;
pub use entry::{KvEntry, KvRecord, KvValue};
