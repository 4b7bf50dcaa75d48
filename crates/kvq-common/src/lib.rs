//! KVQ Common - Shared types for the tenant, KV and queue engines
//!
//! This crate provides the pieces every engine agrees on:
//! - Error taxonomy (auth, validation, internal)
//! - Millisecond wall clock, injectable for tests
//!
//! Absence is not an error anywhere in KVQ. A missing key or an empty queue
//! is reported through `Option`, so callers branch on it instead of matching
//! on an error variant.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::*;

/// Milliseconds since the UNIX epoch.
pub type EpochMillis = u64;

/// Remaining-TTL sentinel reported for entries that never expire.
pub const NO_EXPIRY: i64 = -1;
