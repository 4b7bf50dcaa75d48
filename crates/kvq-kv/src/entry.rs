//! KV entries

use kvq_common::{EpochMillis, NO_EXPIRY};
use kvq_tenant::TenantId;
use serde::{Deserialize, Serialize};

/// Stored value plus optional absolute expiry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvEntry {
    pub(crate) value: String,
    pub(crate) expires_at: Option<EpochMillis>,
}

impl KvEntry {
    /// Create an entry
    pub fn new(value: String, expires_at: Option<EpochMillis>) -> Self {
        Self { value, expires_at }
    }

    /// Logically expired at `now`
    #[inline]
    pub fn is_expired(&self, now: EpochMillis) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }

    /// Milliseconds left, or [`NO_EXPIRY`] for a permanent entry
    pub fn remaining_ttl(&self, now: EpochMillis) -> i64 {
        match self.expires_at {
            None => NO_EXPIRY,
            Some(at) => i64::try_from(at.saturating_sub(now)).unwrap_or(i64::MAX),
        }
    }
}

/// Result of a successful `get`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvValue {
    /// Stored value
    pub value: String,
    /// Remaining TTL in ms, `-1` when the entry never expires
    pub ttl_ms: i64,
}

/// Snapshot form of one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvRecord {
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Key
    pub key: String,
    /// Value
    pub value: String,
    /// Absolute expiry (ms since epoch)
    pub expires_at: Option<EpochMillis>,
}
