//! KV engine

use crate::entry::{KvEntry, KvRecord, KvValue};
use dashmap::DashMap;
use kvq_common::clock::deadline_after;
use kvq_common::{Clock, EpochMillis, KvqError, KvqResult};
use kvq_tenant::TenantId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

type KeySpace = RwLock<HashMap<String, KvEntry>>;

/// Per-tenant key-value store
///
/// Each tenant's map is its own lock. Every mutation runs while the DashMap
/// shard guard for that tenant is held, so the sweeper can drop empty maps
/// without losing a concurrent insert.
#[derive(Debug)]
pub struct KvEngine {
    spaces: DashMap<TenantId, KeySpace>,
    clock: Arc<dyn Clock>,
}

impl KvEngine {
    /// Create an empty engine
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            spaces: DashMap::new(),
            clock,
        }
    }

    /// Upsert `key`; `ttl` of `None` stores a permanent entry
    pub fn set(
        &self,
        tenant: TenantId,
        key: impl Into<String>,
        value: impl Into<String>,
        ttl: Option<Duration>,
    ) -> KvqResult<()> {
        let key = key.into();
        if key.is_empty() {
            return Err(KvqError::validation("key must not be empty or missing"));
        }

        let now = self.clock.now_ms();
        let entry = KvEntry::new(value.into(), ttl.map(|ttl| deadline_after(now, ttl)));
        tracing::debug!(%tenant, key = %key, expires_at = ?entry.expires_at, "kv set");
        self.insert(tenant, key, entry);
        Ok(())
    }

    fn insert(&self, tenant: TenantId, key: String, entry: KvEntry) {
        match self.spaces.get(&tenant) {
            Some(space) => {
                space.write().insert(key, entry);
            }
            None => {
                self.spaces.entry(tenant).or_default().get_mut().insert(key, entry);
            }
        }
    }

    /// Read `key`; `None` when missing or expired
    pub fn get(&self, tenant: TenantId, key: &str) -> Option<KvValue> {
        let now = self.clock.now_ms();
        let space = self.spaces.get(&tenant)?;

        {
            let map = space.read();
            let entry = map.get(key)?;
            if !entry.is_expired(now) {
                return Some(KvValue {
                    value: entry.value.clone(),
                    ttl_ms: entry.remaining_ttl(now),
                });
            }
        }

        // Lazy expiry. Re-check under the write lock: a concurrent set may
        // already have replaced the stale entry.
        let mut map = space.write();
        if map.get(key).is_some_and(|entry| entry.is_expired(now)) {
            map.remove(key);
            tracing::debug!(%tenant, key, "kv entry expired on read");
        }
        None
    }

    /// Remove `key`; returns whether a live entry was removed
    pub fn remove(&self, tenant: TenantId, key: &str) -> bool {
        let now = self.clock.now_ms();
        let Some(space) = self.spaces.get(&tenant) else {
            return false;
        };
        let removed = space.write().remove(key);
        removed.is_some_and(|entry| !entry.is_expired(now))
    }

    /// Physically drop every entry expired at `now`
    ///
    /// Tenant maps left empty are dropped too. Returns the number of entries
    /// reclaimed.
    pub fn sweep_expired(&self, now: EpochMillis) -> usize {
        let mut reclaimed = 0;
        self.spaces.retain(|_, space| {
            let map = space.get_mut();
            let before = map.len();
            map.retain(|_, entry| !entry.is_expired(now));
            reclaimed += before - map.len();
            !map.is_empty()
        });
        reclaimed
    }

    /// Stored entries, including expired ones not yet reclaimed
    pub fn len(&self) -> usize {
        self.spaces.iter().map(|space| space.read().len()).sum()
    }

    /// No entries stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tenants with at least one stored entry
    pub fn tenant_count(&self) -> usize {
        self.spaces.len()
    }

    /// Dump live entries for a snapshot
    pub fn export(&self) -> Vec<KvRecord> {
        let now = self.clock.now_ms();
        let mut records = Vec::new();
        for space in self.spaces.iter() {
            let tenant_id = *space.key();
            records.extend(
                space
                    .read()
                    .iter()
                    .filter(|(_, entry)| !entry.is_expired(now))
                    .map(|(key, entry)| KvRecord {
                        tenant_id,
                        key: key.clone(),
                        value: entry.value.clone(),
                        expires_at: entry.expires_at,
                    }),
            );
        }
        records
    }

    /// Load entries from a snapshot, overwriting existing keys
    pub fn restore(&self, records: impl IntoIterator<Item = KvRecord>) -> usize {
        let mut count = 0;
        for record in records {
            if record.key.is_empty() {
                continue;
            }
            self.insert(
                record.tenant_id,
                record.key,
                KvEntry::new(record.value, record.expires_at),
            );
            count += 1;
        }
        count
    }
}
