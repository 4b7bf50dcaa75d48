//! Identity Registry

use crate::model::{TenantId, TenantRecord, Token};
use kvq_common::{AuthError, Clock, EpochMillis};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Token → tenant lookup table
///
/// Grows monotonically for the life of the process: tokens are never revoked
/// or rotated.
#[derive(Debug)]
pub struct IdentityRegistry {
    /// Token → tenant binding
    tenants: RwLock<HashMap<Token, TenantBinding>>,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, Clone, Copy)]
struct TenantBinding {
    tenant_id: TenantId,
    created_at: EpochMillis,
}

impl IdentityRegistry {
    /// Create an empty registry
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tenants: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Allocate a new tenant and issue its token
    pub fn create_user(&self) -> (Token, TenantId) {
        let binding = TenantBinding {
            tenant_id: Uuid::new_v4(),
            created_at: self.clock.now_ms(),
        };

        let mut tenants = self.tenants.write();
        let token = loop {
            let candidate = Token::generate();
            if !tenants.contains_key(&candidate) {
                break candidate;
            }
            tracing::warn!("token collision, regenerating");
        };
        tenants.insert(token.clone(), binding);
        drop(tenants);

        tracing::info!(tenant_id = %binding.tenant_id, "created tenant");
        (token, binding.tenant_id)
    }

    /// Resolve a bearer token to its tenant
    pub fn resolve(&self, raw: &str) -> Result<TenantId, AuthError> {
        if !Token::is_well_formed(raw) {
            return Err(AuthError::InvalidToken);
        }
        self.tenants
            .read()
            .get(&Token::from_raw(raw))
            .map(|binding| binding.tenant_id)
            .ok_or(AuthError::InvalidToken)
    }

    /// Number of registered tenants
    pub fn tenant_count(&self) -> usize {
        self.tenants.read().len()
    }

    /// Dump every binding for a snapshot
    pub fn export(&self) -> Vec<TenantRecord> {
        let mut records: Vec<_> = self
            .tenants
            .read()
            .iter()
            .map(|(token, binding)| TenantRecord {
                token: token.clone(),
                tenant_id: binding.tenant_id,
                created_at: binding.created_at,
            })
            .collect();
        records.sort_by_key(|r| r.created_at);
        records
    }

    /// Load bindings from a snapshot, keeping any already registered
    pub fn restore(&self, records: impl IntoIterator<Item = TenantRecord>) -> usize {
        let mut tenants = self.tenants.write();
        let before = tenants.len();
        for record in records {
            tenants.insert(
                record.token,
                TenantBinding {
                    tenant_id: record.tenant_id,
                    created_at: record.created_at,
                },
            );
        }
        tenants.len() - before
    }
}
