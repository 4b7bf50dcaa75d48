//! Tenant Data Model

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Tenant ID
pub type TenantId = Uuid;

/// Random bytes per issued token
pub const TOKEN_BYTES: usize = 32;

/// Opaque bearer token
///
/// Tokens are credentials, so `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Generate a fresh token from the OS-seeded CSPRNG
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(STANDARD.encode(bytes))
    }

    /// Wrap a token string received from a client
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the token string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the string could ever have been issued by this registry
    pub fn is_well_formed(raw: &str) -> bool {
        !raw.is_empty() && !raw.chars().any(char::is_whitespace)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

/// Persisted token → tenant mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantRecord {
    /// Bearer token
    pub token: Token,
    /// Tenant the token grants access to
    pub tenant_id: TenantId,
    /// Creation time (ms since epoch)
    pub created_at: u64,
}
