//! API Models
//!
//! Request and response bodies. Field names follow the wire format; unknown
//! request fields are ignored.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Stable machine-readable code
    pub code: String,
    /// Human readable detail
    pub message: String,
}

// ============ Users ============

/// Response to `POST /user/new`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateUserResponse {
    /// Bearer token for every other endpoint
    pub token: String,
}

// ============ KV ============

/// `POST /kv/set`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct KvSetRequest {
    /// Key, unique within the caller's tenant
    pub key: String,
    /// Value to store
    pub value: String,
    /// Time to live in ms; `-1` or absent keeps the entry forever
    #[serde(default)]
    pub ttl: Option<i64>,
}

/// `POST /kv/get` and `POST /kv/delete`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct KvKeyRequest {
    /// Key to look up
    pub key: String,
}

/// A stored value
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct KvGetResponse {
    /// Requested key
    pub key: String,
    /// Stored value
    pub value: String,
    /// Remaining ms, `-1` when the entry never expires
    pub ttl: i64,
}

// ============ Queue ============

/// `POST /queue/send`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QueueSendRequest {
    /// Queue namespace
    pub namespace: String,
    /// Message body
    pub message: String,
}

/// Id assigned to a sent message
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QueueSendResponse {
    /// Message id, needed to delete it
    pub id: String,
}

/// `POST /queue/receive`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QueueReceiveRequest {
    /// Queue namespace
    pub namespace: String,
    /// Lease length in ms
    #[serde(default, rename = "visibilityTimeout", alias = "visibility_timeout")]
    pub visibility_timeout: Option<i64>,
}

/// A leased message
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QueueReceiveResponse {
    /// Message id
    pub id: String,
    /// Namespace it came from
    pub namespace: String,
    /// Message body
    pub message: String,
}

/// `POST /queue/delete`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QueueDeleteRequest {
    /// Queue namespace
    pub namespace: String,
    /// Message id from a receive
    pub id: String,
}

// ============ Health ============

/// `GET /health`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `ok` while the server answers
    pub status: String,
    /// Server version
    pub version: String,
    /// Registered tenants
    pub tenants: usize,
    /// Stored KV entries, including expired ones not yet swept
    pub kv_entries: usize,
    /// Live queue namespaces
    pub queue_namespaces: usize,
    /// Messages a receive could return now
    pub messages_visible: usize,
    /// Messages under an active lease
    pub messages_leased: usize,
}
