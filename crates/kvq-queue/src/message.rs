//! Queue messages and their visibility state

use kvq_common::EpochMillis;
use kvq_tenant::TenantId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque message identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Fresh random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an id received from a client
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow as str
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Delivery state of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Visibility {
    /// Deliverable to the next receiver
    Visible,
    /// Hidden until the lease lapses
    Leased {
        /// Lease deadline (ms since epoch)
        until: EpochMillis,
    },
}

impl Visibility {
    /// Can be handed to a receiver at `now`
    #[inline]
    pub fn is_eligible(&self, now: EpochMillis) -> bool {
        match self {
            Self::Visible => true,
            Self::Leased { until } => now >= *until,
        }
    }

    /// Holds a lease that is still running at `now`
    #[inline]
    pub fn is_leased_at(&self, now: EpochMillis) -> bool {
        !self.is_eligible(now)
    }
}

/// A stored message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Identifier returned to clients
    pub id: MessageId,
    /// Enqueue order within the engine
    pub seq: u64,
    /// Payload
    pub body: String,
    /// Enqueue time
    pub enqueued_at: EpochMillis,
    /// Current delivery state
    pub visibility: Visibility,
    /// Times this message has been leased
    pub receive_count: u32,
}

impl Message {
    /// First instant the message may be delivered
    pub fn visible_at(&self) -> EpochMillis {
        match self.visibility {
            Visibility::Visible => self.enqueued_at,
            Visibility::Leased { until } => until,
        }
    }
}

/// What a successful `receive` hands back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    /// Message id, used for `delete`
    pub id: MessageId,
    /// Namespace it was received from
    pub namespace: String,
    /// Payload
    pub body: String,
    /// Includes this delivery
    pub receive_count: u32,
}

/// Snapshot form of one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Namespace
    pub namespace: String,
    /// Message id
    pub id: MessageId,
    /// Enqueue sequence
    pub seq: u64,
    /// Payload
    pub body: String,
    /// Enqueue time
    pub enqueued_at: EpochMillis,
    /// Delivery state at snapshot time
    pub visibility: Visibility,
    /// Times leased so far
    pub receive_count: u32,
}
