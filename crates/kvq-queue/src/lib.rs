//! KVQ Queue Engine
//!
//! SQS-style queue: per-tenant namespaces, visibility-timeout leases and
//! explicit delete acknowledgment.
//!
//! # Message lifecycle
//!
//! ```text
//!              send
//!               │
//!               ▼
//!          ┌─────────┐   receive(timeout)   ┌──────────────────┐
//!          │ Visible │ ───────────────────▶ │ Leased { until } │
//!          └─────────┘                      └────────┬─────────┘
//!               ▲                                    │
//!               │        now >= until                │ delete(id)
//!               └────────────────────────────────────┤
//!                                                    ▼
//!                                               ┌─────────┐
//!                                               │ Deleted │
//!                                               └─────────┘
//! ```
//!
//! Delivery is at-least-once: a leased message that is not deleted before
//! its lease lapses is handed out again. Two receivers never hold the same
//! message during one lease window, because the eligibility test and the
//! lease transition happen under the namespace lock.

#![warn(missing_docs)]

pub mod engine;
pub mod message;
pub mod namespace;

pub use engine::{QueueEngine, QueueStats};
pub use message::{Message, MessageId, MessageRecord, ReceivedMessage, Visibility};
pub use namespace::Namespace;
