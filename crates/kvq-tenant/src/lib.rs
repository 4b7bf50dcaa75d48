//! KVQ Identity Registry
//!
//! Maps opaque bearer tokens to tenants. Every request is resolved here
//! first; the KV and queue engines only ever see a [`TenantId`].
//!
//! ```text
//! ┌──────────────┐   resolve(token)   ┌──────────────────┐
//! │ HTTP request │ ─────────────────▶ │ IdentityRegistry │
//! └──────────────┘                    └────────┬─────────┘
//!                                              │ TenantId
//!                         ┌────────────────────┴────────────────────┐
//!                         ▼                                         ▼
//!                  ┌─────────────┐                          ┌──────────────┐
//!                  │  KvEngine   │                          │ QueueEngine  │
//!                  └─────────────┘                          └──────────────┘
//! ```

#![warn(missing_docs)]

pub mod identity;
pub mod model;

pub use identity::IdentityRegistry;
pub use model::{TenantId, TenantRecord, Token};
