//! KVQ HTTP API
//!
//! Token-scoped key-value store and visibility-timeout queue over JSON/HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                            HTTP (axum)                              │
//! │  /user/new   /kv/{set,get,delete}   /queue/{send,receive,delete}    │
//! │  /health     /api-docs/openapi.json                                 │
//! └──────────────────────────────┬──────────────────────────────────────┘
//!                                │ Authorization: Bearer <token>
//!                                ▼
//!                     ┌─────────────────────┐
//!                     │  IdentityRegistry   │  token → TenantId
//!                     └──────────┬──────────┘
//!                 ┌──────────────┴──────────────┐
//!                 ▼                             ▼
//!        ┌────────────────┐           ┌──────────────────┐
//!        │    KvEngine    │           │   QueueEngine    │
//!        │  TTL, lazy     │           │  leases, acks    │
//!        │  expiry        │           │                  │
//!        └───────▲────────┘           └────────▲─────────┘
//!                └──────────┐      ┌───────────┘
//!                        ┌──┴──────┴──┐        ┌───────────────┐
//!                        │  Sweeper   │        │ SnapshotStore │
//!                        └────────────┘        └───────────────┘
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod snapshot;
pub mod sweeper;

use axum::routing::get;
use axum::{Json, Router};
use kvq_common::Clock;
use kvq_kv::KvEngine;
use kvq_queue::QueueEngine;
use kvq_tenant::IdentityRegistry;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use models::*;
pub use snapshot::{
    FileSnapshotStore, MemorySnapshotStore, Snapshot, SnapshotSaver, SnapshotStore,
};
pub use sweeper::{SweepReport, Sweeper};

/// API state, shared by every handler
#[derive(Debug)]
pub struct ApiState {
    /// Token → tenant bindings
    pub registry: IdentityRegistry,
    /// Key-value engine
    pub kv: Arc<KvEngine>,
    /// Queue engine
    pub queue: Arc<QueueEngine>,
    /// Time source for every engine
    pub clock: Arc<dyn Clock>,
    /// Server configuration
    pub config: ServerConfig,
}

impl ApiState {
    /// Empty engines driven by `clock`
    pub fn new(config: ServerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry: IdentityRegistry::new(clock.clone()),
            kv: Arc::new(KvEngine::new(clock.clone())),
            queue: Arc::new(QueueEngine::new(clock.clone())),
            clock,
            config,
        }
    }

    /// Sweeper over this state's engines
    pub fn sweeper(&self) -> Sweeper {
        Sweeper::new(
            self.kv.clone(),
            self.queue.clone(),
            self.clock.clone(),
            self.config.sweep_interval(),
        )
    }

    /// Copy out every engine
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            taken_at: self.clock.now_ms(),
            tenants: self.registry.export(),
            kv: self.kv.export(),
            messages: self.queue.export(),
        }
    }

    /// Load a snapshot into the engines
    pub fn restore(&self, snapshot: Snapshot) {
        let tenants = self.registry.restore(snapshot.tenants);
        let kv_entries = self.kv.restore(snapshot.kv);
        let messages = self.queue.restore(snapshot.messages);
        tracing::info!(
            taken_at = snapshot.taken_at,
            tenants,
            kv_entries,
            messages,
            "restored snapshot"
        );
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "KVQ API",
        description = "Multi-tenant key-value store and visibility-timeout queue",
        license(name = "Apache-2.0")
    ),
    paths(
        routes::health::health_check,
        routes::users::create_user,
        routes::kv::set_key,
        routes::kv::get_key,
        routes::kv::delete_key,
        routes::queue::send_message,
        routes::queue::receive_message,
        routes::queue::delete_message,
    ),
    components(
        schemas(
            ErrorResponse, HealthResponse, CreateUserResponse,
            KvSetRequest, KvKeyRequest, KvGetResponse,
            QueueSendRequest, QueueSendResponse,
            QueueReceiveRequest, QueueReceiveResponse, QueueDeleteRequest
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User creation"),
        (name = "kv", description = "Per-tenant key-value store"),
        (name = "queue", description = "Per-tenant message queues")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the API router
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/user", routes::users::router())
        .nest("/kv", routes::kv::router())
        .nest("/queue", routes::queue::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
