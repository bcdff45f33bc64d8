//! # LifeFlow HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /status` - Registry counts
//! - `GET /blood-types` - Profiles for all eight blood types
//! - `GET /compatibility/{blood_type}` - Compatible donors and recipients
//! - `POST /compatibility/check` - Check one donor/recipient pair
//! - `POST /donors` - Register a donor
//! - `GET|PUT|DELETE /donors/{id}` - Read, update, remove a donor
//! - `POST /donors/{id}/availability` - Toggle availability
//! - `POST /donors/{id}/donation` - Record a donation
//! - `POST /donors/search` - Search eligible donors
//! - `GET|POST /emergency` - List or create emergency requests
//! - `GET /emergency/{id}` - Read one request
//! - `POST /emergency/{id}/resolve` - Mark a request fulfilled
//! - `GET /hospitals?q=` - Hospital autocomplete

mod handlers;
mod middleware;
mod types;

pub use handlers::error_status;
pub use middleware::{GlobalRateLimiter, create_rate_limiter};
pub use types::{
    AvailabilityRequest, BloodTypesResponse, BroadcastResponse, CheckRequest, CheckResponse,
    CompatibilityResponse, DonorResponse, HealthResponse, HospitalJson, HospitalListResponse,
    HospitalQuery, RequestListQuery, RequestListResponse, RequestResponse, SearchResponse,
    StatusResponse,
};

use crate::config::ServerConfig;
use crate::persistence::{snapshot_bytes, write_snapshot};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use lifeflow_core::{LifeFlowError, Registry};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the registry.
#[derive(Clone)]
pub struct AppState {
    /// The donor registry. Reads share the lock; mutations take it exclusively.
    pub registry: Arc<RwLock<Registry>>,
    /// Snapshot file rewritten after each mutation (file backend only).
    snapshot_path: Option<Arc<PathBuf>>,
}

impl AppState {
    /// Create app state over a registry that needs no saving.
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
            snapshot_path: None,
        }
    }

    /// Create app state that snapshots an in-memory registry to `path`
    /// after every mutation.
    #[must_use]
    pub fn with_snapshot(registry: Registry, path: PathBuf) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
            snapshot_path: Some(Arc::new(path)),
        }
    }

    /// Run a mutation under the write lock and save the snapshot.
    ///
    /// If the mutation or the snapshot write fails, the in-memory registry
    /// is put back as it was, so a failed request leaves no trace.
    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut Registry) -> Result<T, LifeFlowError>,
    ) -> Result<T, LifeFlowError> {
        let mut registry = self.registry.write().await;
        let Some(path) = &self.snapshot_path else {
            return op(&mut *registry);
        };

        let backup = registry.memory_store().cloned();
        let result = match op(&mut *registry) {
            Ok(value) => save_snapshot(&registry, path).await.map(|()| value),
            Err(e) => Err(e),
        };
        if result.is_err()
            && let Some(store) = backup
        {
            *registry = Registry::with_store(store);
        }
        result
    }
}

/// Write the snapshot off the async workers. The caller keeps the write
/// lock until the file is in place, so snapshots land in mutation order.
async fn save_snapshot(registry: &Registry, path: &Arc<PathBuf>) -> Result<(), LifeFlowError> {
    let Some(data) = snapshot_bytes(registry)? else {
        return Ok(());
    };
    let path = Arc::clone(path);
    tokio::task::spawn_blocking(move || write_snapshot(&path, &data))
        .await
        .map_err(|e| LifeFlowError::IoError(format!("Snapshot task failed: {}", e)))?
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

const CORS_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

/// Build CORS layer from the configured origins.
///
/// - `["*"]`: allows all origins (development only)
/// - empty: localhost only
/// - otherwise: the listed origins; invalid entries are skipped
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS: Allowing ALL origins. This is insecure for production!");
        return CorsLayer::permissive();
    }

    let allowed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(hv) => {
                tracing::info!("CORS: Allowing origin: {}", origin);
                Some(hv)
            }
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    if allowed_origins.is_empty() {
        tracing::info!("CORS: No origins configured, defaulting to localhost only");
        return build_localhost_cors();
    }

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(CORS_METHODS)
        .allow_headers([header::CONTENT_TYPE])
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(CORS_METHODS)
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting (if enabled)
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = build_cors_layer(&config.cors_origins);

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route("/blood-types", get(handlers::blood_types_handler))
        .route("/compatibility/check", post(handlers::check_handler))
        .route("/compatibility/{blood_type}", get(handlers::compatibility_handler))
        .route("/donors", post(handlers::register_donor_handler))
        .route("/donors/search", post(handlers::search_handler))
        .route(
            "/donors/{id}",
            get(handlers::get_donor_handler)
                .put(handlers::update_donor_handler)
                .delete(handlers::delete_donor_handler),
        )
        .route(
            "/donors/{id}/availability",
            post(handlers::availability_handler),
        )
        .route("/donors/{id}/donation", post(handlers::donation_handler))
        .route(
            "/emergency",
            get(handlers::list_requests_handler).post(handlers::create_emergency_handler),
        )
        .route("/emergency/{id}", get(handlers::get_request_handler))
        .route(
            "/emergency/{id}/resolve",
            post(handlers::resolve_request_handler),
        )
        .route("/hospitals", get(handlers::hospitals_handler));

    match create_rate_limiter(config.rate_limit) {
        Some(limiter) => {
            tracing::info!("Rate limiting enabled: {} requests/second", config.rate_limit);
            router = router.layer(axum_middleware::from_fn_with_state(
                limiter,
                middleware::rate_limit_middleware,
            ));
        }
        None => tracing::info!("Rate limiting disabled"),
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(64 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and run until Ctrl+C.
pub async fn run_server(state: AppState, config: &ServerConfig) -> Result<(), LifeFlowError> {
    let router = create_router(state, config);
    let addr = config.bind_addr();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| LifeFlowError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("LifeFlow HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| LifeFlowError::IoError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
