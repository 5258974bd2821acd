//! Health Check and Metrics Endpoint
//!
//! HTTP endpoint for health checks, session status reporting, and Prometheus
//! metrics. Used by container orchestrators, load balancers, and monitoring
//! systems.
//!
//! # Endpoints
//!
//! - `GET /health` - Returns JSON health status
//! - `GET /healthz` - Kubernetes liveness probe (simple OK)
//! - `GET /readyz` - Kubernetes readiness probe (ready once subscribed)
//! - `GET /metrics` - Prometheus metrics in text format

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::domain::session::SessionState;
use crate::infrastructure::channel::SharedRecordHub;
use crate::infrastructure::metrics::get_metrics_handle;

// =============================================================================
// Gateway Status
// =============================================================================

/// Shared view of the running session, updated by the event loop and read
/// by the health handlers.
#[derive(Debug, Default)]
pub struct GatewayStatus {
    state: RwLock<SessionState>,
    trading_day: RwLock<Option<String>>,
    ticks_received: AtomicU64,
    interested_instruments: AtomicU64,
}

impl GatewayStatus {
    /// Create a status view in the `Disconnected` state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the session state after an event was handled.
    pub fn set_state(&self, state: SessionState) {
        *self.state.write() = state;
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    /// Record the trading day from an accepted login.
    pub fn set_trading_day(&self, trading_day: Option<String>) {
        *self.trading_day.write() = trading_day;
    }

    /// Trading day of the current session, if logged in.
    #[must_use]
    pub fn trading_day(&self) -> Option<String> {
        self.trading_day.read().clone()
    }

    /// Count one received tick event.
    pub fn increment_ticks(&self) {
        self.ticks_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Total tick events received since start.
    #[must_use]
    pub fn ticks_received(&self) -> u64 {
        self.ticks_received.load(Ordering::Relaxed)
    }

    /// Record the size of the interest set.
    pub fn set_interested_instruments(&self, count: u64) {
        self.interested_instruments.store(count, Ordering::Relaxed);
    }

    /// Instruments in the current interest set.
    #[must_use]
    pub fn interested_instruments(&self) -> u64 {
        self.interested_instruments.load(Ordering::Relaxed)
    }
}

// =============================================================================
// Health Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy", "degraded", or "unhealthy".
    pub status: HealthStatus,
    /// Gateway version.
    pub version: String,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
    /// Current time.
    pub current_time: DateTime<Utc>,
    /// Session status.
    pub session: SessionStatus,
    /// Transmission channel status.
    pub channels: ChannelStatus,
}

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Streaming market data.
    Healthy,
    /// Connected but not yet streaming.
    Degraded,
    /// No feed connection.
    Unhealthy,
}

/// Session status section.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    /// Session state name.
    pub state: String,
    /// Trading day of the current session, if logged in.
    pub trading_day: Option<String>,
    /// Tick events received since start.
    pub ticks_received: u64,
    /// Instruments in the current interest set.
    pub interested_instruments: u64,
}

/// Transmission channel status section.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelStatus {
    /// Static record receivers.
    pub static_receivers: usize,
    /// Depth record receivers.
    pub depth_receivers: usize,
}

// =============================================================================
// Health Server State
// =============================================================================

/// Shared state for the health server.
pub struct HealthServerState {
    version: String,
    started_at: Instant,
    status: Arc<GatewayStatus>,
    hub: SharedRecordHub,
}

impl HealthServerState {
    /// Create new health server state.
    #[must_use]
    pub fn new(version: String, status: Arc<GatewayStatus>, hub: SharedRecordHub) -> Self {
        Self {
            version,
            started_at: Instant::now(),
            status,
            hub,
        }
    }
}

// =============================================================================
// Health Server
// =============================================================================

/// Health check HTTP server.
pub struct HealthServer {
    port: u16,
    state: Arc<HealthServerState>,
    cancel: CancellationToken,
}

impl HealthServer {
    /// Create a new health server.
    #[must_use]
    pub const fn new(port: u16, state: Arc<HealthServerState>, cancel: CancellationToken) -> Self {
        Self {
            port,
            state,
            cancel,
        }
    }

    /// Run the health server until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `HealthServerError` if binding fails or the HTTP server
    /// encounters a fatal error while running.
    pub async fn run(self) -> Result<(), HealthServerError> {
        let app = Router::new()
            .route("/health", get(health_handler))
            .route("/healthz", get(liveness_handler))
            .route("/readyz", get(readiness_handler))
            .route("/metrics", get(metrics_handler))
            .with_state(self.state);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| HealthServerError::BindFailed(self.port, e.to_string()))?;

        tracing::info!(port = self.port, "Health server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| HealthServerError::ServerFailed(e.to_string()))?;

        tracing::info!("Health server stopped");
        Ok(())
    }
}

// =============================================================================
// HTTP Handlers
// =============================================================================

async fn health_handler(State(state): State<Arc<HealthServerState>>) -> impl IntoResponse {
    let response = build_health_response(&state);
    let status_code = match response.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(response))
}

async fn liveness_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn readiness_handler(State(state): State<Arc<HealthServerState>>) -> impl IntoResponse {
    if state.status.state().is_streaming() {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}

async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            let body = handle.render();
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                body,
            )
        },
    )
}

fn build_health_response(state: &HealthServerState) -> HealthResponse {
    let session_state = state.status.state();
    let channel_stats = state.hub.stats();

    HealthResponse {
        status: determine_health_status(session_state),
        version: state.version.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        current_time: Utc::now(),
        session: SessionStatus {
            state: session_state.as_str().to_string(),
            trading_day: state.status.trading_day(),
            ticks_received: state.status.ticks_received(),
            interested_instruments: state.status.interested_instruments(),
        },
        channels: ChannelStatus {
            static_receivers: channel_stats.static_receivers,
            depth_receivers: channel_stats.depth_receivers,
        },
    }
}

const fn determine_health_status(state: SessionState) -> HealthStatus {
    match state {
        SessionState::Subscribed => HealthStatus::Healthy,
        SessionState::AwaitingLogin | SessionState::LoggedIn => HealthStatus::Degraded,
        SessionState::Disconnected => HealthStatus::Unhealthy,
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Health server errors.
#[derive(Debug, thiserror::Error)]
pub enum HealthServerError {
    /// Failed to bind to port.
    #[error("failed to bind to port {0}: {1}")]
    BindFailed(u16, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}

// =============================================================================
// Tests
// =============================================================================
