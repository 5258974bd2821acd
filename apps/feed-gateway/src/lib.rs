#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Feed Gateway - Futures Market Data Ingestion
//!
//! Maintains a session with the exchange market data feed, normalizes
//! vendor push events into internal records, and forwards those records to
//! downstream consumers (pricing, risk, strategy engines) through an
//! outbound transmission channel.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Core data types and session logic
//!   - `instrument`: Dense instrument ids, interest and reception vectors
//!   - `record`: Static reference and depth snapshot records
//!   - `session`: Session states and normalized feed events
//!
//! - **Application**: The session core and its port definitions
//!   - `ports`: Interfaces for the directory, the feed transport, and the
//!     transmission channel
//!   - `session`: The session-lifecycle state machine and dispatch pipeline
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `channel`: Broadcast-based record fan-out
//!   - `directory`: In-memory instrument directory
//!   - `feed`: Simulated feed endpoint
//!   - `config`: Configuration loading
//!   - `health`: Health check HTTP endpoint
//!   - `metrics` / `telemetry`: Observability
//!
//! # Data Flow
//!
//! ```text
//! Exchange feed ──► Session state machine ──► Dispatch ──► Record hub ──► pricing
//!   (events)          (connect/login/            pipeline     (broadcast)  ──► risk
//!                      subscribe)                (normalize)               ──► strategy
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core data types with no external dependencies.
pub mod domain;

/// Application layer - Ports and the session service.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::instrument::{InstrumentId, InterestSet, ReceptionTracker, Symbol};
pub use domain::record::{BookLevel, DepthRecord, Record, RecordKind, StaticRecord};
pub use domain::session::{AckStatus, FeedEvent, SessionState, TickEvent};

// Application core
pub use application::ports::{
    Credentials, FeedEndpoint, InstrumentDirectory, SubmitError, TransmissionChannel,
};
pub use application::session::MarketSession;

// Infrastructure adapters
pub use infrastructure::channel::{ChannelConfig, ChannelStats, RecordHub, SharedRecordHub};
pub use infrastructure::config::{ConfigError, GatewayConfig, ServerSettings, SimSettings};
pub use infrastructure::directory::InMemoryDirectory;
pub use infrastructure::feed::{SimFeed, SimFeedConfig};

// Health server
pub use infrastructure::health::{
    GatewayStatus, HealthServer, HealthServerError, HealthServerState,
};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
