//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer.

/// Broadcast channel adapter for record distribution.
pub mod channel;

/// Configuration loading.
pub mod config;

/// In-memory instrument directory.
pub mod directory;

/// Simulated feed endpoint for local runs and tests.
pub mod feed;

/// Health check HTTP endpoint.
pub mod health;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Tracing and OpenTelemetry integration.
pub mod telemetry;
