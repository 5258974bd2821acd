//! Port Interfaces
//!
//! The contracts between the session core and its external collaborators,
//! following the Hexagonal Architecture pattern. The core is single-threaded
//! and never blocks, so every port operation is synchronous submit-and-return.
//!
//! ## Driven Ports (Outbound)
//!
//! - [`FeedEndpoint`]: request submission to the exchange feed transport
//! - [`TransmissionChannel`]: non-blocking record sink toward downstream
//!   consumers
//!
//! ## Lookup Ports
//!
//! - [`InstrumentDirectory`]: symbol ↔ dense id mapping, owned elsewhere

use std::sync::Arc;

use thiserror::Error;

use crate::domain::instrument::{InstrumentId, Symbol};
use crate::domain::record::Record;

// =============================================================================
// Credentials
// =============================================================================

/// Feed login credentials.
///
/// The `Debug` implementation redacts the password for safe logging.
#[derive(Clone)]
pub struct Credentials {
    broker_id: String,
    user_id: String,
    password: String,
}

impl Credentials {
    /// Create new credentials.
    #[must_use]
    pub fn new(
        broker_id: impl Into<String>,
        user_id: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            broker_id: broker_id.into(),
            user_id: user_id.into(),
            password: password.into(),
        }
    }

    /// Get the broker id.
    #[must_use]
    pub fn broker_id(&self) -> &str {
        &self.broker_id
    }

    /// Get the user id.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Get the password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("broker_id", &self.broker_id)
            .field("user_id", &self.user_id)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// Submission Errors
// =============================================================================

/// A request to the feed endpoint could not be dispatched.
///
/// Submission errors are reported and never retried by the core; retry, if
/// any, belongs to the external transport.
#[derive(Debug, Clone, Error)]
pub enum SubmitError {
    /// The transport cannot accept requests right now.
    #[error("feed transport busy")]
    Busy,

    /// No transport connection is established.
    #[error("feed transport not connected")]
    NotConnected,

    /// The transport rejected the request with a vendor code.
    #[error("feed transport rejected request, code {0}")]
    Rejected(i32),
}

// =============================================================================
// Instrument Directory
// =============================================================================

/// Symbol ↔ dense id mapping, consumed but not owned by the gateway.
#[cfg_attr(test, mockall::automock)]
pub trait InstrumentDirectory {
    /// Resolve a symbol to its dense id, or `None` for an unknown symbol.
    fn resolve(&self, symbol: &str) -> Option<InstrumentId>;

    /// Number of instruments currently known to the directory.
    fn count(&self) -> usize;

    /// Symbol for a dense id, or `None` if the id was never assigned.
    fn name(&self, id: InstrumentId) -> Option<Symbol>;
}

impl<D: InstrumentDirectory + ?Sized> InstrumentDirectory for Arc<D> {
    fn resolve(&self, symbol: &str) -> Option<InstrumentId> {
        (**self).resolve(symbol)
    }

    fn count(&self) -> usize {
        (**self).count()
    }

    fn name(&self, id: InstrumentId) -> Option<Symbol> {
        (**self).name(id)
    }
}

// =============================================================================
// Feed Endpoint
// =============================================================================

/// Request submission half of the exchange feed transport.
///
/// Every operation is fire-and-forget: an `Ok` means the request was
/// dispatched, not that the exchange accepted it — outcomes arrive later as
/// [`crate::domain::session::FeedEvent`]s.
#[cfg_attr(test, mockall::automock)]
pub trait FeedEndpoint {
    /// Submit an authentication request.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError`] if the request could not be dispatched.
    fn submit_login(&mut self, credentials: &Credentials) -> Result<(), SubmitError>;

    /// Submit a market data subscribe request for the given symbols.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError`] if the request could not be dispatched.
    fn submit_subscribe(&mut self, symbols: &[Symbol]) -> Result<(), SubmitError>;

    /// Submit a market data unsubscribe request for the given symbols.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError`] if the request could not be dispatched.
    fn submit_unsubscribe(&mut self, symbols: &[Symbol]) -> Result<(), SubmitError>;
}

// =============================================================================
// Transmission Channel
// =============================================================================

/// Outbound, possibly bounded, record sink toward downstream consumers.
///
/// `write` never blocks and is never retried: a `false` return drops that
/// single record, and subsequent writes are unaffected. Downstream consumers
/// are expected to tolerate gaps.
#[cfg_attr(test, mockall::automock)]
pub trait TransmissionChannel {
    /// Submit one record; returns `false` if the channel could not accept it.
    fn write(&self, record: Record) -> bool;
}

impl<T: TransmissionChannel + ?Sized> TransmissionChannel for Arc<T> {
    fn write(&self, record: Record) -> bool {
        (**self).write(record)
    }
}

// =============================================================================
// Tests
// =============================================================================
