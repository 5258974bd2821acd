//! Session States and Feed Events
//!
//! The feed endpoint drives the gateway through vendor callbacks; here they
//! are reframed as an explicit [`FeedEvent`] value fed into the session
//! service, so the state machine and the dispatch pipeline can be exercised
//! with synthetic events and no live connection.
//!
//! # Lifecycle
//!
//! ```text
//! Disconnected ──connect──► AwaitingLogin ──login ok──► LoggedIn ──subscribe──► Subscribed
//!       ▲                                                                          │
//!       └──────────────────────── transport disconnect ◄──────────────────────────┘
//! ```
//!
//! Disconnect is reachable from every state; a login rejection leaves the
//! session in `AwaitingLogin` until an external actor retries or the
//! transport reconnects.

use crate::domain::instrument::Symbol;
use crate::domain::record::BookLevel;

// =============================================================================
// Session State
// =============================================================================

/// Current state of the market data session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No transport connection.
    #[default]
    Disconnected,

    /// Transport connected, login submitted or pending.
    AwaitingLogin,

    /// Login accepted; subscribe not yet submitted.
    LoggedIn,

    /// Subscribe request submitted; tick events expected.
    Subscribed,
}

impl SessionState {
    /// Check whether tick data is expected in this state.
    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        matches!(self, Self::Subscribed)
    }

    /// Check whether a login response is expected in this state.
    #[must_use]
    pub const fn is_awaiting_login(&self) -> bool {
        matches!(self, Self::AwaitingLogin)
    }

    /// Stable name for logs and the health endpoint.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::AwaitingLogin => "awaiting_login",
            Self::LoggedIn => "logged_in",
            Self::Subscribed => "subscribed",
        }
    }
}

// =============================================================================
// Acknowledgment Status
// =============================================================================

/// Vendor acknowledgment status for subscribe/unsubscribe requests.
///
/// Code zero means success, the vendor convention for response info blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckStatus {
    /// Vendor error code; zero on success.
    pub code: i32,
    /// Vendor error message; empty on success.
    pub message: String,
}

impl AckStatus {
    /// A successful acknowledgment.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            code: 0,
            message: String::new(),
        }
    }

    /// A failed acknowledgment with the vendor's code and message.
    #[must_use]
    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Check whether the request was acknowledged successfully.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code == 0
    }
}

// =============================================================================
// Tick Event
// =============================================================================

/// A raw depth tick pushed by the feed for one instrument.
///
/// Field values are the feed's native numbers; the pipeline passes them
/// through into [`crate::domain::record::DepthRecord`] unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct TickEvent {
    /// Instrument symbol as the feed names it.
    pub symbol: Symbol,
    /// Previous session's close price.
    pub prev_close: f64,
    /// Upper price limit for the trading day.
    pub upper_limit: f64,
    /// Lower price limit for the trading day.
    pub lower_limit: f64,
    /// Session open price.
    pub open: f64,
    /// Session high price.
    pub high: f64,
    /// Session low price.
    pub low: f64,
    /// Last traded price.
    pub last: f64,
    /// Open interest.
    pub open_interest: f64,
    /// Cumulative traded volume.
    pub volume: i64,
    /// Cumulative turnover.
    pub turnover: f64,
    /// Bid levels, best first.
    pub bids: Vec<BookLevel>,
    /// Ask levels, best first.
    pub asks: Vec<BookLevel>,
}

// =============================================================================
// Feed Event
// =============================================================================

/// A normalized event from the feed endpoint.
///
/// The external transport delivers these sequentially and non-reentrantly;
/// the session service consumes them one at a time on a single thread.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// Transport-level connection established.
    Connected,

    /// Transport-level connection lost.
    Disconnected {
        /// Vendor reason code for the disconnect.
        reason: i32,
    },

    /// Login accepted by the feed.
    LoginAccepted {
        /// Exchange trading day identifier.
        trading_day: String,
    },

    /// Login rejected by the feed.
    LoginRejected {
        /// Vendor error code.
        code: i32,
        /// Vendor error message.
        message: String,
    },

    /// Per-instrument subscribe acknowledgment.
    SubscribeAck {
        /// Acknowledged instrument symbol.
        symbol: Symbol,
        /// Acknowledgment outcome.
        status: AckStatus,
    },

    /// Per-instrument unsubscribe acknowledgment.
    UnsubscribeAck {
        /// Acknowledged instrument symbol.
        symbol: Symbol,
        /// Acknowledgment outcome.
        status: AckStatus,
    },

    /// Depth tick for one instrument.
    Tick(TickEvent),

    /// Feed liveness warning; observed and reported, never acted upon.
    HeartbeatWarning {
        /// Seconds since the last message from the feed.
        elapsed_secs: u32,
    },

    /// Generic feed-level error notification.
    FeedError {
        /// Vendor error code.
        code: i32,
        /// Vendor error message.
        message: String,
    },
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_disconnected() {
        assert_eq!(SessionState::default(), SessionState::Disconnected);
    }

    #[test]
    fn only_subscribed_is_streaming() {
        assert!(SessionState::Subscribed.is_streaming());
        assert!(!SessionState::Disconnected.is_streaming());
        assert!(!SessionState::AwaitingLogin.is_streaming());
        assert!(!SessionState::LoggedIn.is_streaming());
    }

    #[test]
    fn state_names_are_stable() {
        assert_eq!(SessionState::Disconnected.as_str(), "disconnected");
        assert_eq!(SessionState::AwaitingLogin.as_str(), "awaiting_login");
        assert_eq!(SessionState::LoggedIn.as_str(), "logged_in");
        assert_eq!(SessionState::Subscribed.as_str(), "subscribed");
    }

    #[test]
    fn ack_status_success_and_failure() {
        assert!(AckStatus::ok().is_ok());

        let failed = AckStatus::error(42, "no such instrument");
        assert!(!failed.is_ok());
        assert_eq!(failed.code, 42);
        assert_eq!(failed.message, "no such instrument");
    }
}
