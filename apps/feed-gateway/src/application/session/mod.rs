//! Market Data Session Service
//!
//! [`MarketSession`] owns the session-lifecycle state machine, the
//! interest/reception vectors, and the normalization-and-dispatch pipeline
//! that turns raw tick events into static and depth records on the
//! transmission channel.
//!
//! # Processing model
//!
//! Single-threaded and callback-driven: the external transport delivers
//! [`FeedEvent`]s sequentially, and [`MarketSession::handle`] consumes them
//! one at a time. Nothing here blocks, suspends, or retries — request
//! submission and record writes are submit-and-return, and every failure is
//! reported and then left to the external transport or the downstream
//! consumer to deal with.
//!
//! # Static record cadence
//!
//! The static record for an instrument is emitted exactly once per session,
//! on the first tick seen for that instrument after login. The reception
//! tracker is marked whether or not the channel accepted the write, so a
//! rejected static record is dropped for the rest of the session rather than
//! re-sent on the next tick.

use std::collections::HashSet;

use crate::application::ports::{
    Credentials, FeedEndpoint, InstrumentDirectory, TransmissionChannel,
};
use crate::domain::instrument::{InterestSet, ReceptionTracker, Symbol};
use crate::domain::record::{DepthRecord, Record, StaticRecord};
use crate::domain::session::{FeedEvent, SessionState, TickEvent};

// =============================================================================
// Market Session
// =============================================================================

/// The market data session: state machine plus dispatch pipeline.
///
/// Generic over its three ports so the whole core can be driven by synthetic
/// events and inspected through fakes in tests.
pub struct MarketSession<D, F, T> {
    directory: D,
    feed: F,
    tx: T,
    credentials: Credentials,
    state: SessionState,
    configured: Vec<Symbol>,
    interest: InterestSet,
    received: ReceptionTracker,
    trading_day: Option<String>,
}

impl<D, F, T> MarketSession<D, F, T>
where
    D: InstrumentDirectory,
    F: FeedEndpoint,
    T: TransmissionChannel,
{
    /// Create a new session in the `Disconnected` state with an empty
    /// interest list.
    #[must_use]
    pub fn new(directory: D, feed: F, tx: T, credentials: Credentials) -> Self {
        Self {
            directory,
            feed,
            tx,
            credentials,
            state: SessionState::Disconnected,
            configured: Vec::new(),
            interest: InterestSet::default(),
            received: ReceptionTracker::default(),
            trading_day: None,
        }
    }

    /// Current session state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Trading day reported by the last accepted login, if any.
    #[must_use]
    pub fn trading_day(&self) -> Option<&str> {
        self.trading_day.as_deref()
    }

    /// The desired-subscription vector.
    #[must_use]
    pub const fn interest(&self) -> &InterestSet {
        &self.interest
    }

    /// The static-record reception vector for the current session.
    #[must_use]
    pub const fn reception(&self) -> &ReceptionTracker {
        &self.received
    }

    /// Symbols of all instruments currently marked interested.
    #[must_use]
    pub fn interested_symbols(&self) -> Vec<Symbol> {
        self.interest
            .ids()
            .filter_map(|id| self.directory.name(id))
            .collect()
    }

    /// Replace the configured instrument interest list.
    ///
    /// Rebuilds the interest set against the current directory (unresolved
    /// symbols are ignored). If the session is already streaming, the
    /// subscribe/unsubscribe deltas are submitted so the live subscription
    /// converges on the new list without a relogin; in any other state the
    /// next successful login derives the subscription from the new list.
    pub fn configure_interest(&mut self, symbols: Vec<Symbol>) {
        let previous: HashSet<Symbol> = if self.state.is_streaming() {
            self.interested_symbols().into_iter().collect()
        } else {
            HashSet::new()
        };

        self.configured = symbols;
        self.rebuild_interest();

        if !self.state.is_streaming() {
            return;
        }

        let current: HashSet<Symbol> = self.interested_symbols().into_iter().collect();
        let added: Vec<Symbol> = current.difference(&previous).cloned().collect();
        let removed: Vec<Symbol> = previous.difference(&current).cloned().collect();

        if !added.is_empty()
            && let Err(e) = self.feed.submit_subscribe(&added)
        {
            tracing::error!(error = %e, count = added.len(), "Subscribe submission failed");
        }
        if !removed.is_empty()
            && let Err(e) = self.feed.submit_unsubscribe(&removed)
        {
            tracing::error!(error = %e, count = removed.len(), "Unsubscribe submission failed");
        }
    }

    /// Process one event from the feed endpoint.
    pub fn handle(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Connected => self.on_connected(),
            FeedEvent::Disconnected { reason } => self.on_disconnected(reason),
            FeedEvent::LoginAccepted { trading_day } => self.on_login_accepted(trading_day),
            FeedEvent::LoginRejected { code, message } => {
                tracing::error!(code, message = %message, "Login rejected");
            }
            FeedEvent::SubscribeAck { symbol, status } => {
                if status.is_ok() {
                    tracing::info!(symbol = %symbol, "Subscribe acknowledged");
                } else {
                    tracing::error!(
                        symbol = %symbol,
                        code = status.code,
                        message = %status.message,
                        "Subscribe rejected"
                    );
                }
            }
            FeedEvent::UnsubscribeAck { symbol, status } => {
                if status.is_ok() {
                    tracing::info!(symbol = %symbol, "Unsubscribe acknowledged");
                } else {
                    tracing::error!(
                        symbol = %symbol,
                        code = status.code,
                        message = %status.message,
                        "Unsubscribe rejected"
                    );
                }
            }
            FeedEvent::Tick(tick) => self.on_tick(tick),
            FeedEvent::HeartbeatWarning { elapsed_secs } => {
                tracing::warn!(elapsed_secs, "Heartbeat warning");
            }
            FeedEvent::FeedError { code, message } => {
                tracing::error!(code, message = %message, "Feed error");
            }
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    fn on_connected(&mut self) {
        tracing::info!("Connected to market data front, submitting login");
        self.state = SessionState::AwaitingLogin;

        if let Err(e) = self.feed.submit_login(&self.credentials) {
            // No retry here: the transport owns reconnection and will emit a
            // fresh Connected event when it does.
            tracing::error!(error = %e, "Login submission failed");
        }
    }

    fn on_login_accepted(&mut self, trading_day: String) {
        tracing::info!(trading_day = %trading_day, "Login accepted");
        self.state = SessionState::LoggedIn;
        self.trading_day = Some(trading_day);

        self.received.reset(self.directory.count());
        self.rebuild_interest();

        let symbols = self.interested_symbols();
        match self.feed.submit_subscribe(&symbols) {
            Ok(()) => {
                self.state = SessionState::Subscribed;
                tracing::info!(count = symbols.len(), "Subscribe request submitted");
            }
            Err(e) => {
                tracing::error!(error = %e, "Subscribe submission failed");
            }
        }
    }

    fn on_disconnected(&mut self, reason: i32) {
        tracing::warn!(reason, "Disconnected from market data front");
        self.state = SessionState::Disconnected;
    }

    // =========================================================================
    // Dispatch Pipeline
    // =========================================================================

    fn on_tick(&mut self, tick: TickEvent) {
        // Downstream consumers key exclusively on the dense id, so a tick the
        // directory cannot resolve is dropped whole.
        let Some(id) = self.directory.resolve(&tick.symbol) else {
            tracing::warn!(symbol = %tick.symbol, "Dropping tick for unknown instrument");
            return;
        };

        if !self.received.is_seen(id) {
            let record = Record::Static(StaticRecord {
                instrument: id,
                prev_close: tick.prev_close,
                upper_limit: tick.upper_limit,
                lower_limit: tick.lower_limit,
            });
            if !self.tx.write(record) {
                tracing::error!(instrument = id, "Failed to write static record to channel");
            }
            // Marked regardless of the write outcome: at most one static
            // record per instrument per session.
            self.received.mark(id);
        }

        let record = Record::Depth(DepthRecord {
            instrument: id,
            open: tick.open,
            high: tick.high,
            low: tick.low,
            last: tick.last,
            open_interest: tick.open_interest,
            volume: tick.volume,
            turnover: tick.turnover,
            asks: tick.asks,
            bids: tick.bids,
        });
        if !self.tx.write(record) {
            tracing::error!(instrument = id, "Failed to write depth record to channel");
        }
    }

    fn rebuild_interest(&mut self) {
        let resolved: Vec<_> = self
            .configured
            .iter()
            .filter_map(|symbol| self.directory.resolve(symbol))
            .collect();
        self.interest = InterestSet::rebuild(self.directory.count(), resolved);
    }
}

// =============================================================================
// Tests
// =============================================================================
