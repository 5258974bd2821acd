//! Simulated Feed Endpoint
//!
//! A deterministic in-process feed for local runs and integration tests.
//! Submissions enqueue the protocol responses a live feed would deliver
//! (login acknowledgment, per-instrument subscribe/unsubscribe acks), and
//! once instruments are subscribed, [`SimFeed::poll`] synthesizes tick
//! events round-robin with a fixed arithmetic price walk.
//!
//! No wall-clock and no randomness: the same call sequence always produces
//! the same event sequence.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::application::ports::{Credentials, FeedEndpoint, SubmitError};
use crate::domain::instrument::Symbol;
use crate::domain::record::BookLevel;
use crate::domain::session::{AckStatus, FeedEvent, TickEvent};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the simulated feed.
#[derive(Debug, Clone)]
pub struct SimFeedConfig {
    /// Trading day reported by the login acknowledgment.
    pub trading_day: String,
    /// Base price for the first subscribed instrument; each further
    /// instrument trades 10.0 higher.
    pub base_price: f64,
}

impl Default for SimFeedConfig {
    fn default() -> Self {
        Self {
            trading_day: "20000103".to_string(),
            base_price: 100.0,
        }
    }
}

// =============================================================================
// Sim Feed
// =============================================================================

#[derive(Debug)]
struct SimFeedState {
    connected: bool,
    subscribed: Vec<Symbol>,
    queue: VecDeque<FeedEvent>,
    seq: u64,
    cursor: usize,
}

/// Cloneable handle to the simulated feed.
///
/// One clone acts as the session's [`FeedEndpoint`]; another is polled by
/// the event loop. Everything happens under one lock, matching the
/// sequential, non-reentrant delivery a vendor transport guarantees.
#[derive(Debug, Clone)]
pub struct SimFeed {
    config: Arc<SimFeedConfig>,
    state: Arc<Mutex<SimFeedState>>,
}

impl SimFeed {
    /// Create a disconnected simulated feed.
    #[must_use]
    pub fn new(config: SimFeedConfig) -> Self {
        Self {
            config: Arc::new(config),
            state: Arc::new(Mutex::new(SimFeedState {
                connected: false,
                subscribed: Vec::new(),
                queue: VecDeque::new(),
                seq: 0,
                cursor: 0,
            })),
        }
    }

    /// Establish the simulated transport connection.
    pub fn connect(&self) {
        let mut state = self.state.lock();
        state.connected = true;
        state.queue.push_back(FeedEvent::Connected);
    }

    /// Drop the simulated transport connection.
    ///
    /// Subscriptions die with the connection, as they do on a live feed.
    pub fn disconnect(&self, reason: i32) {
        let mut state = self.state.lock();
        state.connected = false;
        state.subscribed.clear();
        state.queue.push_back(FeedEvent::Disconnected { reason });
    }

    /// Take the next event, synthesizing a tick when the queue is drained.
    ///
    /// Returns `None` when disconnected or nothing is subscribed.
    #[must_use]
    pub fn poll(&self) -> Option<FeedEvent> {
        let mut state = self.state.lock();

        if let Some(event) = state.queue.pop_front() {
            return Some(event);
        }

        if !state.connected || state.subscribed.is_empty() {
            return None;
        }

        let index = state.cursor % state.subscribed.len();
        state.cursor = state.cursor.wrapping_add(1);
        state.seq += 1;

        let symbol = state.subscribed[index].clone();
        Some(FeedEvent::Tick(self.synthesize(symbol, index, state.seq)))
    }

    /// Build one deterministic tick for a subscribed instrument.
    #[allow(clippy::cast_precision_loss)]
    fn synthesize(&self, symbol: Symbol, index: usize, seq: u64) -> TickEvent {
        let base = self.config.base_price + 10.0 * index as f64;
        // Sawtooth around the base: ±2.0 in 0.5 steps.
        let last = base + (seq % 9) as f64 * 0.5 - 2.0;
        let volume = seq as i64;

        TickEvent {
            symbol,
            prev_close: base,
            upper_limit: base + 10.0,
            lower_limit: base - 10.0,
            open: base - 0.5,
            high: base + 2.5,
            low: base - 2.5,
            last,
            open_interest: base * 40.0,
            volume,
            turnover: last * volume as f64,
            bids: vec![BookLevel::new(last - 0.5, 5 + (seq % 7) as i64)],
            asks: vec![BookLevel::new(last + 0.5, 4 + (seq % 5) as i64)],
        }
    }
}

impl FeedEndpoint for SimFeed {
    fn submit_login(&mut self, _credentials: &Credentials) -> Result<(), SubmitError> {
        let mut state = self.state.lock();
        if !state.connected {
            return Err(SubmitError::NotConnected);
        }

        let trading_day = self.config.trading_day.clone();
        state
            .queue
            .push_back(FeedEvent::LoginAccepted { trading_day });
        Ok(())
    }

    fn submit_subscribe(&mut self, symbols: &[Symbol]) -> Result<(), SubmitError> {
        let mut state = self.state.lock();
        if !state.connected {
            return Err(SubmitError::NotConnected);
        }

        for symbol in symbols {
            if !state.subscribed.contains(symbol) {
                state.subscribed.push(symbol.clone());
            }
            state.queue.push_back(FeedEvent::SubscribeAck {
                symbol: symbol.clone(),
                status: AckStatus::ok(),
            });
        }
        Ok(())
    }

    fn submit_unsubscribe(&mut self, symbols: &[Symbol]) -> Result<(), SubmitError> {
        let mut state = self.state.lock();
        if !state.connected {
            return Err(SubmitError::NotConnected);
        }

        for symbol in symbols {
            state.subscribed.retain(|s| s != symbol);
            state.queue.push_back(FeedEvent::UnsubscribeAck {
                symbol: symbol.clone(),
                status: AckStatus::ok(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
