//! Dispatch Pipeline Integration Tests
//!
//! Exercises the normalization-and-dispatch contract with scripted feed
//! events: exact subscribe sets, one-static-then-depth cadence, write
//! failure independence, and field pass-through.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use test_case::test_case;

use feed_gateway::{
    BookLevel, Credentials, FeedEndpoint, FeedEvent, InMemoryDirectory, MarketSession, Record,
    RecordKind, SessionState, SubmitError, Symbol, TickEvent, TransmissionChannel,
};

// =============================================================================
// Scripted fakes
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Submission {
    Login,
    Subscribe(Vec<Symbol>),
    Unsubscribe(Vec<Symbol>),
}

/// Feed endpoint that records every submission and always accepts.
#[derive(Debug, Default, Clone)]
struct RecordingFeed {
    log: Arc<Mutex<Vec<Submission>>>,
}

impl RecordingFeed {
    fn submissions(&self) -> Vec<Submission> {
        self.log.lock().unwrap().clone()
    }

    fn subscribe_sets(&self) -> Vec<Vec<Symbol>> {
        self.submissions()
            .into_iter()
            .filter_map(|s| match s {
                Submission::Subscribe(symbols) => Some(symbols),
                _ => None,
            })
            .collect()
    }
}

impl FeedEndpoint for RecordingFeed {
    fn submit_login(&mut self, _credentials: &Credentials) -> Result<(), SubmitError> {
        self.log.lock().unwrap().push(Submission::Login);
        Ok(())
    }

    fn submit_subscribe(&mut self, symbols: &[Symbol]) -> Result<(), SubmitError> {
        self.log
            .lock()
            .unwrap()
            .push(Submission::Subscribe(symbols.to_vec()));
        Ok(())
    }

    fn submit_unsubscribe(&mut self, symbols: &[Symbol]) -> Result<(), SubmitError> {
        self.log
            .lock()
            .unwrap()
            .push(Submission::Unsubscribe(symbols.to_vec()));
        Ok(())
    }
}

/// Channel that collects accepted records; static writes can be rejected.
#[derive(Debug, Default, Clone)]
struct SinkProbe {
    records: Arc<Mutex<Vec<Record>>>,
    reject_static: bool,
}

impl SinkProbe {
    fn rejecting_static() -> Self {
        Self {
            reject_static: true,
            ..Self::default()
        }
    }

    fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }

    fn count(&self, kind: RecordKind) -> usize {
        self.records()
            .iter()
            .filter(|r| r.kind() == kind)
            .count()
    }
}

impl TransmissionChannel for SinkProbe {
    fn write(&self, record: Record) -> bool {
        if self.reject_static && record.kind() == RecordKind::Static {
            return false;
        }
        self.records.lock().unwrap().push(record);
        true
    }
}

// =============================================================================
// Helpers
// =============================================================================

type Session = MarketSession<Arc<InMemoryDirectory>, RecordingFeed, SinkProbe>;

fn session_with(symbols: &[&str], feed: RecordingFeed, sink: SinkProbe) -> Session {
    MarketSession::new(
        Arc::new(InMemoryDirectory::from_symbols(symbols.iter().copied())),
        feed,
        sink,
        Credentials::new("9999", "trader01", "secret"),
    )
}

fn login(session: &mut Session) {
    session.handle(FeedEvent::Connected);
    session.handle(FeedEvent::LoginAccepted {
        trading_day: "20260807".to_string(),
    });
}

fn tick(symbol: &str, last: f64, volume: i64) -> TickEvent {
    TickEvent {
        symbol: symbol.to_string(),
        prev_close: 100.0,
        upper_limit: 110.0,
        lower_limit: 90.0,
        open: 100.5,
        high: 106.5,
        low: 99.0,
        last,
        open_interest: 4_000.0,
        volume,
        turnover: last * volume as f64,
        bids: vec![BookLevel::new(last - 0.5, 8)],
        asks: vec![BookLevel::new(last + 0.5, 6)],
    }
}

// =============================================================================
// End-to-end scenario
// =============================================================================

#[test]
fn end_to_end_interest_login_two_ticks() {
    let feed = RecordingFeed::default();
    let sink = SinkProbe::default();
    let mut session = session_with(&["A", "B"], feed.clone(), sink.clone());

    session.configure_interest(vec!["A".to_string(), "B".to_string()]);
    login(&mut session);

    // Subscribe request contains exactly {A, B}.
    let sets = feed.subscribe_sets();
    assert_eq!(sets.len(), 1);
    let mut symbols = sets[0].clone();
    symbols.sort();
    assert_eq!(symbols, vec!["A".to_string(), "B".to_string()]);

    // First tick for A.
    session.handle(FeedEvent::Tick(tick("A", 105.0, 10)));

    let records = sink.records();
    assert_eq!(records.len(), 2);
    let Record::Static(st) = &records[0] else {
        panic!("expected the static record first, got {records:?}");
    };
    assert_eq!(st.instrument, 0);
    assert_eq!(st.prev_close, 100.0);
    assert_eq!(st.upper_limit, 110.0);
    assert_eq!(st.lower_limit, 90.0);
    let Record::Depth(depth) = &records[1] else {
        panic!("expected a depth record second, got {records:?}");
    };
    assert_eq!(depth.instrument, 0);
    assert_eq!(depth.last, 105.0);
    assert_eq!(depth.volume, 10);

    // Second tick for A: reception already marked, depth only.
    session.handle(FeedEvent::Tick(tick("A", 106.0, 15)));

    let records = sink.records();
    assert_eq!(records.len(), 3);
    let Record::Depth(depth) = &records[2] else {
        panic!("expected a depth record, got {records:?}");
    };
    assert_eq!(depth.last, 106.0);
    assert_eq!(depth.volume, 15);
    assert!(session.reception().is_seen(0));
    assert_eq!(sink.count(RecordKind::Static), 1);
}

// =============================================================================
// Subscribe set exactness
// =============================================================================

#[test]
fn subscribe_never_includes_uninterested_or_unresolved() {
    let feed = RecordingFeed::default();
    let mut session = session_with(
        &["A", "B", "C"],
        feed.clone(),
        SinkProbe::default(),
    );

    session.configure_interest(vec!["B".to_string(), "missing".to_string()]);
    login(&mut session);

    assert_eq!(feed.subscribe_sets(), vec![vec!["B".to_string()]]);
    assert_eq!(session.state(), SessionState::Subscribed);
    assert_eq!(session.interest().len(), 3);
}

// =============================================================================
// Static emission cadence (policy: emit once, on first tick)
// =============================================================================

#[test_case(1; "single tick")]
#[test_case(2; "two ticks")]
#[test_case(5; "five ticks")]
fn static_emitted_exactly_once_per_session(ticks: usize) {
    let sink = SinkProbe::default();
    let mut session = session_with(&["A"], RecordingFeed::default(), sink.clone());
    session.configure_interest(vec!["A".to_string()]);
    login(&mut session);

    for i in 0..ticks {
        session.handle(FeedEvent::Tick(tick("A", 105.0 + i as f64, 10 + i as i64)));
    }

    assert_eq!(sink.count(RecordKind::Static), 1);
    assert_eq!(sink.count(RecordKind::Depth), ticks);
}

#[test]
fn relogin_restarts_the_static_cadence() {
    let sink = SinkProbe::default();
    let mut session = session_with(&["A"], RecordingFeed::default(), sink.clone());
    session.configure_interest(vec!["A".to_string()]);

    login(&mut session);
    session.handle(FeedEvent::Tick(tick("A", 105.0, 10)));

    session.handle(FeedEvent::Disconnected { reason: 0x1001 });
    login(&mut session);
    session.handle(FeedEvent::Tick(tick("A", 106.0, 12)));

    assert_eq!(sink.count(RecordKind::Static), 2);
    assert_eq!(sink.count(RecordKind::Depth), 2);
}

// =============================================================================
// Write failure independence
// =============================================================================

#[test]
fn rejected_static_write_never_blocks_the_depth_write() {
    let sink = SinkProbe::rejecting_static();
    let mut session = session_with(&["A"], RecordingFeed::default(), sink.clone());
    session.configure_interest(vec!["A".to_string()]);
    login(&mut session);

    session.handle(FeedEvent::Tick(tick("A", 105.0, 10)));
    session.handle(FeedEvent::Tick(tick("A", 106.0, 15)));

    // Depth records flow regardless; the dropped static is not re-sent.
    assert_eq!(sink.count(RecordKind::Static), 0);
    assert_eq!(sink.count(RecordKind::Depth), 2);
    assert!(session.reception().is_seen(0));
}

// =============================================================================
// Pass-through properties
// =============================================================================

proptest! {
    #[test]
    fn depth_fields_are_a_pure_pass_through(
        last in 0.01f64..1e6,
        open in 0.01f64..1e6,
        volume in 0i64..10_000_000,
        open_interest in 0.0f64..1e8,
        turnover in 0.0f64..1e12,
        bid_volume in 1i64..100_000,
        ask_volume in 1i64..100_000,
    ) {
        let sink = SinkProbe::default();
        let mut session = session_with(&["A"], RecordingFeed::default(), sink.clone());
        login(&mut session);

        let event = TickEvent {
            symbol: "A".to_string(),
            prev_close: 100.0,
            upper_limit: 110.0,
            lower_limit: 90.0,
            open,
            high: open.max(last),
            low: open.min(last),
            last,
            open_interest,
            volume,
            turnover,
            bids: vec![BookLevel::new(last - 0.5, bid_volume)],
            asks: vec![BookLevel::new(last + 0.5, ask_volume)],
        };
        session.handle(FeedEvent::Tick(event.clone()));

        let records = sink.records();
        let Some(Record::Depth(depth)) = records.last() else {
            panic!("expected a depth record, got {records:?}");
        };
        prop_assert_eq!(depth.last, event.last);
        prop_assert_eq!(depth.open, event.open);
        prop_assert_eq!(depth.high, event.high);
        prop_assert_eq!(depth.low, event.low);
        prop_assert_eq!(depth.volume, event.volume);
        prop_assert_eq!(depth.open_interest, event.open_interest);
        prop_assert_eq!(depth.turnover, event.turnover);
        prop_assert_eq!(&depth.bids, &event.bids);
        prop_assert_eq!(&depth.asks, &event.asks);
    }
}
