//! Record Transmission Channel Adapter
//!
//! Implements record distribution using tokio broadcast channels for
//! efficient fan-out to multiple downstream consumers (pricing, risk,
//! strategy engines).
//!
//! # Architecture
//!
//! The [`RecordHub`] provides one channel per record kind with configurable
//! capacity. Writes never block: a record nobody is listening for is dropped
//! and reported as a failed write, and a lagging receiver observes a gap —
//! both are acceptable under the gateway's best-effort delivery contract.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::application::ports::TransmissionChannel;
use crate::domain::record::{DepthRecord, Record, RecordKind, StaticRecord};
use crate::infrastructure::metrics;

// =============================================================================
// Configuration
// =============================================================================

/// Capacities for the per-kind broadcast channels.
#[derive(Debug, Clone, Copy)]
pub struct ChannelConfig {
    /// Capacity of the static record channel.
    pub static_capacity: usize,
    /// Capacity of the depth record channel.
    pub depth_capacity: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            static_capacity: 1_000,
            depth_capacity: 10_000,
        }
    }
}

// =============================================================================
// Record Hub
// =============================================================================

/// Central hub for outbound record distribution.
///
/// # Example
///
/// ```rust
/// use feed_gateway::infrastructure::channel::{ChannelConfig, RecordHub};
///
/// let hub = RecordHub::new(ChannelConfig::default());
///
/// // Downstream consumer
/// let mut rx = hub.depth_rx();
///
/// // In the session task: hub.write(record)
/// ```
#[derive(Debug)]
pub struct RecordHub {
    static_tx: broadcast::Sender<StaticRecord>,
    depth_tx: broadcast::Sender<DepthRecord>,
}

impl RecordHub {
    /// Create a new hub with the given capacities.
    #[must_use]
    pub fn new(config: ChannelConfig) -> Self {
        Self {
            static_tx: broadcast::channel(config.static_capacity).0,
            depth_tx: broadcast::channel(config.depth_capacity).0,
        }
    }

    /// Create a new hub with default capacities.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ChannelConfig::default())
    }

    /// Send a static record to all subscribers.
    ///
    /// Returns the number of receivers that got the record, or `None` if
    /// there are no active receivers.
    #[must_use]
    pub fn write_static(&self, record: StaticRecord) -> Option<usize> {
        self.static_tx.send(record).ok()
    }

    /// Send a depth record to all subscribers.
    #[must_use]
    pub fn write_depth(&self, record: DepthRecord) -> Option<usize> {
        self.depth_tx.send(record).ok()
    }

    /// Get a new receiver for static records.
    #[must_use]
    pub fn static_rx(&self) -> broadcast::Receiver<StaticRecord> {
        self.static_tx.subscribe()
    }

    /// Get a new receiver for depth records.
    #[must_use]
    pub fn depth_rx(&self) -> broadcast::Receiver<DepthRecord> {
        self.depth_tx.subscribe()
    }

    /// Number of active static record receivers.
    #[must_use]
    pub fn static_receiver_count(&self) -> usize {
        self.static_tx.receiver_count()
    }

    /// Number of active depth record receivers.
    #[must_use]
    pub fn depth_receiver_count(&self) -> usize {
        self.depth_tx.receiver_count()
    }

    /// Get statistics about both channels.
    #[must_use]
    pub fn stats(&self) -> ChannelStats {
        ChannelStats {
            static_receivers: self.static_receiver_count(),
            depth_receivers: self.depth_receiver_count(),
        }
    }
}

impl TransmissionChannel for RecordHub {
    fn write(&self, record: Record) -> bool {
        let kind = record.kind();
        let delivered = match record {
            Record::Static(r) => self.write_static(r),
            Record::Depth(r) => self.write_depth(r),
        };

        match delivered {
            Some(receivers) => {
                metrics::record_written(kind, receivers as u64);
                true
            }
            None => {
                metrics::record_dropped(kind);
                false
            }
        }
    }
}

/// Shared record hub reference.
pub type SharedRecordHub = Arc<RecordHub>;

/// Statistics about the record channels.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelStats {
    /// Number of static record receivers.
    pub static_receivers: usize,
    /// Number of depth record receivers.
    pub depth_receivers: usize,
}

impl ChannelStats {
    /// Total receivers across both channels.
    #[must_use]
    pub const fn total_receivers(&self) -> usize {
        self.static_receivers + self.depth_receivers
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::domain::record::BookLevel;

    use super::*;

    fn static_record() -> StaticRecord {
        StaticRecord {
            instrument: 0,
            prev_close: 100.0,
            upper_limit: 110.0,
            lower_limit: 90.0,
        }
    }

    fn depth_record(last: f64) -> DepthRecord {
        DepthRecord {
            instrument: 0,
            open: 101.0,
            high: 107.0,
            low: 99.5,
            last,
            open_interest: 5_000.0,
            volume: 10,
            turnover: last * 10.0,
            asks: vec![BookLevel::new(last + 0.5, 3)],
            bids: vec![BookLevel::new(last - 0.5, 7)],
        }
    }

    #[test]
    fn hub_starts_with_no_receivers() {
        let hub = RecordHub::with_defaults();
        assert_eq!(hub.static_receiver_count(), 0);
        assert_eq!(hub.depth_receiver_count(), 0);
        assert_eq!(hub.stats().total_receivers(), 0);
    }

    #[test]
    fn write_without_receivers_fails() {
        let hub = RecordHub::with_defaults();

        assert!(!hub.write(Record::Static(static_record())));
        assert!(!hub.write(Record::Depth(depth_record(105.0))));
    }

    #[tokio::test]
    async fn write_reaches_all_receivers() {
        let hub = RecordHub::with_defaults();
        let mut rx1 = hub.depth_rx();
        let mut rx2 = hub.depth_rx();

        assert!(hub.write(Record::Depth(depth_record(105.0))));

        let r1 = rx1.recv().await.unwrap();
        let r2 = rx2.recv().await.unwrap();
        assert_eq!(r1.last, 105.0);
        assert_eq!(r1, r2);
    }

    #[tokio::test]
    async fn kinds_are_routed_to_their_own_channels() {
        let hub = RecordHub::with_defaults();
        let mut static_rx = hub.static_rx();
        let mut depth_rx = hub.depth_rx();

        assert!(hub.write(Record::Static(static_record())));
        assert!(hub.write(Record::Depth(depth_record(105.0))));

        assert_eq!(static_rx.recv().await.unwrap().prev_close, 100.0);
        assert_eq!(depth_rx.recv().await.unwrap().last, 105.0);
    }

    #[test]
    fn receiver_count_tracks_drops() {
        let hub = RecordHub::with_defaults();
        {
            let _rx = hub.static_rx();
            assert_eq!(hub.static_receiver_count(), 1);
        }
        assert_eq!(hub.static_receiver_count(), 0);
    }

    #[tokio::test]
    async fn lagging_receiver_observes_a_gap_not_an_error_loop() {
        let hub = RecordHub::new(ChannelConfig {
            static_capacity: 4,
            depth_capacity: 2,
        });
        let mut rx = hub.depth_rx();

        for i in 0..5 {
            assert!(hub.write(Record::Depth(depth_record(100.0 + f64::from(i)))));
        }

        // Oldest records were overwritten; the receiver skips the gap and
        // continues with the newest ones.
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
        assert_eq!(rx.recv().await.unwrap().last, 103.0);
        assert_eq!(rx.recv().await.unwrap().last, 104.0);
    }
}
