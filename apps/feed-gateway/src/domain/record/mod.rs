//! Normalized Record Types
//!
//! The two record kinds the gateway emits onto the transmission channel:
//!
//! - [`StaticRecord`]: reference data constant for the trading day, emitted
//!   once per instrument per session.
//! - [`DepthRecord`]: the latest full snapshot for one instrument, emitted on
//!   every tick. Superseding, not accumulating — each record replaces the
//!   previous one, it is never a delta.
//!
//! All numeric fields carry the feed's native precision: prices, turnover and
//! open interest as `f64`, volumes as `i64`. The pipeline performs no
//! rounding or unit conversion.

use serde::{Deserialize, Serialize};

use crate::domain::instrument::InstrumentId;

// =============================================================================
// Book Level
// =============================================================================

/// One price level of one side of the book.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    /// Quoted price at this level.
    pub price: f64,
    /// Resting volume at this level.
    pub volume: i64,
}

impl BookLevel {
    /// Create a new book level.
    #[must_use]
    pub const fn new(price: f64, volume: i64) -> Self {
        Self { price, volume }
    }
}

// =============================================================================
// Static Record
// =============================================================================

/// Per-session reference data for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticRecord {
    /// Dense instrument id.
    pub instrument: InstrumentId,
    /// Previous session's close price.
    pub prev_close: f64,
    /// Upper price limit for the trading day.
    pub upper_limit: f64,
    /// Lower price limit for the trading day.
    pub lower_limit: f64,
}

// =============================================================================
// Depth Record
// =============================================================================

/// Full market snapshot for one instrument at one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthRecord {
    /// Dense instrument id.
    pub instrument: InstrumentId,
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
    /// Ask levels, best first.
    pub asks: Vec<BookLevel>,
    /// Bid levels, best first.
    pub bids: Vec<BookLevel>,
}

// =============================================================================
// Record
// =============================================================================

/// A record accepted by the transmission channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Record {
    /// One-shot reference data.
    Static(StaticRecord),
    /// Per-tick snapshot.
    Depth(DepthRecord),
}

impl Record {
    /// The instrument this record describes.
    #[must_use]
    pub const fn instrument(&self) -> InstrumentId {
        match self {
            Self::Static(r) => r.instrument,
            Self::Depth(r) => r.instrument,
        }
    }

    /// The record kind, for logging and metrics labels.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::Static(_) => RecordKind::Static,
            Self::Depth(_) => RecordKind::Depth,
        }
    }
}

/// Discriminant of a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Reference data record.
    Static,
    /// Snapshot record.
    Depth,
}

impl RecordKind {
    /// Stable label name for logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Depth => "depth",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
