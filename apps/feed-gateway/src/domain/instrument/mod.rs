//! Instrument Identity and Tracking Vectors
//!
//! The instrument directory assigns each tradable instrument a dense,
//! non-negative integer id that is stable for the directory's lifetime.
//! The gateway derives two projections from it:
//!
//! - [`InterestSet`]: which instruments this session should receive and
//!   forward data for.
//! - [`ReceptionTracker`]: which instruments have already had their one-time
//!   static record emitted in the current session.
//!
//! Both are rebuildable projections, never sources of truth: the interest
//! set is rebuilt whenever the subscription list changes, the tracker is
//! reset on every successful login.

// =============================================================================
// Types
// =============================================================================

/// Dense instrument identifier assigned by the instrument directory.
///
/// Unknown symbols are represented as `None` at the resolve boundary
/// rather than a sentinel value.
pub type InstrumentId = usize;

/// An exchange instrument symbol (e.g. a futures contract code).
pub type Symbol = String;

// =============================================================================
// Interest Set
// =============================================================================

/// Dense boolean vector marking the instruments this session wants.
///
/// Indexed by [`InstrumentId`]; length equals the directory instrument count
/// at the time of the last rebuild. Reflects *desired* subscriptions, not
/// confirmed ones: subscribe acknowledgments never feed back into it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterestSet {
    flags: Vec<bool>,
}

impl InterestSet {
    /// Rebuild the set from resolved instrument ids.
    ///
    /// `count` is the directory instrument count; ids at or beyond it are
    /// ignored (they cannot have come from the same directory snapshot).
    #[must_use]
    pub fn rebuild(count: usize, ids: impl IntoIterator<Item = InstrumentId>) -> Self {
        let mut flags = vec![false; count];
        for id in ids {
            if let Some(flag) = flags.get_mut(id) {
                *flag = true;
            }
        }
        Self { flags }
    }

    /// Check whether an instrument is in the interest set.
    #[must_use]
    pub fn contains(&self, id: InstrumentId) -> bool {
        self.flags.get(id).copied().unwrap_or(false)
    }

    /// Iterate over the ids of all interested instruments, in id order.
    pub fn ids(&self) -> impl Iterator<Item = InstrumentId> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(id, &set)| set.then_some(id))
    }

    /// Length of the underlying vector (== directory count at rebuild time).
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Check whether the vector is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Number of instruments currently marked interested.
    #[must_use]
    pub fn interested_count(&self) -> usize {
        self.flags.iter().filter(|&&set| set).count()
    }
}

// =============================================================================
// Reception Tracker
// =============================================================================

/// Dense boolean vector marking instruments whose static record was emitted.
///
/// Reset to all-false (sized to the directory count) at the start of each
/// session. [`ReceptionTracker::mark`] grows the vector on demand so ids
/// assigned after the reset (directory grew mid-session) stay addressable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceptionTracker {
    seen: Vec<bool>,
}

impl ReceptionTracker {
    /// Reset to all-false with one entry per known instrument.
    pub fn reset(&mut self, count: usize) {
        self.seen.clear();
        self.seen.resize(count, false);
    }

    /// Mark an instrument's static record as emitted this session.
    pub fn mark(&mut self, id: InstrumentId) {
        if id >= self.seen.len() {
            self.seen.resize(id + 1, false);
        }
        self.seen[id] = true;
    }

    /// Check whether the static record was already emitted for an instrument.
    #[must_use]
    pub fn is_seen(&self, id: InstrumentId) -> bool {
        self.seen.get(id).copied().unwrap_or(false)
    }

    /// Length of the underlying vector.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Check whether the vector is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
