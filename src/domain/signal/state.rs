//! Signal state containers: app-owned, SDK-provided update logic.

use super::Signal;
use crate::network::RECENT_SIGNALS_CAPACITY;
use crate::shared::Timestamp;
use std::collections::{HashMap, VecDeque};

/// Bounded, newest-first list of recently observed signals.
///
/// Index 0 is always the most recently pushed signal; the list never holds
/// more than `capacity` entries.
#[derive(Debug, Clone)]
pub struct RecentSignals {
    signals: VecDeque<Signal>,
    capacity: usize,
}

impl Default for RecentSignals {
    fn default() -> Self {
        Self::new(RECENT_SIGNALS_CAPACITY)
    }
}

impl RecentSignals {
    pub fn new(capacity: usize) -> Self {
        Self {
            signals: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepend a new signal, returning the oldest one if it was evicted.
    pub fn push(&mut self, signal: Signal) -> Option<Signal> {
        if self.capacity == 0 {
            return Some(signal);
        }
        let evicted = if self.signals.len() >= self.capacity {
            self.signals.pop_back()
        } else {
            None
        };
        self.signals.push_front(signal);
        evicted
    }

    /// Replace all signals with an already newest-first list, truncated to capacity.
    pub fn replace(&mut self, newest_first: Vec<Signal>) {
        self.signals.clear();
        self.signals
            .extend(newest_first.into_iter().take(self.capacity));
    }

    pub fn signals(&self) -> &VecDeque<Signal> {
        &self.signals
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter()
    }

    pub fn latest(&self) -> Option<&Signal> {
        self.signals.front()
    }

    /// The signal a chart row at `timestamp` is paired with.
    ///
    /// When several listed signals share the timestamp, the oldest listed one wins.
    pub fn find(&self, timestamp: &Timestamp) -> Option<&Signal> {
        self.signals.iter().rev().find(|s| &s.timestamp == timestamp)
    }

    /// Timestamp → signal lookup with the same precedence as [`Self::find`].
    pub fn by_timestamp(&self) -> HashMap<&Timestamp, &Signal> {
        let mut index = HashMap::with_capacity(self.signals.len());
        for signal in self.signals.iter().rev() {
            index.entry(&signal.timestamp).or_insert(signal);
        }
        index
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.signals.clear();
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}
