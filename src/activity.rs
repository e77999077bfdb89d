//! Rolling window of recent transactions shown under the tables. Only the
//! newest few entries are kept; this is a status display, not an audit trail.

use std::collections::VecDeque;
use std::fmt;

use chrono::{Local, NaiveTime};

/// Entries kept before the oldest one is evicted.
pub const ACTIVITY_CAPACITY: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub timestamp: NaiveTime,
    pub message: String,
}

impl fmt::Display for ActivityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
    capacity: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::with_capacity(ACTIVITY_CAPACITY)
    }
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A zero capacity is bumped to one so the latest entry is always visible.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Stamp the message with the current local time and append it.
    pub fn record(&mut self, message: impl Into<String>) {
        self.record_at(Local::now().time(), message);
    }

    /// Append with an explicit timestamp, evicting the oldest entry once the
    /// window is full.
    pub fn record_at(&mut self, timestamp: NaiveTime, message: impl Into<String>) {
        self.entries.push_back(ActivityEntry {
            timestamp,
            message: message.into(),
        });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Rendered entries, oldest first.
    pub fn snapshot(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
