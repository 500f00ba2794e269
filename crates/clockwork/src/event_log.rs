// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::Event;

/// A bounded first-in, first-out sequence of [`Event`] values.
///
/// The log never holds more than its capacity. Appending to a full log evicts the oldest
/// event first, and the evicted event is handed back to the caller so that it can be reported
/// to listeners as a removal.
///
/// The log performs no synchronization of its own. [`ClockModel`][crate::ClockModel] keeps it
/// inside its exclusive section and hands out [`snapshot`][Self::snapshot] copies to readers.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use clockwork::EventLog;
///
/// let mut log = EventLog::new(NonZeroUsize::new(3).unwrap());
/// for (ts, msg) in [(1, "a"), (2, "b"), (3, "c"), (4, "d")] {
///     log.append(ts, msg);
/// }
///
/// let messages: Vec<_> = log.snapshot().iter().map(|e| e.message().to_owned()).collect();
/// assert_eq!(messages, ["b", "c", "d"]);
/// ```
#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<Event>,
    capacity: NonZeroUsize,
}

/// The outcome of [`EventLog::append`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appended {
    /// The event that was created and stored.
    pub event: Event,
    /// The oldest event, if it had to make room for the new one.
    pub evicted: Option<Event>,
}

impl EventLog {
    /// Creates an empty log that retains at most `capacity` events.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.get()),
            capacity,
        }
    }

    /// Stamps `message` with the caller-supplied timestamp and stores it.
    ///
    /// The timestamp comes from the caller rather than from the log so that it always reflects
    /// the time source that was active when the append happened.
    pub fn append(&mut self, timestamp_millis: i64, message: impl Into<String>) -> Appended {
        let evicted = if self.events.len() >= self.capacity.get() {
            self.events.pop_front()
        } else {
            None
        };

        if let Some(evicted) = &evicted {
            tracing::trace!(evicted = %evicted, "event log full, evicted oldest event");
        }

        let event = Event::new(timestamp_millis, message);
        self.events.push_back(event.clone());

        Appended { event, evicted }
    }

    /// Returns an immutable copy of the events, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Arc<[Event]> {
        self.events.iter().cloned().collect()
    }

    /// Removes every event and returns them, oldest first.
    pub fn clear(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    /// Returns the number of events currently retained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if the log holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the maximum number of events the log retains.
    #[must_use]
    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    fn log_with_capacity(capacity: usize) -> EventLog {
        EventLog::new(NonZeroUsize::new(capacity).unwrap())
    }

    fn messages(log: &EventLog) -> Vec<String> {
        log.snapshot().iter().map(|e| e.message().to_owned()).collect()
    }

    #[test]
    fn append_below_capacity_keeps_everything() {
        let mut log = log_with_capacity(3);

        let appended = log.append(10, "a");

        assert_eq!(appended.event, Event::new(10, "a"));
        assert_eq!(appended.evicted, None);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn append_beyond_capacity_evicts_oldest() {
        let mut log = log_with_capacity(3);
        log.append(1, "a");
        log.append(2, "b");
        log.append(3, "c");

        let appended = log.append(4, "d");

        assert_eq!(appended.evicted, Some(Event::new(1, "a")));
        assert_eq!(messages(&log), ["b", "c", "d"]);
    }

    #[test]
    fn length_never_exceeds_capacity() {
        for capacity in 1..=5 {
            for extra in 0..=4 {
                let mut log = log_with_capacity(capacity);
                let total = capacity + extra;

                for i in 0..total {
                    log.append(i64::try_from(i).unwrap(), i.to_string());
                }

                let expected: Vec<String> = (total - capacity..total).map(|i| i.to_string()).collect();
                assert_eq!(log.len(), capacity);
                assert_eq!(messages(&log), expected);
            }
        }
    }

    #[test]
    fn capacity_one_replaces_each_time() {
        let mut log = log_with_capacity(1);
        log.append(1, "first");

        let appended = log.append(2, "second");

        assert_eq!(appended.evicted.unwrap().message(), "first");
        assert_eq!(messages(&log), ["second"]);
    }

    #[test]
    fn clear_returns_removed_in_order() {
        let mut log = log_with_capacity(4);
        log.append(1, "a");
        log.append(2, "b");

        let removed = log.clear();

        assert_eq!(removed, [Event::new(1, "a"), Event::new(2, "b")]);
        assert!(log.is_empty());
    }

    #[test]
    fn snapshot_is_detached_from_log() {
        let mut log = log_with_capacity(2);
        log.append(1, "a");

        let snapshot = log.snapshot();
        log.append(2, "b");
        log.clear();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].message(), "a");
    }
}
