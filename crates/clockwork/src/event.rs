// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;

/// An immutable, timestamped log message.
///
/// Events are created only by [`ClockModel::append_event`][crate::ClockModel::append_event], which
/// stamps the message with the value of the time source that was active at the moment of the append.
/// The timestamp therefore carries the semantics of that time source: milliseconds since the UNIX
/// epoch for the wall clock, elapsed milliseconds for the stopwatch.
///
/// Listeners receive clones of events; an event is never mutated after creation.
///
/// # Examples
///
/// ```
/// use clockwork::Event;
///
/// let event = Event::new(1_500, "Tick");
///
/// assert_eq!(event.timestamp_millis(), 1_500);
/// assert_eq!(event.message(), "Tick");
/// assert_eq!(event.to_string(), "[1500] Tick");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    timestamp_millis: i64,
    message: String,
}

impl Event {
    /// Creates an event with the given timestamp and message.
    #[must_use]
    pub fn new(timestamp_millis: i64, message: impl Into<String>) -> Self {
        Self {
            timestamp_millis,
            message: message.into(),
        }
    }

    /// Returns the time source value captured when the event was appended.
    #[must_use]
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp_millis
    }

    /// Returns the event message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp_millis, self.message)
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assert_types() {
        static_assertions::assert_impl_all!(Event: Send, Sync, Clone);
    }

    #[test]
    fn display_negative_timestamp() {
        let event = Event::new(-5, "before epoch");

        assert_eq!(event.to_string(), "[-5] before epoch");
    }
}
