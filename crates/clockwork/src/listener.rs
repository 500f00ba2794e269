// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;
use std::sync::Arc;

use crate::Event;

/// Identifies a registered listener so that it can be unsubscribed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a UI-affine listener wants to hear about changes to the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventStyle {
    /// Every change resends the full, ordered list of retained events.
    Snapshot,
    /// Every change is reported as individual additions and removals.
    Delta,
}

/// A change delivered to UI-affine listeners on the UI dispatch queue.
///
/// Payloads are immutable copies; holding on to them never blocks the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The active time source produced a new value, in milliseconds.
    TimeUpdated(i64),
    /// A different time source became active; carries its label.
    ModeChanged(String),
    /// The full, ordered list of retained events. Sent to [`EventStyle::Snapshot`] listeners.
    EventsUpdated(Arc<[Event]>),
    /// An event entered the log. Sent to [`EventStyle::Delta`] listeners.
    EventAdded(Event),
    /// An event left the log, through eviction or clearing. Sent to [`EventStyle::Delta`] listeners.
    EventRemoved(Event),
}

/// A listener whose callbacks run on the UI dispatch queue.
///
/// Callbacks never run concurrently with each other or with anything else scheduled on the
/// same queue, and they observe notifications in the order the model enqueued them. Each
/// callback has an empty default implementation, so listeners only implement what they render.
///
/// A panic raised by a callback is caught and logged. It does not prevent delivery to other
/// listeners and does not affect the model.
///
/// # Examples
///
/// ```
/// use clockwork::{Event, UiListener};
///
/// #[derive(Debug)]
/// struct Title;
///
/// impl UiListener for Title {
///     fn on_mode_changed(&self, label: &str) {
///         println!("mode: {label}");
///     }
/// }
/// ```
pub trait UiListener: Send + Sync {
    /// Called when the active time source produces a new value.
    fn on_time_updated(&self, millis: i64) {
        let _ = millis;
    }

    /// Called when a different time source becomes active.
    fn on_mode_changed(&self, label: &str) {
        let _ = label;
    }

    /// Called with the full list of retained events, oldest first.
    fn on_events_updated(&self, events: &[Event]) {
        let _ = events;
    }

    /// Called when an event enters the log.
    fn on_event_added(&self, event: &Event) {
        let _ = event;
    }

    /// Called when an event leaves the log.
    fn on_event_removed(&self, event: &Event) {
        let _ = event;
    }

    /// Receives every notification. The default routes to the specific callbacks above.
    fn on_notification(&self, notification: &Notification) {
        match notification {
            Notification::TimeUpdated(millis) => self.on_time_updated(*millis),
            Notification::ModeChanged(label) => self.on_mode_changed(label),
            Notification::EventsUpdated(events) => self.on_events_updated(events),
            Notification::EventAdded(event) => self.on_event_added(event),
            Notification::EventRemoved(event) => self.on_event_removed(event),
        }
    }
}

/// A listener that receives appended events synchronously on the mutating thread.
///
/// Data listeners are invoked right after the mutation completes, on whichever thread performed
/// it (usually the ticking thread). They must be fast and must not touch UI state directly.
///
/// Closures taking `(timestamp_millis, message)` implement this trait.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use clockwork::DataListener;
///
/// let listener: Arc<dyn DataListener> = Arc::new(|ts: i64, message: &str| {
///     println!("{message} @ {ts}");
/// });
/// listener.on_new_value(7, "Tick");
/// ```
pub trait DataListener: Send + Sync {
    /// Called with the timestamp and message of a newly appended event.
    fn on_new_value(&self, timestamp_millis: i64, message: &str);
}

impl<F> DataListener for F
where
    F: Fn(i64, &str) + Send + Sync,
{
    fn on_new_value(&self, timestamp_millis: i64, message: &str) {
        self(timestamp_millis, message);
    }
}
