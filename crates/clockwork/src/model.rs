// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::any::Any;
use std::fmt;
use std::num::NonZeroUsize;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard, RwLock};

use crate::{
    ClockConfig, DataListener, Error, Event, EventLog, EventStyle, ListenerId, Mode, Notification, Result, TimeSource,
    UiDispatcher, UiListener,
};

/// Holds the active time source and the event log, and fans out every change to listeners.
///
/// The model is the notification core of the clock. It is shared between the ticking thread,
/// which polls it, and the UI thread, which renders what it publishes.
///
/// # Listener categories
///
/// - **UI-affine listeners** ([`UiListener`]) never run on the mutating thread. Every
///   notification is enqueued onto the [`UiDispatcher`] supplied at construction and runs
///   there, in enqueue order. Each listener picks an [`EventStyle`] at registration: a full
///   event snapshot on every log change, or individual additions and removals. Both styles
///   coexist on one model.
/// - **Data listeners** ([`DataListener`]) are invoked synchronously, on the thread that
///   appended the event, right after the mutation.
///
/// # Consistency
///
/// The active time source and the event log live in one exclusive section. Mutations hold it
/// only for the in-memory change. Before releasing it, the model takes the notifier lock, so the
/// enqueue itself happens outside the exclusive section but still in the order in which mutations
/// entered it. Listeners therefore observe changes in mutation order, and every payload is an
/// immutable copy taken inside the section. A strategy swap is published as a single batch, so
/// no listener ever sees the mode of one time source next to the value of another.
///
/// A panic inside a listener is caught and logged. It does not stop delivery to the remaining
/// listeners, and since no lock is held while listeners run, it cannot corrupt the model.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use clockwork::{ClockModel, DefaultTimeSourceFactory, Event, TimeSourceFactory, UiListener, UiQueue};
///
/// #[derive(Debug)]
/// struct LogView;
///
/// impl UiListener for LogView {
///     fn on_events_updated(&self, events: &[Event]) {
///         for event in events {
///             println!("{event}");
///         }
///     }
/// }
///
/// let (queue, mut ui) = UiQueue::new();
/// let factory = DefaultTimeSourceFactory::system();
/// let model = ClockModel::new(factory.wall_clock(), 20, Arc::new(queue))?;
///
/// model.subscribe_ui(Arc::new(LogView));
/// model.append_event("started");
///
/// // Render on the UI thread.
/// ui.run_pending();
/// # Ok::<(), clockwork::Error>(())
/// ```
pub struct ClockModel {
    state: Mutex<ModelState>,
    notifier: Mutex<Notifier>,
    data_listeners: RwLock<Arc<[DataRegistration]>>,
    next_listener_id: AtomicU64,
}

struct ModelState {
    strategy: Arc<dyn TimeSource>,
    log: EventLog,
}

struct Notifier {
    dispatcher: Arc<dyn UiDispatcher>,
    listeners: Vec<UiRegistration>,
}

#[derive(Clone)]
struct UiRegistration {
    id: ListenerId,
    style: EventStyle,
    listener: Arc<dyn UiListener>,
}

#[derive(Clone)]
struct DataRegistration {
    id: ListenerId,
    listener: Arc<dyn DataListener>,
}

/// One atomic batch of state changes, rendered per listener style at delivery time.
enum Change {
    Initial {
        mode: String,
        millis: i64,
        events: Arc<[Event]>,
    },
    Time(i64),
    Appended {
        added: Event,
        evicted: Option<Event>,
        snapshot: Arc<[Event]>,
    },
    Cleared(Vec<Event>),
    StrategySwapped {
        mode: String,
        millis: i64,
        events: Arc<[Event]>,
    },
}

impl Change {
    fn notifications(&self, style: EventStyle) -> Vec<Notification> {
        match (self, style) {
            (Self::Initial { mode, millis, events }, EventStyle::Snapshot)
            | (Self::StrategySwapped { mode, millis, events }, EventStyle::Snapshot) => vec![
                Notification::ModeChanged(mode.clone()),
                Notification::TimeUpdated(*millis),
                Notification::EventsUpdated(Arc::clone(events)),
            ],
            (Self::Initial { mode, millis, events }, EventStyle::Delta) => {
                let mut batch = vec![Notification::ModeChanged(mode.clone()), Notification::TimeUpdated(*millis)];
                batch.extend(events.iter().cloned().map(Notification::EventAdded));
                batch
            }
            // The log did not change, so there is nothing to add or remove.
            (Self::StrategySwapped { mode, millis, .. }, EventStyle::Delta) => {
                vec![Notification::ModeChanged(mode.clone()), Notification::TimeUpdated(*millis)]
            }
            (Self::Time(millis), _) => vec![Notification::TimeUpdated(*millis)],
            (Self::Appended { snapshot, .. }, EventStyle::Snapshot) => {
                vec![Notification::EventsUpdated(Arc::clone(snapshot))]
            }
            (Self::Appended { added, evicted, .. }, EventStyle::Delta) => evicted
                .iter()
                .cloned()
                .map(Notification::EventRemoved)
                .chain([Notification::EventAdded(added.clone())])
                .collect(),
            (Self::Cleared(_), EventStyle::Snapshot) => vec![Notification::EventsUpdated(Arc::from([]))],
            (Self::Cleared(removed), EventStyle::Delta) => removed.iter().cloned().map(Notification::EventRemoved).collect(),
        }
    }

    const fn kind(&self) -> &'static str {
        match self {
            Self::Initial { .. } => "initial",
            Self::Time(_) => "time",
            Self::Appended { .. } => "appended",
            Self::Cleared(_) => "cleared",
            Self::StrategySwapped { .. } => "strategy",
        }
    }
}

impl Notifier {
    fn publish(&self, change: Change) {
        if self.listeners.is_empty() {
            return;
        }

        self.publish_to(change, self.listeners.clone());
    }

    fn publish_to(&self, change: Change, recipients: Vec<UiRegistration>) {
        self.dispatcher.dispatch(Box::new(move || {
            for registration in &recipients {
                deliver(&change, registration);
            }
        }));
    }
}

fn deliver(change: &Change, registration: &UiRegistration) {
    let batch = change.notifications(registration.style);
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        for notification in &batch {
            registration.listener.on_notification(notification);
        }
    }));

    if let Err(payload) = outcome {
        tracing::error!(
            listener = %registration.id,
            change = change.kind(),
            panic = panic_message(payload.as_ref()),
            "UI listener panicked, skipping the rest of its batch"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic payload>")
}

impl ClockModel {
    /// Creates a model with `strategy` active and an empty log holding at most `capacity` events.
    ///
    /// UI-affine notifications are enqueued onto `dispatcher`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` is zero.
    pub fn new(strategy: Arc<dyn TimeSource>, capacity: usize, dispatcher: Arc<dyn UiDispatcher>) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or(Error::InvalidCapacity(capacity))?;

        Ok(Self {
            state: Mutex::new(ModelState {
                strategy,
                log: EventLog::new(capacity),
            }),
            notifier: Mutex::new(Notifier {
                dispatcher,
                listeners: Vec::new(),
            }),
            data_listeners: RwLock::new(Arc::from([])),
            next_listener_id: AtomicU64::new(1),
        })
    }

    /// Creates a model sized according to `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if the configured event capacity is zero.
    pub fn from_config(strategy: Arc<dyn TimeSource>, config: &ClockConfig, dispatcher: Arc<dyn UiDispatcher>) -> Result<Self> {
        Self::new(strategy, config.event_capacity, dispatcher)
    }

    /// Registers a UI-affine listener that receives full event snapshots.
    ///
    /// The current state (mode, time value and events) is enqueued to the new listener right
    /// away, ahead of any notification produced later, so a late subscriber starts from a
    /// consistent view.
    pub fn subscribe_ui(&self, listener: Arc<dyn UiListener>) -> ListenerId {
        self.subscribe_ui_with(listener, EventStyle::Snapshot)
    }

    /// Registers a UI-affine listener that receives event additions and removals.
    ///
    /// The initial delivery reports the current mode and time value followed by one addition
    /// per retained event, oldest first.
    pub fn subscribe_event_delta(&self, listener: Arc<dyn UiListener>) -> ListenerId {
        self.subscribe_ui_with(listener, EventStyle::Delta)
    }

    /// Registers a UI-affine listener with an explicit event style.
    pub fn subscribe_ui_with(&self, listener: Arc<dyn UiListener>, style: EventStyle) -> ListenerId {
        let id = self.next_listener_id();

        let state = self.state.lock();
        let initial = Change::Initial {
            mode: state.strategy.mode_label().to_owned(),
            millis: state.strategy.current_millis(),
            events: state.log.snapshot(),
        };
        let mut notifier = self.hand_off(state);

        let registration = UiRegistration { id, style, listener };
        notifier.listeners.push(registration.clone());
        notifier.publish_to(initial, vec![registration]);

        tracing::debug!(listener = %id, ?style, "UI listener subscribed");
        id
    }

    /// Removes a snapshot-style listener. Returns `false` if no such listener is registered.
    ///
    /// Notifications that were enqueued before this call are still delivered.
    pub fn unsubscribe_ui(&self, id: ListenerId) -> bool {
        self.unsubscribe_ui_with(id, EventStyle::Snapshot)
    }

    /// Removes a listener registered with [`subscribe_event_delta`][Self::subscribe_event_delta].
    /// Returns `false` if no such listener is registered.
    pub fn unsubscribe_event_delta(&self, id: ListenerId) -> bool {
        self.unsubscribe_ui_with(id, EventStyle::Delta)
    }

    /// Removes a UI-affine listener registered with `style`.
    pub fn unsubscribe_ui_with(&self, id: ListenerId, style: EventStyle) -> bool {
        let mut notifier = self.notifier.lock();
        let before = notifier.listeners.len();
        notifier
            .listeners
            .retain(|registration| registration.id != id || registration.style != style);
        before != notifier.listeners.len()
    }

    /// Registers a listener that is called synchronously whenever an event is appended.
    pub fn subscribe_data(&self, listener: Arc<dyn DataListener>) -> ListenerId {
        let id = self.next_listener_id();
        let mut listeners = self.data_listeners.write();

        let mut updated = listeners.to_vec();
        updated.push(DataRegistration { id, listener });
        *listeners = updated.into();

        id
    }

    /// Removes a data listener. Returns `false` if it was not registered.
    pub fn unsubscribe_data(&self, id: ListenerId) -> bool {
        let mut listeners = self.data_listeners.write();
        if !listeners.iter().any(|registration| registration.id == id) {
            return false;
        }

        *listeners = listeners.iter().filter(|registration| registration.id != id).cloned().collect();
        true
    }

    /// Reads the active time source and publishes its value to UI-affine listeners.
    ///
    /// Called by the scheduler on every tick. Does not touch the event log.
    pub fn poll(&self) -> i64 {
        let state = self.state.lock();
        let millis = state.strategy.current_millis();
        let notifier = self.hand_off(state);

        notifier.publish(Change::Time(millis));
        millis
    }

    /// Appends an event stamped with the active time source's current value.
    ///
    /// If the log is full, its oldest event is evicted. Snapshot listeners receive the new
    /// event list, delta listeners receive the eviction (if any) and the addition, and data
    /// listeners are invoked synchronously on the calling thread.
    pub fn append_event(&self, message: impl Into<String>) -> Event {
        let mut state = self.state.lock();
        let millis = state.strategy.current_millis();
        let appended = state.log.append(millis, message);
        let snapshot = state.log.snapshot();
        let notifier = self.hand_off(state);

        let event = appended.event;
        notifier.publish(Change::Appended {
            added: event.clone(),
            evicted: appended.evicted,
            snapshot,
        });
        drop(notifier);

        self.notify_data_listeners(&event);
        event
    }

    /// Removes every event from the log and returns them, oldest first.
    pub fn clear_events(&self) -> Vec<Event> {
        let mut state = self.state.lock();
        let removed = state.log.clear();
        let notifier = self.hand_off(state);

        notifier.publish(Change::Cleared(removed.clone()));
        removed
    }

    /// Makes `strategy` the active time source and returns the previous one.
    ///
    /// The new mode label, the new source's current value and (for snapshot listeners) the
    /// event list are published as one batch.
    pub fn set_strategy(&self, strategy: Arc<dyn TimeSource>) -> Arc<dyn TimeSource> {
        let mut state = self.state.lock();
        let previous = std::mem::replace(&mut state.strategy, strategy);
        let mode = state.strategy.mode();
        let change = Change::StrategySwapped {
            mode: state.strategy.mode_label().to_owned(),
            millis: state.strategy.current_millis(),
            events: state.log.snapshot(),
        };
        let notifier = self.hand_off(state);

        tracing::debug!(from = %previous.mode(), to = %mode, "time source swapped");
        notifier.publish(change);
        previous
    }

    /// Returns the active time source.
    ///
    /// Intended for delegating the `start`, `stop` and `reset` controls.
    #[must_use]
    pub fn strategy(&self) -> Arc<dyn TimeSource> {
        Arc::clone(&self.state.lock().strategy)
    }

    /// Returns the mode of the active time source.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.state.lock().strategy.mode()
    }

    /// Returns an immutable copy of the retained events, oldest first.
    #[must_use]
    pub fn events(&self) -> Arc<[Event]> {
        self.state.lock().log.snapshot()
    }

    /// Returns the maximum number of events the log retains.
    #[must_use]
    pub fn event_capacity(&self) -> NonZeroUsize {
        self.state.lock().log.capacity()
    }

    /// Takes the notifier lock and only then releases the state lock, so that enqueues
    /// happen in the order in which the state lock was acquired.
    fn hand_off(&self, state: MutexGuard<'_, ModelState>) -> MutexGuard<'_, Notifier> {
        let notifier = self.notifier.lock();
        drop(state);
        notifier
    }

    fn notify_data_listeners(&self, event: &Event) {
        let listeners = Arc::clone(&*self.data_listeners.read());

        for registration in listeners.iter() {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                registration.listener.on_new_value(event.timestamp_millis(), event.message());
            }));

            if let Err(payload) = outcome {
                tracing::error!(
                    listener = %registration.id,
                    panic = panic_message(payload.as_ref()),
                    "data listener panicked"
                );
            }
        }
    }

    fn next_listener_id(&self) -> ListenerId {
        ListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for ClockModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClockModel")
            .field("next_listener_id", &self.next_listener_id)
            .finish_non_exhaustive()
    }
}
