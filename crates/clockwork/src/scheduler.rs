// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::MIN_TICK_PERIOD;
use crate::{ClockConfig, ClockModel, DataListener, Error, ListenerId, Result, TimeSource};

/// The message of the events appended on every tick while tick emission is enabled.
pub const TICK_MESSAGE: &str = "Tick";

/// The name of the background thread that drives the scheduler.
pub const TICKER_THREAD_NAME: &str = "clock-ticker";

/// The lifecycle state of a [`TickScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulerState {
    /// No repeating task is scheduled.
    Stopped,
    /// The repeating task fires every period.
    Running,
    /// The background thread has been released; the scheduler cannot run again.
    ShutDown,
}

/// Drives a [`ClockModel`] from a dedicated background thread.
///
/// While running, the scheduler fires at a fixed period, starting immediately. Every firing
/// calls [`ClockModel::poll`] and, when tick emission is enabled, appends a
/// [`TICK_MESSAGE`] event. The scheduler's own run state is independent of the time source's
/// `start`/`stop` controls; the `strategy_*` methods forward those to the active source.
///
/// # Lifecycle
///
/// - [`start`][Self::start] schedules the repeating task. Starting a running scheduler does nothing.
/// - [`stop`][Self::stop] cancels future firings. A firing that is already executing runs to
///   completion, and notifications it already enqueued are still delivered. Stopping a stopped
///   scheduler does nothing.
/// - [`shutdown`][Self::shutdown] stops and then forcefully releases the background thread
///   without draining it. Shutdown is terminal: later calls to `start` fail with
///   [`Error::SchedulerShutDown`]. Dropping the scheduler shuts it down.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use clockwork::{ClockModel, DefaultTimeSourceFactory, TickScheduler, TimeSourceFactory, UiQueue};
///
/// let (queue, mut ui) = UiQueue::new();
/// let factory = DefaultTimeSourceFactory::system();
/// let model = Arc::new(ClockModel::new(factory.wall_clock(), 20, Arc::new(queue))?);
///
/// let scheduler = TickScheduler::new(Arc::clone(&model), Duration::from_millis(200), true)?;
/// scheduler.start()?;
///
/// std::thread::sleep(Duration::from_secs(1));
/// ui.run_pending();
///
/// scheduler.shutdown();
/// # Ok::<(), clockwork::Error>(())
/// ```
#[derive(Debug)]
pub struct TickScheduler {
    model: Arc<ClockModel>,
    period: Duration,
    emit_ticks: Arc<AtomicBool>,
    lifecycle: Mutex<Lifecycle>,
}

#[derive(Debug)]
struct Lifecycle {
    // `None` once shut down.
    runtime: Option<Runtime>,
    task: Option<JoinHandle<()>>,
}

impl Lifecycle {
    fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl TickScheduler {
    /// Creates a stopped scheduler that polls `model` every `period`.
    ///
    /// Periods shorter than [`MIN_TICK_PERIOD`] are raised to it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] if the background thread cannot be created.
    pub fn new(model: Arc<ClockModel>, period: Duration, emit_ticks: bool) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name(TICKER_THREAD_NAME)
            .enable_time()
            .build()
            .map_err(Error::Runtime)?;

        Ok(Self {
            model,
            period: period.max(MIN_TICK_PERIOD),
            emit_ticks: Arc::new(AtomicBool::new(emit_ticks)),
            lifecycle: Mutex::new(Lifecycle {
                runtime: Some(runtime),
                task: None,
            }),
        })
    }

    /// Creates a stopped scheduler using the period and tick emission setting of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] if the background thread cannot be created.
    pub fn from_config(model: Arc<ClockModel>, config: &ClockConfig) -> Result<Self> {
        Self::new(model, config.tick_period, config.emit_ticks)
    }

    /// Starts firing. Does nothing if already running.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchedulerShutDown`] if the scheduler has been shut down.
    pub fn start(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock();
        self.start_locked(&mut lifecycle)
    }

    /// Cancels future firings. Does nothing if already stopped.
    pub fn stop(&self) {
        Self::stop_locked(&mut self.lifecycle.lock());
    }

    /// Stops and permanently releases the background thread.
    pub fn shutdown(&self) {
        let mut lifecycle = self.lifecycle.lock();
        Self::stop_locked(&mut lifecycle);

        if let Some(runtime) = lifecycle.runtime.take() {
            runtime.shutdown_background();
            tracing::debug!("tick scheduler shut down");
        }
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        let lifecycle = self.lifecycle.lock();
        if lifecycle.runtime.is_none() {
            SchedulerState::ShutDown
        } else if lifecycle.is_running() {
            SchedulerState::Running
        } else {
            SchedulerState::Stopped
        }
    }

    /// Returns `true` if the repeating task is scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state() == SchedulerState::Running
    }

    /// Returns the effective tick period.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Sets whether ticks append events to the log. Takes effect from the next firing.
    pub fn set_emit_ticks(&self, emit_ticks: bool) {
        self.emit_ticks.store(emit_ticks, Ordering::Relaxed);
    }

    /// Returns whether ticks append events to the log.
    #[must_use]
    pub fn emit_ticks(&self) -> bool {
        self.emit_ticks.load(Ordering::Relaxed)
    }

    /// Swaps the model's time source without letting a tick fire mid-swap.
    ///
    /// Stops ticking, makes `strategy` active, starts `strategy` itself if `start_strategy` is
    /// set, then resumes ticking. The scheduler runs afterwards even if it was stopped before.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchedulerShutDown`] if the scheduler has been shut down. The model is
    /// left untouched in that case.
    pub fn set_strategy(&self, strategy: Arc<dyn TimeSource>, start_strategy: bool) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.runtime.is_none() {
            return Err(Error::SchedulerShutDown);
        }

        Self::stop_locked(&mut lifecycle);
        self.model.set_strategy(Arc::clone(&strategy));
        if start_strategy {
            strategy.start();
        }
        self.start_locked(&mut lifecycle)
    }

    /// Starts the model's active time source.
    pub fn strategy_start(&self) {
        self.model.strategy().start();
    }

    /// Stops the model's active time source.
    pub fn strategy_stop(&self) {
        self.model.strategy().stop();
    }

    /// Resets the model's active time source.
    pub fn strategy_reset(&self) {
        self.model.strategy().reset();
    }

    /// Registers a data listener on the model.
    pub fn subscribe_data(&self, listener: Arc<dyn DataListener>) -> ListenerId {
        self.model.subscribe_data(listener)
    }

    /// Removes a data listener from the model.
    pub fn unsubscribe_data(&self, id: ListenerId) -> bool {
        self.model.unsubscribe_data(id)
    }

    /// Returns the model this scheduler drives.
    #[must_use]
    pub fn model(&self) -> &Arc<ClockModel> {
        &self.model
    }

    fn start_locked(&self, lifecycle: &mut Lifecycle) -> Result<()> {
        if lifecycle.is_running() {
            return Ok(());
        }

        let runtime = lifecycle.runtime.as_ref().ok_or(Error::SchedulerShutDown)?;
        let task = runtime.spawn(run_ticks(Arc::clone(&self.model), Arc::clone(&self.emit_ticks), self.period));
        lifecycle.task = Some(task);

        tracing::debug!(period = ?self.period, "tick scheduler started");
        Ok(())
    }

    fn stop_locked(lifecycle: &mut Lifecycle) {
        if let Some(task) = lifecycle.task.take() {
            // Cancellation happens at the next await point, so a firing in progress completes.
            task.abort();
            tracing::debug!("tick scheduler stopped");
        }
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run_ticks(model: Arc<ClockModel>, emit_ticks: Arc<AtomicBool>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        let millis = model.poll();
        tracing::trace!(millis, "tick");

        if emit_ticks.load(Ordering::Relaxed) {
            model.append_event(TICK_MESSAGE);
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use tick::ClockControl;

    use super::*;
    use crate::{Mode, Stopwatch, UiQueue, WallClock};

    fn scheduler(period: Duration) -> TickScheduler {
        let (queue, _ui) = UiQueue::new();
        let clock = ClockControl::new().to_clock();
        let model = Arc::new(ClockModel::new(Arc::new(WallClock::new(&clock)), 10, Arc::new(queue)).unwrap());
        TickScheduler::new(model, period, false).unwrap()
    }

    #[test]
    fn assert_types() {
        static_assertions::assert_impl_all!(TickScheduler: Send, Sync);
    }

    #[test]
    fn period_is_clamped() {
        let scheduler = scheduler(Duration::ZERO);

        assert_eq!(scheduler.period(), MIN_TICK_PERIOD);
    }

    #[test]
    fn starts_stopped() {
        let scheduler = scheduler(Duration::from_secs(60));

        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[test]
    fn start_and_stop_transitions() {
        let scheduler = scheduler(Duration::from_secs(60));

        scheduler.start().unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Running);
        scheduler.start().unwrap();
        assert!(scheduler.is_running());

        scheduler.stop();
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[test]
    fn stop_when_stopped_is_no_op() {
        let scheduler = scheduler(Duration::from_secs(60));

        scheduler.stop();
        scheduler.stop();

        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[test]
    fn start_after_shutdown_fails() {
        let scheduler = scheduler(Duration::from_secs(60));
        scheduler.start().unwrap();

        scheduler.shutdown();
        scheduler.shutdown();

        assert_eq!(scheduler.state(), SchedulerState::ShutDown);
        assert!(matches!(scheduler.start(), Err(Error::SchedulerShutDown)));
    }

    #[test]
    fn set_strategy_after_shutdown_leaves_model_untouched() {
        let scheduler = scheduler(Duration::from_secs(60));
        scheduler.shutdown();
        let stopwatch = Arc::new(Stopwatch::new(&ClockControl::new().to_clock()));

        let result = scheduler.set_strategy(stopwatch, true);

        assert!(matches!(result, Err(Error::SchedulerShutDown)));
        assert_eq!(scheduler.model().mode(), Mode::WallClock);
    }

    #[test]
    fn set_strategy_swaps_starts_and_resumes() {
        let scheduler = scheduler(Duration::from_secs(60));
        let stopwatch = Arc::new(Stopwatch::new(&ClockControl::new().to_clock()));

        scheduler.set_strategy(Arc::clone(&stopwatch) as Arc<dyn TimeSource>, true).unwrap();

        assert_eq!(scheduler.model().mode(), Mode::Stopwatch);
        assert!(stopwatch.is_running());
        assert!(scheduler.is_running());
    }

    #[test]
    fn strategy_controls_delegate_to_active_source() {
        let control = ClockControl::new();
        let scheduler = scheduler(Duration::from_secs(60));
        let stopwatch = Arc::new(Stopwatch::new(&control.to_clock()));
        scheduler.model().set_strategy(Arc::clone(&stopwatch) as Arc<dyn TimeSource>);

        scheduler.strategy_start();
        control.advance(Duration::from_millis(20));
        scheduler.strategy_stop();
        assert_eq!(stopwatch.current_millis(), 20);
        assert_eq!(scheduler.state(), SchedulerState::Stopped);

        scheduler.strategy_reset();
        assert_eq!(stopwatch.current_millis(), 0);
    }

    #[test]
    fn emit_ticks_toggle() {
        let scheduler = scheduler(Duration::from_secs(60));

        scheduler.set_emit_ticks(true);
        assert!(scheduler.emit_ticks());
        scheduler.set_emit_ticks(false);
        assert!(!scheduler.emit_ticks());
    }
}
