// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use crate::{
    ClockConfig, ClockModel, Error, Event, Mode, Result, SchedulerState, TickScheduler, TimeSource, TimeSourceFactory,
    UiDispatcher,
};

/// Wires a model, a scheduler and one instance of each time source into the controls a clock
/// window exposes.
///
/// The methods map one-to-one onto the window's buttons, so UI code only has to bind them.
/// Both time sources are created once and reused, which means a stopwatch keeps its elapsed
/// time while the wall clock is shown.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
///
/// use clockwork::{ClockApp, ClockConfig, DefaultTimeSourceFactory, Mode, UiQueue};
///
/// let (queue, mut ui) = UiQueue::new();
/// let app = ClockApp::new(&ClockConfig::default(), &DefaultTimeSourceFactory::system(), Arc::new(queue))?;
///
/// app.start()?;
/// assert_eq!(app.toggle_mode()?, Mode::Stopwatch);
/// ui.run_pending();
///
/// app.shutdown();
/// # Ok::<(), clockwork::Error>(())
/// ```
#[derive(Debug)]
pub struct ClockApp {
    wall_clock: Arc<dyn TimeSource>,
    stopwatch: Arc<dyn TimeSource>,
    model: Arc<ClockModel>,
    scheduler: TickScheduler,
}

impl ClockApp {
    /// Creates the application with the wall clock active and the scheduler stopped.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid or the scheduler's background thread cannot
    /// be created.
    pub fn new(config: &ClockConfig, factory: &dyn TimeSourceFactory, dispatcher: Arc<dyn UiDispatcher>) -> Result<Self> {
        config.validate()?;

        let wall_clock = factory.wall_clock();
        let stopwatch = factory.stopwatch();
        let model = Arc::new(ClockModel::from_config(Arc::clone(&wall_clock), config, dispatcher)?);
        let scheduler = TickScheduler::from_config(Arc::clone(&model), config)?;

        Ok(Self {
            wall_clock,
            stopwatch,
            model,
            scheduler,
        })
    }

    /// Starts the active time source, then starts ticking.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchedulerShutDown`] after shutdown, without starting the time source.
    pub fn start(&self) -> Result<()> {
        if self.scheduler.state() == SchedulerState::ShutDown {
            return Err(Error::SchedulerShutDown);
        }

        self.scheduler.strategy_start();
        self.scheduler.start()
    }

    /// Stops the active time source, then stops ticking.
    pub fn stop(&self) {
        self.scheduler.strategy_stop();
        self.scheduler.stop();
    }

    /// Resets the active time source and clears the event log.
    pub fn reset(&self) {
        self.scheduler.strategy_reset();
        self.model.clear_events();
    }

    /// Flips whether ticks append events and returns the new setting.
    pub fn toggle_ticks(&self) -> bool {
        let emit_ticks = !self.scheduler.emit_ticks();
        self.scheduler.set_emit_ticks(emit_ticks);
        emit_ticks
    }

    /// Switches to the other mode and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchedulerShutDown`] after shutdown.
    pub fn toggle_mode(&self) -> Result<Mode> {
        let next = self.model.mode().toggled();
        self.switch_mode(next)?;
        Ok(next)
    }

    /// Makes the time source for `mode` active. Does nothing if it already is.
    ///
    /// Switching to the stopwatch also starts it. Switching to the wall clock leaves the
    /// stopwatch as it is, running or paused.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchedulerShutDown`] after shutdown.
    pub fn switch_mode(&self, mode: Mode) -> Result<()> {
        if self.model.mode() == mode {
            return Ok(());
        }

        match mode {
            Mode::Stopwatch => self.scheduler.set_strategy(Arc::clone(&self.stopwatch), true),
            Mode::WallClock => self.scheduler.set_strategy(Arc::clone(&self.wall_clock), false),
        }
    }

    /// Removes every event from the log.
    pub fn clear_events(&self) -> Vec<Event> {
        self.model.clear_events()
    }

    /// Shuts the scheduler down for good.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }

    /// Returns the mode of the active time source.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.model.mode()
    }

    /// Returns the model, for subscribing listeners.
    #[must_use]
    pub fn model(&self) -> &Arc<ClockModel> {
        &self.model
    }

    /// Returns the scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }
}
