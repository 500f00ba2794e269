// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use parking_lot::Mutex;
use tick::Clock;

use crate::time_source::format_elapsed;
use crate::{Mode, TimeSource};

/// A stateful time source that measures elapsed time across start/stop intervals.
///
/// While running, the reported value is the time accumulated over previous intervals plus the
/// time elapsed since the last [`start`][TimeSource::start]. While stopped, the value is
/// constant. [`reset`][TimeSource::reset] stops the stopwatch and zeroes the accumulated time.
///
/// Swapping the stopwatch out of a [`ClockModel`][crate::ClockModel] and back in again does not
/// touch its state; a paused stopwatch resumes from the same value.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use clockwork::{Stopwatch, TimeSource};
/// use tick::ClockControl;
///
/// let control = ClockControl::new();
/// let stopwatch = Stopwatch::new(&control.to_clock());
///
/// stopwatch.start();
/// control.advance(Duration::from_millis(1_500));
/// stopwatch.stop();
/// control.advance(Duration::from_secs(10));
///
/// assert_eq!(stopwatch.current_millis(), 1_500);
/// assert_eq!(stopwatch.display_time(), "00:00:01.500");
/// ```
#[derive(Debug)]
pub struct Stopwatch {
    clock: Clock,
    state: Mutex<StopwatchState>,
}

#[derive(Debug, Default)]
struct StopwatchState {
    // Measures the current interval; `None` while stopped.
    running: Option<tick::Stopwatch>,
    // Sum of all completed intervals.
    accumulated: Duration,
}

impl StopwatchState {
    fn elapsed(&self) -> Duration {
        self.running
            .as_ref()
            .map_or(self.accumulated, |interval| self.accumulated.saturating_add(interval.elapsed()))
    }
}

impl Stopwatch {
    /// Creates a stopped stopwatch with no accumulated time.
    #[must_use]
    pub fn new(clock: &Clock) -> Self {
        Self {
            clock: clock.clone(),
            state: Mutex::new(StopwatchState::default()),
        }
    }

    /// Returns `true` if the stopwatch is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.lock().running.is_some()
    }

    /// Returns the elapsed time as a [`Duration`].
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.state.lock().elapsed()
    }
}

impl TimeSource for Stopwatch {
    fn current_millis(&self) -> i64 {
        i64::try_from(self.elapsed().as_millis()).unwrap_or(i64::MAX)
    }

    fn mode(&self) -> Mode {
        Mode::Stopwatch
    }

    fn display_time(&self) -> String {
        format_elapsed(self.current_millis())
    }

    fn start(&self) {
        let mut state = self.state.lock();
        if state.running.is_none() {
            state.running = Some(self.clock.stopwatch());
        }
    }

    fn stop(&self) {
        let mut state = self.state.lock();
        if let Some(interval) = state.running.take() {
            state.accumulated = state.accumulated.saturating_add(interval.elapsed());
        }
    }

    fn reset(&self) {
        *self.state.lock() = StopwatchState::default();
    }
}
