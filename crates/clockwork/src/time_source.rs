// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Debug};

/// The kind of value a [`TimeSource`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// Absolute wall-clock time, in milliseconds since the UNIX epoch.
    WallClock,
    /// Elapsed stopwatch time, in milliseconds.
    Stopwatch,
}

impl Mode {
    /// Returns the short label shown to users for this mode.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::WallClock => "Clock",
            Self::Stopwatch => "Stopwatch",
        }
    }

    /// Returns the other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::WallClock => Self::Stopwatch,
            Self::Stopwatch => Self::WallClock,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A pluggable provider of the time value displayed by the clock.
///
/// Exactly one time source is active in a [`ClockModel`][crate::ClockModel] at any instant. The
/// model reads the active source when it polls and when it stamps new events, and the controller
/// forwards the `start`, `stop` and `reset` controls to it.
///
/// All operations are total: a source that has no notion of running or pausing treats the
/// control operations as no-ops. Implementations perform no I/O and raise no notifications;
/// fanning out changes is the model's job.
///
/// Control operations take `&self` because the same source instance is shared between the
/// model, the controller and the ticking thread. Stateful sources use interior mutability.
pub trait TimeSource: Debug + Send + Sync {
    /// Returns the current value in milliseconds.
    ///
    /// The value never decreases while the source is running under normal operating system
    /// clock behavior, and stays constant while a stateful source is stopped.
    fn current_millis(&self) -> i64;

    /// Returns the mode of this source.
    fn mode(&self) -> Mode;

    /// Returns the short label shown to users for this source.
    fn mode_label(&self) -> &str {
        self.mode().label()
    }

    /// Renders the current value in a human-readable `HH:MM:SS.mmm` form.
    fn display_time(&self) -> String;

    /// Starts the source. Starting an already running source does nothing.
    fn start(&self) {}

    /// Stops the source. Stopping a source that is not running does nothing.
    fn stop(&self) {}

    /// Resets the source to its initial state.
    fn reset(&self) {}
}

/// Formats a non-negative duration in milliseconds as `HH:MM:SS.mmm`.
///
/// The hour field is not wrapped, so long durations render as e.g. `123:04:05.006`.
pub(crate) fn format_elapsed(millis: i64) -> String {
    let millis = millis.max(0);
    let hours = millis / 3_600_000;
    let minutes = (millis / 60_000) % 60;
    let seconds = (millis / 1_000) % 60;
    let fraction = millis % 1_000;

    format!("{hours:02}:{minutes:02}:{seconds:02}.{fraction:03}")
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_labels() {
        assert_eq!(Mode::WallClock.label(), "Clock");
        assert_eq!(Mode::Stopwatch.to_string(), "Stopwatch");
    }

    #[test]
    fn mode_toggled() {
        assert_eq!(Mode::WallClock.toggled(), Mode::Stopwatch);
        assert_eq!(Mode::Stopwatch.toggled(), Mode::WallClock);
    }

    #[test]
    fn format_elapsed_components() {
        assert_eq!(format_elapsed(0), "00:00:00.000");
        assert_eq!(format_elapsed(61_001), "00:01:01.001");
        assert_eq!(format_elapsed(3_723_456), "01:02:03.456");
        assert_eq!(format_elapsed(100 * 3_600_000), "100:00:00.000");
    }

    #[test]
    fn format_elapsed_clamps_negative() {
        assert_eq!(format_elapsed(-1), "00:00:00.000");
    }
}
