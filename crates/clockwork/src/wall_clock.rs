// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::{SystemTime, UNIX_EPOCH};

use jiff::Timestamp;
use jiff::tz::TimeZone;
use tick::Clock;

use crate::{Mode, TimeSource};

/// A stateless time source that reports the operating system's wall-clock time.
///
/// The value is the number of milliseconds since the UNIX epoch. The control operations are
/// no-ops. Time is read through a [`Clock`], so tests can substitute a controlled clock.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use clockwork::{TimeSource, WallClock};
/// use jiff::tz::TimeZone;
/// use tick::ClockControl;
///
/// let control = ClockControl::new();
/// let clock = WallClock::with_time_zone(&control.to_clock(), TimeZone::UTC);
///
/// control.advance(Duration::from_millis(3_723_456));
///
/// assert_eq!(clock.current_millis(), 3_723_456);
/// assert_eq!(clock.display_time(), "01:02:03.456");
/// ```
#[derive(Debug, Clone)]
pub struct WallClock {
    clock: Clock,
    time_zone: TimeZone,
}

impl WallClock {
    /// Creates a wall clock that renders times in the system time zone.
    #[must_use]
    pub fn new(clock: &Clock) -> Self {
        Self::with_time_zone(clock, TimeZone::system())
    }

    /// Creates a wall clock that renders times in `time_zone`.
    #[must_use]
    pub fn with_time_zone(clock: &Clock, time_zone: TimeZone) -> Self {
        Self {
            clock: clock.clone(),
            time_zone,
        }
    }
}

impl TimeSource for WallClock {
    fn current_millis(&self) -> i64 {
        millis_since_epoch(self.clock.system_time())
    }

    fn mode(&self) -> Mode {
        Mode::WallClock
    }

    fn display_time(&self) -> String {
        match Timestamp::try_from(self.clock.system_time()) {
            Ok(timestamp) => {
                let zoned = timestamp.to_zoned(self.time_zone.clone());
                format!(
                    "{:02}:{:02}:{:02}.{:03}",
                    zoned.hour(),
                    zoned.minute(),
                    zoned.second(),
                    zoned.millisecond()
                )
            }
            Err(error) => {
                tracing::warn!(%error, "system time is outside the representable range");
                "--:--:--.---".to_owned()
            }
        }
    }
}

fn millis_since_epoch(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_millis()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_millis()).map_or(i64::MIN, |millis| -millis),
    }
}
