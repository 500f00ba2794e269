// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use tick::Clock;
use tick::runtime::InactiveClock;

use crate::{Stopwatch, TimeSource, WallClock};

/// Creates the time source variants.
///
/// Each variant is meant to be created once and then reused across strategy swaps, so that
/// switching back to a source restores its prior state.
pub trait TimeSourceFactory {
    /// Creates a wall-clock time source.
    fn wall_clock(&self) -> Arc<dyn TimeSource>;

    /// Creates a stopwatch time source.
    fn stopwatch(&self) -> Arc<dyn TimeSource>;
}

/// Builds the built-in [`WallClock`] and [`Stopwatch`] sources over one shared [`Clock`].
///
/// # Examples
///
/// ```
/// use clockwork::{DefaultTimeSourceFactory, Mode, TimeSourceFactory};
///
/// let factory = DefaultTimeSourceFactory::system();
///
/// assert_eq!(factory.wall_clock().mode(), Mode::WallClock);
/// assert_eq!(factory.stopwatch().mode(), Mode::Stopwatch);
/// ```
#[derive(Debug, Clone)]
pub struct DefaultTimeSourceFactory {
    clock: Clock,
}

impl DefaultTimeSourceFactory {
    /// Creates a factory whose sources read time from `clock`.
    #[must_use]
    pub fn new(clock: &Clock) -> Self {
        Self { clock: clock.clone() }
    }

    /// Creates a factory whose sources read the operating system clocks.
    #[must_use]
    pub fn system() -> Self {
        Self { clock: system_clock() }
    }
}

impl TimeSourceFactory for DefaultTimeSourceFactory {
    fn wall_clock(&self) -> Arc<dyn TimeSource> {
        Arc::new(WallClock::new(&self.clock))
    }

    fn stopwatch(&self) -> Arc<dyn TimeSource> {
        Arc::new(Stopwatch::new(&self.clock))
    }
}

/// Returns a clock backed by the operating system.
///
/// Time sources only read the current time and never register timers, so the clock driver
/// is not needed and is dropped right away.
pub(crate) fn system_clock() -> Clock {
    let (clock, _driver) = InactiveClock::default().activate();
    clock
}
