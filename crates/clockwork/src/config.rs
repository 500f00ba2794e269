// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use crate::{Error, Result};

/// The shortest period the tick scheduler accepts. Shorter periods are raised to this value.
pub const MIN_TICK_PERIOD: Duration = Duration::from_millis(10);

/// Settings for a clock application.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use clockwork::ClockConfig;
///
/// let config = ClockConfig::default()
///     .with_event_capacity(50)
///     .with_tick_period(Duration::from_millis(100))
///     .with_emit_ticks(false);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClockConfig {
    /// The maximum number of events retained by the event log. Must be at least 1.
    pub event_capacity: usize,
    /// How often the scheduler polls the model. Clamped to at least [`MIN_TICK_PERIOD`].
    pub tick_period: Duration,
    /// Whether every tick also appends a `"Tick"` event to the log.
    pub emit_ticks: bool,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            event_capacity: 20,
            tick_period: Duration::from_millis(200),
            emit_ticks: true,
        }
    }
}

impl ClockConfig {
    /// Sets the maximum number of retained events.
    #[must_use]
    pub fn with_event_capacity(mut self, event_capacity: usize) -> Self {
        self.event_capacity = event_capacity;
        self
    }

    /// Sets the tick period.
    #[must_use]
    pub fn with_tick_period(mut self, tick_period: Duration) -> Self {
        self.tick_period = tick_period;
        self
    }

    /// Sets whether ticks append events to the log.
    #[must_use]
    pub fn with_emit_ticks(mut self, emit_ticks: bool) -> Self {
        self.emit_ticks = emit_ticks;
        self
    }

    /// Checks the configuration for values that cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if the event capacity is zero.
    pub fn validate(&self) -> Result<()> {
        if self.event_capacity == 0 {
            return Err(Error::InvalidCapacity(self.event_capacity));
        }
        Ok(())
    }

    /// Returns the tick period after applying the [`MIN_TICK_PERIOD`] floor.
    #[must_use]
    pub fn effective_tick_period(&self) -> Duration {
        self.tick_period.max(MIN_TICK_PERIOD)
    }
}
