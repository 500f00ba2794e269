// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

/// A specialized `Result` type for clock operations that return a clock [`Error`][enum@Error] on failure.
pub type Result<T> = std::result::Result<T, Error>;

/// An error originating in the clock model or its controller.
///
/// Every variant describes a contract violation by the caller (invalid configuration or an
/// operation invoked out of sequence) or a failure to acquire the background execution resource.
/// Listener faults are never surfaced through this type; they are isolated and logged instead.
/// Future versions may add additional enum variants.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The event log was configured to hold no events. The capacity must be at least 1.
    #[error("event log capacity must be at least 1, got {0}")]
    InvalidCapacity(usize),

    /// The tick scheduler was used after [`TickScheduler::shutdown`][crate::TickScheduler::shutdown].
    ///
    /// Shutdown is terminal; observing this error indicates a lifecycle bug in the caller.
    #[error("the tick scheduler has been shut down and cannot be started again")]
    SchedulerShutDown,

    /// The background thread that drives the tick scheduler could not be created.
    #[error("failed to create the tick scheduler runtime")]
    Runtime(#[source] std::io::Error),
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::error::Error as StdError;

    use super::*;

    #[test]
    fn assert_types() {
        static_assertions::assert_impl_all!(Error: Send, Sync);
    }

    #[test]
    fn invalid_capacity_message() {
        let error = Error::InvalidCapacity(0);

        assert_eq!(error.to_string(), "event log capacity must be at least 1, got 0");
        assert!(error.source().is_none());
    }

    #[test]
    fn runtime_error_keeps_source() {
        let error = Error::Runtime(std::io::Error::other("no threads left"));

        assert_eq!(error.to_string(), "failed to create the tick scheduler runtime");
        assert_eq!(error.source().unwrap().to_string(), "no threads left");
    }
}
