// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A clock and stopwatch model whose changes reach the UI as ordered, consistent snapshots.
//!
//! The crate is the model and controller half of a desktop clock. A background thread ticks
//! the model, the model mutates its state under a lock, and every change is marshalled as an
//! immutable copy onto a single UI dispatch queue. Listeners on that queue never observe
//! partial state and never run concurrently with each other or with painting.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use clockwork::{ClockApp, ClockConfig, DefaultTimeSourceFactory, UiListener, UiQueue};
//!
//! #[derive(Debug)]
//! struct Face;
//!
//! impl UiListener for Face {
//!     fn on_time_updated(&self, millis: i64) {
//!         println!("repaint hands at {millis}");
//!     }
//! }
//!
//! let (queue, mut ui) = UiQueue::new();
//! let app = ClockApp::new(&ClockConfig::default(), &DefaultTimeSourceFactory::system(), Arc::new(queue))?;
//!
//! app.model().subscribe_ui(Arc::new(Face));
//! app.start()?;
//!
//! // The rendering thread executes notifications in order.
//! loop {
//!     ui.run_pending();
//!     # break;
//! }
//! # Ok::<(), clockwork::Error>(())
//! ```
//!
//! # Overview
//!
//! - [`TimeSource`] - The pluggable provider of the displayed time, implemented by
//!   [`WallClock`] and [`Stopwatch`] and created by a [`TimeSourceFactory`].
//! - [`EventLog`] - A bounded FIFO of timestamped [`Event`] values.
//! - [`ClockModel`] - Owns the active time source and the event log and fans out changes to
//!   [`UiListener`] and [`DataListener`] subscribers.
//! - [`TickScheduler`] - Polls the model from a dedicated background thread at a fixed period.
//! - [`UiDispatcher`] - The boundary to the rendering context; [`UiQueue`] and [`UiDriver`]
//!   provide a ready-made ordered queue.
//! - [`ClockApp`] - The control surface a clock window binds its buttons to.
//! - [`ClockConfig`] - Capacity, tick period and tick emission settings.
//!
//! # Threading
//!
//! There are two execution contexts. The ticker thread, owned by [`TickScheduler`], calls into
//! the model. The UI context, owned by whoever drives the [`UiDispatcher`], runs every
//! [`UiListener`] callback. The model holds its lock only for in-memory changes and never waits
//! for the UI. [`DataListener`] callbacks run synchronously on the thread that appended the event.
//!
//! # Time
//!
//! Time sources read time through a [`tick::Clock`]. In tests, enable the `test-util` feature
//! of `tick` and drive time with `tick::ClockControl` for fast, deterministic results.
//!
//! # Features
//!
//! - **`serde`** - Adds serialization and deserialization support for [`ClockConfig`],
//!   [`Event`] and [`Mode`] via [serde](https://serde.rs/).

mod app;
mod config;
mod dispatch;
mod error;
mod event;
mod event_log;
mod factory;
mod listener;
mod model;
mod scheduler;
mod stopwatch;
mod time_source;
mod wall_clock;

pub use app::ClockApp;
pub use config::{ClockConfig, MIN_TICK_PERIOD};
pub use dispatch::{UiDispatcher, UiDriver, UiQueue, UiTask};
pub use error::{Error, Result};
pub use event::Event;
pub use event_log::{Appended, EventLog};
pub use factory::{DefaultTimeSourceFactory, TimeSourceFactory};
pub use listener::{DataListener, EventStyle, ListenerId, Notification, UiListener};
pub use model::ClockModel;
pub use scheduler::{SchedulerState, TICK_MESSAGE, TICKER_THREAD_NAME, TickScheduler};
pub use stopwatch::Stopwatch;
pub use time_source::{Mode, TimeSource};
pub use wall_clock::WallClock;
