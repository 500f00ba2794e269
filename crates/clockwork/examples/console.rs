// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![expect(clippy::unwrap_used, reason = "example code")]

//! A headless clock window.
//!
//! The main thread plays the role of the UI thread and prints whatever a real window would
//! paint. A second thread presses the buttons. Once that thread is done it drops the
//! application, the UI queue drains, and the program exits.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clockwork::{ClockApp, ClockConfig, DefaultTimeSourceFactory, Event, UiListener, UiQueue};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug)]
struct Window;

impl UiListener for Window {
    fn on_time_updated(&self, millis: i64) {
        println!("time      {millis}");
    }

    fn on_mode_changed(&self, label: &str) {
        println!("title     {label}");
    }

    fn on_events_updated(&self, events: &[Event]) {
        let lines: Vec<String> = events.iter().map(ToString::to_string).collect();
        println!("events    {}", lines.join(", "));
    }
}

fn main() {
    tracing_subscriber::registry().with(tracing_subscriber::fmt::layer()).init();

    let (queue, mut ui) = UiQueue::new();
    let config = ClockConfig::default().with_event_capacity(5).with_tick_period(Duration::from_millis(250));
    let app = ClockApp::new(&config, &DefaultTimeSourceFactory::system(), Arc::new(queue)).unwrap();

    app.model().subscribe_ui(Arc::new(Window));
    app.scheduler()
        .subscribe_data(Arc::new(|ts: i64, message: &str| println!("data      {message} @ {ts}")));

    let buttons = thread::spawn(move || {
        app.start().unwrap();
        thread::sleep(Duration::from_secs(1));

        println!("press     mode");
        app.toggle_mode().unwrap();
        thread::sleep(Duration::from_secs(1));

        println!("press     ticks");
        app.toggle_ticks();
        thread::sleep(Duration::from_millis(500));

        println!("press     reset");
        app.reset();
        thread::sleep(Duration::from_millis(500));

        println!("press     quit");
        app.shutdown();
    });

    // Returns once the application and its queue are gone.
    ui.run();
    buttons.join().unwrap();
}
