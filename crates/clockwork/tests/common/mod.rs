// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clockwork::{Notification, UiDriver, UiListener};
use parking_lot::Mutex;

/// Records every notification it receives, together with the thread it ran on.
#[derive(Debug, Default)]
pub struct Recorder {
    notifications: Mutex<Vec<Notification>>,
    threads: Mutex<Vec<Option<String>>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.notifications.lock())
    }

    pub fn threads(&self) -> Vec<Option<String>> {
        self.threads.lock().clone()
    }
}

impl UiListener for Recorder {
    fn on_notification(&self, notification: &Notification) {
        self.notifications.lock().push(notification.clone());
        self.threads.lock().push(thread::current().name().map(str::to_owned));
    }
}

/// Drains the UI queue until `condition` holds or `timeout` elapses.
pub fn pump_until(ui: &mut UiDriver, timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        ui.run_pending();
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(1));
    }
}
