// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Debug;

use tokio::sync::mpsc;

/// A unit of work to be executed on the UI dispatch queue.
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// The boundary between the model and the rendering context.
///
/// Every callback on a [`UiListener`][crate::UiListener] runs as a task on a single, ordered
/// dispatch queue owned by the rendering context. The model only ever enqueues; it never runs UI
/// work inline and never waits for the queue to drain.
///
/// UI toolkits with their own event loop implement this trait on top of their native "run later
/// on the UI thread" primitive. For everything else, [`UiQueue::new`] returns a ready-made queue
/// and the [`UiDriver`] that the rendering thread uses to execute it.
///
/// Implementations must execute tasks one at a time, in the order they were dispatched, and
/// must not run a task inline on the calling thread. Dispatching must not block.
///
/// # Examples
///
/// ```
/// use clockwork::{UiDispatcher, UiQueue};
///
/// let (queue, mut driver) = UiQueue::new();
///
/// queue.dispatch(Box::new(|| println!("first")));
/// queue.dispatch(Box::new(|| println!("second")));
///
/// // On the rendering thread:
/// assert_eq!(driver.run_pending(), 2);
/// ```
pub trait UiDispatcher: Debug + Send + Sync {
    /// Enqueues `task` for later execution on the UI context.
    fn dispatch(&self, task: UiTask);
}

/// The sending half of the built-in UI dispatch queue.
///
/// Cloning is cheap and every clone feeds the same [`UiDriver`].
#[derive(Debug, Clone)]
pub struct UiQueue {
    sender: mpsc::UnboundedSender<UiTask>,
}

/// The receiving half of the built-in UI dispatch queue, owned by the rendering context.
///
/// The driver executes tasks on whichever thread calls it. The rendering context should call
/// it from a single thread; that thread is then the UI thread.
#[derive(Debug)]
pub struct UiDriver {
    receiver: mpsc::UnboundedReceiver<UiTask>,
}

impl UiQueue {
    /// Creates a new queue and the driver that executes its tasks.
    #[must_use]
    #[expect(clippy::new_ret_no_self, reason = "the queue is useless without its driver")]
    pub fn new() -> (Self, UiDriver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, UiDriver { receiver })
    }
}

impl UiDispatcher for UiQueue {
    fn dispatch(&self, task: UiTask) {
        if self.sender.send(task).is_err() {
            tracing::debug!("UI driver is gone, discarding task");
        }
    }
}

impl UiDriver {
    /// Executes every task that is currently queued and returns how many ran.
    ///
    /// Never blocks. Suitable for calling from an existing event loop's idle hook.
    pub fn run_pending(&mut self) -> usize {
        let mut executed = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task();
            executed += 1;
        }
        executed
    }

    /// Executes tasks as they arrive until every [`UiQueue`] clone has been dropped.
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context.
    pub fn run(&mut self) {
        while let Some(task) = self.receiver.blocking_recv() {
            task();
        }
    }

    /// Returns the number of tasks waiting to be executed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use parking_lot::Mutex;

    use super::*;

    #[test]
    fn assert_types() {
        static_assertions::assert_impl_all!(UiQueue: Send, Sync, Clone);
        static_assertions::assert_impl_all!(UiDriver: Send);
    }

    #[test]
    fn tasks_do_not_run_inline() {
        let (queue, mut driver) = UiQueue::new();
        let ran = Arc::new(Mutex::new(false));

        let flag = Arc::clone(&ran);
        queue.dispatch(Box::new(move || *flag.lock() = true));

        assert!(!*ran.lock());
        assert_eq!(driver.pending(), 1);
        assert_eq!(driver.run_pending(), 1);
        assert!(*ran.lock());
    }

    #[test]
    fn tasks_run_in_dispatch_order() {
        let (queue, mut driver) = UiQueue::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..10 {
            let order = Arc::clone(&order);
            queue.dispatch(Box::new(move || order.lock().push(i)));
        }
        driver.run_pending();

        assert_eq!(*order.lock(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn run_returns_once_all_queues_dropped() {
        let (queue, mut driver) = UiQueue::new();
        let count = Arc::new(Mutex::new(0));

        let producer = {
            let count = Arc::clone(&count);
            thread::spawn(move || {
                for _ in 0..5 {
                    let count = Arc::clone(&count);
                    queue.dispatch(Box::new(move || *count.lock() += 1));
                }
            })
        };

        driver.run();
        producer.join().unwrap();

        assert_eq!(*count.lock(), 5);
    }

    #[test]
    fn dispatch_after_driver_dropped_is_discarded() {
        let (queue, driver) = UiQueue::new();
        drop(driver);

        queue.dispatch(Box::new(|| unreachable!("driver is gone")));
    }
}
