//! Background work with cancellation tied to the owner's lifetime.
//!
//! [`spawn`] runs a closure on a worker thread and hands the result back
//! through a channel. Dropping the [`TaskHandle`] cancels it: the worker can
//! poll its token to stop early, and a result produced after cancellation is
//! discarded.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct TaskHandle<T> {
    token: CancellationToken,
    rx: Receiver<T>,
}

pub fn spawn<T, F>(f: F) -> TaskHandle<T>
where
    F: FnOnce(&CancellationToken) -> T + Send + 'static,
    T: Send + 'static,
{
    let token = CancellationToken::new();
    let worker_token = token.clone();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let out = f(&worker_token);
        if worker_token.is_cancelled() {
            log::debug!("Discarding result of cancelled task");
            return;
        }
        let _ = tx.send(out);
    });

    TaskHandle { token, rx }
}

impl<T> TaskHandle<T> {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Non-blocking poll.
    pub fn try_take(&self) -> Option<T> {
        if self.is_cancelled() {
            return None;
        }
        self.rx.try_recv().ok()
    }

    pub fn wait_timeout(&self, timeout: Duration) -> Option<T> {
        if self.is_cancelled() {
            return None;
        }
        self.rx.recv_timeout(timeout).ok()
    }

    /// Blocks until the worker finishes. `None` if it was cancelled or panicked.
    pub fn wait(self) -> Option<T> {
        if self.is_cancelled() {
            return None;
        }
        self.rx.recv().ok()
    }
}

impl<T> Drop for TaskHandle<T> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
