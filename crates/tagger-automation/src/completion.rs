//! One-shot completion signal with a shared result slot.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Written once by the worker, awaited by a blocking caller.
///
/// The first [`complete`](Completion::complete) wins; later values are
/// dropped.
pub struct Completion<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

struct Slot<T> {
    value: Option<T>,
    done: bool,
}

impl<T> Completion<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                slot: Mutex::new(Slot {
                    value: None,
                    done: false,
                }),
                ready: Condvar::new(),
            }),
        }
    }

    /// Post the result. Returns `false` if a result was already posted.
    pub fn complete(&self, value: T) -> bool {
        let mut slot = self.inner.slot.lock();
        if slot.done {
            return false;
        }
        slot.value = Some(value);
        slot.done = true;
        self.inner.ready.notify_all();
        true
    }

    pub fn is_complete(&self) -> bool {
        self.inner.slot.lock().done
    }

    /// Block until completed or `timeout` elapses, taking the value.
    pub fn wait(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.inner.slot.lock();
        while !slot.done {
            if self.inner.ready.wait_until(&mut slot, deadline).timed_out() {
                break;
            }
        }
        slot.value.take()
    }
}

impl<T> Default for Completion<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("complete", &self.is_complete())
            .finish()
    }
}
