//! Microtask-batched delivery of change notifications.
//!
//! Every write that changes reactive state hands its callback to the
//! [`UpdateScheduler`]. Callbacks are collected in a de-duplicated, insertion-ordered
//! set and run together in a single microtask, so any number of synchronous writes
//! within one tick cost one invocation per distinct callback.

use std::{
    any::Any,
    cell::{Cell, RefCell},
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    rc::Rc,
};

/// A change notification callback.
///
/// Identity is the `Rc` allocation: clones of one callback are the same callback as
/// far as batching is concerned.
pub type ReactiveCallback = Rc<dyn Fn()>;

/// Wraps a closure into a [`ReactiveCallback`].
pub fn callback(f: impl Fn() + 'static) -> ReactiveCallback {
    Rc::new(f)
}

thread_local! {
    static SCHEDULER: Rc<UpdateScheduler> = Rc::new(UpdateScheduler::default());
}

/// Per-thread batching queue for [`ReactiveCallback`]s.
#[derive(Default)]
pub struct UpdateScheduler {
    pending: RefCell<Vec<ReactiveCallback>>,
    flush_queued: Cell<bool>,
}

impl UpdateScheduler {
    /// The scheduler of the current thread.
    #[must_use]
    pub fn current() -> Rc<Self> {
        SCHEDULER.with(Rc::clone)
    }

    /// Adds `callback` to the pending set and makes sure a flush is queued.
    ///
    /// Scheduling a callback that is already pending has no effect.
    pub fn schedule(&self, callback: &ReactiveCallback) {
        {
            let mut pending = self.pending.borrow_mut();
            if pending.iter().any(|queued| same_callback(queued, callback)) {
                return;
            }
            pending.push(callback.clone());
        }

        if !self.flush_queued.replace(true) {
            wsx_host::queue_microtask(|| Self::current().flush());
        }
    }

    /// Number of callbacks waiting for the next flush.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Whether a flush microtask has been queued and not yet run.
    #[must_use]
    pub fn is_flush_queued(&self) -> bool {
        self.flush_queued.get()
    }

    fn flush(&self) {
        let callbacks = self.pending.take();
        self.flush_queued.set(false);
        tracing::trace!(count = callbacks.len(), "flushing reactive callbacks");

        for callback in callbacks {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| callback())) {
                tracing::error!("reactive callback panicked: {}", panic_message(&*payload));
            }
        }
    }
}

impl fmt::Debug for UpdateScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateScheduler")
            .field("pending", &self.pending_len())
            .field("flush_queued", &self.flush_queued.get())
            .finish()
    }
}

/// Schedules `callback` on the current thread's scheduler.
pub fn schedule(callback: &ReactiveCallback) {
    UpdateScheduler::current().schedule(callback);
}

fn same_callback(a: &ReactiveCallback, b: &ReactiveCallback) -> bool {
    std::ptr::eq(Rc::as_ptr(a).cast::<()>(), Rc::as_ptr(b).cast::<()>())
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use wsx_host::perform_microtask_checkpoint;

    use super::*;

    fn counter() -> (Rc<Cell<u32>>, ReactiveCallback) {
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        (count, callback(move || seen.set(seen.get() + 1)))
    }

    #[test]
    fn batches_into_one_microtask() {
        let (count, cb) = counter();
        schedule(&cb);
        schedule(&cb);
        schedule(&cb.clone());

        let scheduler = UpdateScheduler::current();
        assert_eq!(scheduler.pending_len(), 1);
        assert!(scheduler.is_flush_queued());
        assert_eq!(count.get(), 0);

        assert_eq!(perform_microtask_checkpoint(), 1);
        assert_eq!(count.get(), 1);
        assert!(!scheduler.is_flush_queued());
    }

    #[test]
    fn runs_in_first_scheduled_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let make = |label: &'static str| {
            let order = order.clone();
            callback(move || order.borrow_mut().push(label))
        };
        let (a, b) = (make("a"), make("b"));

        schedule(&b);
        schedule(&a);
        schedule(&b);
        perform_microtask_checkpoint();

        assert_eq!(*order.borrow(), vec!["b", "a"]);
    }

    #[test]
    fn reentrant_schedule_goes_to_next_flush() {
        let (count, inner) = counter();
        let runs = Rc::new(Cell::new(0));
        let seen = runs.clone();
        let outer = callback(move || {
            seen.set(seen.get() + 1);
            schedule(&inner);
            assert!(UpdateScheduler::current().is_flush_queued());
        });

        schedule(&outer);
        assert_eq!(perform_microtask_checkpoint(), 2);
        assert_eq!(runs.get(), 1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn panicking_callback_does_not_stop_the_flush() {
        let (count, healthy) = counter();
        let failing = callback(|| panic!("render exploded"));

        schedule(&failing);
        schedule(&healthy);
        perform_microtask_checkpoint();

        assert_eq!(count.get(), 1);
        assert_eq!(UpdateScheduler::current().pending_len(), 0);
    }
}
