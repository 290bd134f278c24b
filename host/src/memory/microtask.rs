use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
};

type Microtask = Box<dyn FnOnce()>;

thread_local! {
    static QUEUE: RefCell<VecDeque<Microtask>> = RefCell::new(VecDeque::new());
    static DRAINING: Cell<bool> = const { Cell::new(false) };
}

/// Queues `task` to run at the next microtask checkpoint.
pub fn queue_microtask(task: impl FnOnce() + 'static) {
    QUEUE.with(|queue| queue.borrow_mut().push_back(Box::new(task)));
}

/// Runs queued microtasks until the queue is empty, including microtasks queued by
/// the ones being run. Returns how many ran.
///
/// A checkpoint requested from inside a running microtask is a no-op: the outer
/// checkpoint keeps draining.
pub fn perform_microtask_checkpoint() -> usize {
    if DRAINING.with(Cell::get) {
        return 0;
    }
    let _draining = Draining::start();

    let mut ran = 0;
    while let Some(task) = QUEUE.with(|queue| queue.borrow_mut().pop_front()) {
        task();
        ran += 1;
    }

    tracing::trace!(ran, "microtask checkpoint");
    ran
}

/// Marks the thread as draining until dropped, including on unwind.
struct Draining;

impl Draining {
    fn start() -> Self {
        DRAINING.with(|draining| draining.set(true));
        Self
    }
}

impl Drop for Draining {
    fn drop(&mut self) {
        DRAINING.with(|draining| draining.set(false));
    }
}
