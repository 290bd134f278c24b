use std::{cell::RefCell, fmt, rc::Rc};

use crate::{ReactiveCallback, scheduler::schedule};

struct Slot<T> {
    value: RefCell<T>,
    on_change: ReactiveCallback,
}

/// Read half of a state pair created by [`create_state`].
pub struct StateGetter<T>(Rc<Slot<T>>);

/// Write half of a state pair created by [`create_state`].
pub struct StateSetter<T>(Rc<Slot<T>>);

/// Creates a single piece of state and returns its getter and setter.
///
/// The setter only writes, and only schedules `on_change`, when the new value
/// differs from the current one.
///
/// ```
/// use wsx_reactive::{callback, create_state};
///
/// let (count, set_count) = create_state(0, callback(|| {}));
/// set_count.update(|n| n + 1);
/// assert_eq!(count.get(), 1);
/// ```
pub fn create_state<T: PartialEq>(
    initial: T,
    on_change: ReactiveCallback,
) -> (StateGetter<T>, StateSetter<T>) {
    let cell = Rc::new(Slot {
        value: RefCell::new(initial),
        on_change,
    });
    (StateGetter(cell.clone()), StateSetter(cell))
}

impl<T> StateGetter<T> {
    /// Returns a copy of the current value.
    #[must_use]
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.value.borrow().clone()
    }

    /// Runs `f` with a reference to the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.value.borrow())
    }
}

impl<T: PartialEq> StateSetter<T> {
    /// Stores `value` if it differs from the current value. Returns whether it did.
    pub fn set(&self, value: T) -> bool {
        {
            let mut current = self.0.value.borrow_mut();
            if *current == value {
                return false;
            }
            *current = value;
        }
        schedule(&self.0.on_change);
        true
    }

    /// Derives the next value from the current one, then behaves like
    /// [`StateSetter::set`].
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> bool {
        let next = f(&self.0.value.borrow());
        self.set(next)
    }
}

impl<T> Clone for StateGetter<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: fmt::Debug> fmt::Debug for StateGetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateGetter").field(&self.0.value.borrow()).finish()
    }
}

impl<T> fmt::Debug for StateSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StateSetter")
    }
}
