use std::{
    any::type_name,
    cell::{Ref, RefCell},
    fmt::{self, Debug},
    rc::Rc,
};

use crate::{ReactiveCallback, ReactiveDebug, scheduler::schedule};

/// A shared value whose writes schedule a change notification.
///
/// Reads go straight to the value. Writes go through [`Reactive::set`] or
/// [`Reactive::update`], naming the field being written with a key and a lens. A
/// write that leaves the field equal to its old value is not a change and schedules
/// nothing.
///
/// ```
/// use wsx_reactive::{callback, reactive};
///
/// #[derive(Debug)]
/// struct Counter {
///     count: i32,
/// }
///
/// let counter = reactive(Counter { count: 0 }, callback(|| {}));
/// assert!(counter.set("count", |c| &mut c.count, 1));
/// assert!(!counter.set("count", |c| &mut c.count, 1));
/// assert_eq!(counter.borrow().count, 1);
/// ```
pub struct Reactive<T> {
    inner: Rc<Inner<T>>,
}

struct Inner<T> {
    value: RefCell<T>,
    on_change: ReactiveCallback,
    debug_name: Option<String>,
}

impl<T> Clone for Reactive<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Debug> Debug for Reactive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reactive")
            .field("value", &self.inner.value.borrow())
            .field("debug_name", &self.inner.debug_name)
            .finish_non_exhaustive()
    }
}

/// Wraps `value` so that changing writes schedule `on_change`.
pub fn reactive<T>(value: T, on_change: ReactiveCallback) -> Reactive<T> {
    Reactive::new(value, on_change, None)
}

/// Like [`reactive`], and also reports each change as `name.key: old -> new`
/// through [`ReactiveDebug::log`].
///
/// Without a name, the short type name of `T` is used.
pub fn reactive_with_debug<T>(
    value: T,
    on_change: ReactiveCallback,
    name: Option<&str>,
) -> Reactive<T> {
    let name = name.map_or_else(|| short_type_name::<T>().to_owned(), str::to_owned);
    Reactive::new(value, on_change, Some(name))
}

impl<T> Reactive<T> {
    fn new(value: T, on_change: ReactiveCallback, debug_name: Option<String>) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(value),
                on_change,
                debug_name,
            }),
        }
    }

    /// Borrows the current value.
    ///
    /// # Panics
    ///
    /// Panics if called from inside a lens passed to [`Reactive::set`].
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, T> {
        self.inner.value.borrow()
    }

    /// Runs `f` with a reference to the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Returns a copy of the current value.
    #[must_use]
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.inner.value.borrow().clone()
    }

    /// The name used for debug reporting, if enabled for this value.
    #[must_use]
    pub fn debug_name(&self) -> Option<&str> {
        self.inner.debug_name.as_deref()
    }

    /// Writes `value` into the field selected by `field`. If the field changes, the
    /// change callback is scheduled. Returns whether it changed.
    pub fn set<F>(&self, key: &str, field: impl FnOnce(&mut T) -> &mut F, value: F) -> bool
    where
        F: PartialEq + Debug,
    {
        let report = {
            let mut target = self.inner.value.borrow_mut();
            let slot = field(&mut target);
            if *slot == value {
                return false;
            }
            let old = std::mem::replace(slot, value);
            self.inner
                .debug_name
                .as_ref()
                .map(|name| format!("{name}.{key}: {old:?} -> {:?}", slot))
        };

        if let Some(message) = report {
            ReactiveDebug::log(&message);
        }
        schedule(&self.inner.on_change);
        true
    }

    /// Derives the new value of the field selected by `field` from its current
    /// value. Same change semantics as [`Reactive::set`].
    ///
    /// `f` runs on a copy of the field with no borrow held, so it may read this
    /// value (or a clone of it).
    pub fn update<F>(
        &self,
        key: &str,
        field: impl Fn(&mut T) -> &mut F,
        f: impl FnOnce(&F) -> F,
    ) -> bool
    where
        F: Clone + PartialEq + Debug,
    {
        let current = field(&mut self.inner.value.borrow_mut()).clone();
        self.set(key, field, f(&current))
    }

    /// Replaces the whole value, reported under the key `value`.
    pub fn replace(&self, value: T) -> bool
    where
        T: PartialEq + Debug,
    {
        self.set("value", |whole| whole, value)
    }
}

/// The last path segment of `T`'s type name, without generic arguments.
#[must_use]
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use wsx_host::perform_microtask_checkpoint;

    use super::*;
    use crate::callback;

    #[derive(Debug, Clone, PartialEq)]
    struct Form {
        name: String,
        age: u32,
    }

    fn counted() -> (Rc<Cell<u32>>, ReactiveCallback) {
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        (count, callback(move || seen.set(seen.get() + 1)))
    }

    fn form() -> Form {
        Form {
            name: "Ada".into(),
            age: 36,
        }
    }

    #[test]
    fn same_value_writes_do_not_schedule() {
        let (count, cb) = counted();
        let state = reactive(form(), cb);

        assert!(!state.set("name", |f| &mut f.name, "Ada".to_owned()));
        perform_microtask_checkpoint();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn synchronous_writes_coalesce() {
        let (count, cb) = counted();
        let state = reactive(form(), cb);

        state.set("age", |f| &mut f.age, 37);
        state.set("age", |f| &mut f.age, 38);
        state.set("name", |f| &mut f.name, "Grace".to_owned());
        assert_eq!(count.get(), 0);

        perform_microtask_checkpoint();
        assert_eq!(count.get(), 1);
        assert_eq!(
            state.get(),
            Form {
                name: "Grace".into(),
                age: 38
            }
        );
    }

    #[test]
    fn update_derives_from_previous_value() {
        let (count, cb) = counted();
        let state = reactive(form(), cb);

        assert!(state.update("age", |f| &mut f.age, |age| age + 1));
        assert!(!state.update("age", |f| &mut f.age, |age| *age));
        perform_microtask_checkpoint();

        assert_eq!(state.with(|f| f.age), 37);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn update_may_read_the_value_it_writes() {
        let (count, cb) = counted();
        let state = reactive(form(), cb);
        let other = state.clone();

        assert!(state.update("age", |f| &mut f.age, |age| age + other.borrow().age));
        assert!(state.update("name", |f| &mut f.name, |name| {
            format!("{name} ({})", other.with(|f| f.age))
        }));
        perform_microtask_checkpoint();

        assert_eq!(state.borrow().age, 72);
        assert_eq!(state.borrow().name, "Ada (72)");
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn clones_share_the_value() {
        let (_, cb) = counted();
        let a = reactive(1_i32, cb);
        let b = a.clone();
        assert!(b.replace(2));
        assert_eq!(*a.borrow(), 2);
    }

    #[test]
    fn debug_names() {
        let (count, cb) = counted();
        let named = reactive_with_debug(form(), cb.clone(), Some("profile"));
        let unnamed = reactive_with_debug(form(), cb, None);

        assert_eq!(named.debug_name(), Some("profile"));
        assert_eq!(unnamed.debug_name(), Some("Form"));
        assert_eq!(reactive(0_u8, callback(|| {})).debug_name(), None);

        named.set("age", |f| &mut f.age, 40);
        unnamed.set("age", |f| &mut f.age, 41);
        perform_microtask_checkpoint();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn short_type_names() {
        assert_eq!(short_type_name::<Form>(), "Form");
        assert_eq!(short_type_name::<Vec<String>>(), "Vec");
        assert_eq!(short_type_name::<u8>(), "u8");
    }
}
