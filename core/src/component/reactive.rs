use std::{
    any::{Any, type_name},
    cell::{Cell, RefCell},
    collections::{BTreeMap, HashMap},
    fmt::{self, Debug},
    rc::{Rc, Weak},
};

use wsx_host::{Element, HostError};
use wsx_reactive::{
    Reactive, ReactiveCallback, StateGetter, StateSetter, callback, create_state,
    reactive_with_debug,
};

use super::{ComponentHost, Host, focus};
use crate::{ComponentConfig, ComponentError};

/// A host with reactive state.
///
/// Every reactive value and state created through one host shares a single change
/// callback, so any number of writes in the same tick cause one rerender. Writes to
/// a disconnected component do not render.
#[derive(Clone)]
pub struct ReactiveHost(Rc<ReactiveInner>);

struct ReactiveInner {
    base: Host,
    on_change: ReactiveCallback,
    debug: Cell<bool>,
    states: RefCell<HashMap<String, Box<dyn ErasedState>>>,
}

trait ErasedState {
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
    fn describe(&self) -> String;
}

struct StatePair<T> {
    getter: StateGetter<T>,
    setter: StateSetter<T>,
}

impl<T: Debug + 'static> ErasedState for StatePair<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn describe(&self) -> String {
        self.getter.with(|value| format!("{value:?}"))
    }
}

impl Debug for ReactiveHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveHost")
            .field("base", &self.0.base)
            .field("debug", &self.0.debug.get())
            .field("states", &self.state_snapshot())
            .finish_non_exhaustive()
    }
}

impl ComponentHost for ReactiveHost {
    fn create(
        element: &Element,
        name: &'static str,
        config: ComponentConfig,
    ) -> Result<Self, HostError> {
        let debug = config.debug;
        let base = Host::create(element, name, config)?;
        Ok(Self(Rc::new_cyclic(|weak: &Weak<ReactiveInner>| {
            let weak = weak.clone();
            ReactiveInner {
                base,
                on_change: callback(move || {
                    if let Some(inner) = weak.upgrade() {
                        let host = ReactiveHost(inner);
                        if host.0.base.is_connected() {
                            host.rerender();
                        }
                    }
                }),
                debug: Cell::new(debug),
                states: RefCell::default(),
            }
        })))
    }

    fn base(&self) -> &Host {
        &self.0.base
    }

    fn disconnected(&self) {
        self.clear_states();
    }

    fn rerender(&self) {
        Self::rerender(self);
    }
}

impl ReactiveHost {
    /// Rerenders the component, keeping the focused control focused when the
    /// configuration asks for it.
    pub fn rerender(&self) {
        let preserve_focus = self.0.base.config().preserve_focus;
        if preserve_focus {
            focus::rerender_preserving_focus(&self.0.base);
        } else {
            self.0.base.rerender();
        }
    }

    /// Wraps `value` so that changes rerender this component.
    ///
    /// With debugging enabled, changes are also reported under `debug_name`, which
    /// defaults to `<component name>.reactive`.
    pub fn reactive<T>(&self, value: T, debug_name: Option<&str>) -> Reactive<T> {
        let on_change = self.0.on_change.clone();
        if !self.0.debug.get() {
            return wsx_reactive::reactive(value, on_change);
        }
        let name = debug_name.map_or_else(
            || format!("{}.reactive", self.0.base.name()),
            str::to_owned,
        );
        reactive_with_debug(value, on_change, Some(&name))
    }

    /// The state pair stored under `key`, created from `initial` on first use.
    ///
    /// Later calls with the same key return the existing pair and ignore `initial`.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::StateTypeMismatch`] if `key` was created with a
    /// different type.
    pub fn use_state<T>(
        &self,
        key: &str,
        initial: T,
    ) -> Result<(StateGetter<T>, StateSetter<T>), ComponentError>
    where
        T: PartialEq + Debug + 'static,
    {
        let mut states = self.0.states.borrow_mut();
        if let Some(existing) = states.get(key) {
            return existing
                .as_any()
                .downcast_ref::<StatePair<T>>()
                .map(|pair| (pair.getter.clone(), pair.setter.clone()))
                .ok_or_else(|| ComponentError::StateTypeMismatch {
                    key: key.to_owned(),
                    expected: existing.type_name(),
                    requested: type_name::<T>(),
                });
        }

        let (getter, setter) = create_state(initial, self.0.on_change.clone());
        states.insert(
            key.to_owned(),
            Box::new(StatePair {
                getter: getter.clone(),
                setter: setter.clone(),
            }),
        );
        Ok((getter, setter))
    }

    /// The `Debug` rendering of every state value, by key.
    #[must_use]
    pub fn state_snapshot(&self) -> BTreeMap<String, String> {
        self.0
            .states
            .borrow()
            .iter()
            .map(|(key, state)| (key.clone(), state.describe()))
            .collect()
    }

    /// Drops all states. The next [`ReactiveHost::use_state`] starts over.
    pub fn clear_states(&self) {
        self.0.states.borrow_mut().clear();
    }

    /// Reports changes of reactive values created from now on.
    pub fn enable_debug(&self) {
        self.0.debug.set(true);
    }

    /// Stops reporting changes of reactive values created from now on.
    pub fn disable_debug(&self) {
        self.0.debug.set(false);
    }

    /// Whether new reactive values report their changes.
    #[must_use]
    pub fn is_debug_enabled(&self) -> bool {
        self.0.debug.get()
    }
}

impl std::ops::Deref for ReactiveHost {
    type Target = Host;

    fn deref(&self) -> &Host {
        &self.0.base
    }
}
