use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use crate::HostError;

use super::Element;

/// An event dispatched to an element.
///
/// Events created with [`Event::new`] do not bubble; listeners on the target run in
/// registration order.
#[derive(Clone)]
pub struct Event(Rc<EventState>);

struct EventState {
    kind: String,
    target: RefCell<Option<Element>>,
    default_prevented: Cell<bool>,
}

impl Event {
    /// Creates an event of the given type.
    ///
    /// # Errors
    ///
    /// Never fails on this backend; the browser backend reports construction errors.
    pub fn new(kind: &str) -> Result<Self, HostError> {
        Ok(Self(Rc::new(EventState {
            kind: kind.to_owned(),
            target: RefCell::new(None),
            default_prevented: Cell::new(false),
        })))
    }

    /// The event type, e.g. `click`.
    #[must_use]
    pub fn event_type(&self) -> String {
        self.0.kind.clone()
    }

    /// The element the event was dispatched to.
    #[must_use]
    pub fn target(&self) -> Option<Element> {
        self.0.target.borrow().clone()
    }

    /// Marks the event as canceled.
    pub fn prevent_default(&self) {
        self.0.default_prevented.set(true);
    }

    /// Whether a listener called [`Event::prevent_default`].
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.0.default_prevented.get()
    }

    pub(super) fn set_target(&self, target: &Element) {
        *self.0.target.borrow_mut() = Some(target.clone());
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("type", &self.0.kind)
            .field("default_prevented", &self.0.default_prevented.get())
            .finish_non_exhaustive()
    }
}
