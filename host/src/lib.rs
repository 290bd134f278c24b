#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Host runtime contract for WSX.
//!
//! Components never talk to a browser directly. They go through the handles in this
//! crate: [`Document`], [`Node`], [`Element`], [`DocumentFragment`], [`ShadowRoot`],
//! [`StyleSheet`] and [`Event`], plus [`queue_microtask`] for batching.
//!
//! Two backends implement the same surface:
//!
//! - on `wasm32` targets the handles wrap `web-sys` objects and custom elements are
//!   registered with the page's `customElements` registry;
//! - everywhere else an in-memory document provides the same behavior on a single
//!   thread: connection tracking with connected/disconnected/attribute-changed
//!   reactions, focus tracking, form-control values and selections, and simple
//!   selectors. Microtasks run when [`perform_microtask_checkpoint`] is called.
//!
//! The in-memory backend is what the test suites of the other WSX crates run against.

mod error;

#[cfg(not(target_arch = "wasm32"))]
mod memory;
#[cfg(not(target_arch = "wasm32"))]
mod selector;
#[cfg(target_arch = "wasm32")]
mod web;

use std::{fmt, rc::Rc};

pub use error::HostError;

#[cfg(not(target_arch = "wasm32"))]
pub use memory::{
    Document, DocumentFragment, Element, Event, Node, ShadowRoot, StyleSheet,
    perform_microtask_checkpoint, queue_microtask,
};
#[cfg(target_arch = "wasm32")]
pub use web::{
    Document, DocumentFragment, Element, Event, Node, ShadowRoot, StyleSheet, queue_microtask,
};

/// Namespace URI of HTML elements.
pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Namespace URI of SVG elements.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// The kind of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// An element in any namespace.
    Element,
    /// A text node.
    Text,
    /// A comment node.
    Comment,
    /// A document fragment.
    DocumentFragment,
    /// The root of a shadow tree.
    ShadowRoot,
    /// The document itself.
    Document,
}

/// A shared event listener.
pub type Listener = Rc<dyn Fn(&Event)>;

/// Wraps a closure into a [`Listener`].
pub fn listener(f: impl Fn(&Event) + 'static) -> Listener {
    Rc::new(f)
}

/// Per-instance callbacks of a custom element.
///
/// The host invokes these the way the platform invokes the lifecycle methods of a
/// custom element class.
pub trait CustomElement {
    /// The element became connected to a document.
    fn connected_callback(&self);

    /// The element was disconnected from its document.
    fn disconnected_callback(&self);

    /// An observed attribute was added, changed or removed.
    fn attribute_changed_callback(&self, name: &str, old: Option<&str>, new: Option<&str>);
}

type Constructor = dyn Fn(&Element) -> Result<Rc<dyn CustomElement>, HostError>;

/// What the custom element registry needs to construct instances of a tag.
#[derive(Clone)]
pub struct ElementDefinition {
    observed_attributes: Rc<[String]>,
    constructor: Rc<Constructor>,
}

impl ElementDefinition {
    /// Creates a definition from a list of observed attributes and a constructor.
    ///
    /// The constructor runs once per element instance, receiving the freshly created
    /// element, and returns the callbacks bound to that instance.
    pub fn new<I, S, F>(observed_attributes: I, constructor: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Element) -> Result<Rc<dyn CustomElement>, HostError> + 'static,
    {
        Self {
            observed_attributes: observed_attributes.into_iter().map(Into::into).collect(),
            constructor: Rc::new(constructor),
        }
    }

    /// Attribute names whose changes reach
    /// [`CustomElement::attribute_changed_callback`].
    #[must_use]
    pub fn observed_attributes(&self) -> &[String] {
        &self.observed_attributes
    }

    pub(crate) fn construct(&self, element: &Element) -> Result<Rc<dyn CustomElement>, HostError> {
        (self.constructor)(element)
    }
}

impl fmt::Debug for ElementDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementDefinition")
            .field("observed_attributes", &self.observed_attributes)
            .finish_non_exhaustive()
    }
}

/// Checks the rules for valid custom element names: a lowercase ASCII letter first,
/// at least one hyphen, no uppercase ASCII letters, and none of the reserved names.
#[must_use]
pub fn is_valid_custom_element_name(name: &str) -> bool {
    const RESERVED: [&str; 8] = [
        "annotation-xml",
        "color-profile",
        "font-face",
        "font-face-src",
        "font-face-uri",
        "font-face-format",
        "font-face-name",
        "missing-glyph",
    ];

    let mut chars = name.chars();
    let starts_lower = chars.next().is_some_and(|c| c.is_ascii_lowercase());
    starts_lower
        && name.contains('-')
        && name.chars().all(|c| {
            c.is_ascii_lowercase()
                || c.is_ascii_digit()
                || matches!(c, '-' | '.' | '_')
                || !c.is_ascii()
        })
        && !RESERVED.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::is_valid_custom_element_name;

    #[test]
    fn custom_element_names() {
        assert!(is_valid_custom_element_name("my-button"));
        assert!(is_valid_custom_element_name("x-1"));
        assert!(!is_valid_custom_element_name("button"));
        assert!(!is_valid_custom_element_name("My-button"));
        assert!(!is_valid_custom_element_name("1-button"));
        assert!(!is_valid_custom_element_name("my button"));
        assert!(!is_valid_custom_element_name("font-face"));
    }
}
