use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt,
    rc::Rc,
};

use crate::{ElementDefinition, HTML_NAMESPACE, HostError, NodeKind, is_valid_custom_element_name};

use super::{DocumentFragment, Element, Node, StyleSheet, node};

thread_local! {
    static DOCUMENT: Document = Document::new();
}

/// The document of the current thread.
///
/// It starts out as `<html><head></head><body></body></html>`; anything appended
/// under [`Document::body`] counts as connected.
#[derive(Clone)]
pub struct Document(Rc<DocumentState>);

struct DocumentState {
    root: Node,
    head: Element,
    body: Element,
    registry: RefCell<HashMap<String, ElementDefinition>>,
    focused: RefCell<Option<Element>>,
    constructable_style_sheets: Cell<bool>,
}

impl Document {
    fn new() -> Self {
        let root = Node::document_root();
        let html = Node::element(Some(HTML_NAMESPACE), "html");
        let head = Node::element(Some(HTML_NAMESPACE), "head");
        let body = Node::element(Some(HTML_NAMESPACE), "body");

        let build = || -> Result<(), HostError> {
            html.append_child(&head.to_node())?;
            html.append_child(&body.to_node())?;
            root.append_child(&html.to_node())
        };
        if let Err(err) = build() {
            tracing::error!("failed to assemble the in-memory document: {err}");
        }

        Self(Rc::new(DocumentState {
            root,
            head,
            body,
            registry: RefCell::new(HashMap::new()),
            focused: RefCell::new(None),
            constructable_style_sheets: Cell::new(true),
        }))
    }

    pub(super) fn global() -> Self {
        DOCUMENT.with(Clone::clone)
    }

    /// Returns the current document.
    ///
    /// # Errors
    ///
    /// Never fails on this backend; the browser backend returns
    /// [`HostError::DomUnavailable`] outside a window.
    pub fn current() -> Result<Self, HostError> {
        Ok(Self::global())
    }

    /// The document as a plain node.
    #[must_use]
    pub fn to_node(&self) -> Node {
        self.0.root.clone()
    }

    /// The `<head>` element.
    #[must_use]
    pub fn head(&self) -> Option<Element> {
        Some(self.0.head.clone())
    }

    /// The `<body>` element.
    #[must_use]
    pub fn body(&self) -> Option<Element> {
        Some(self.0.body.clone())
    }

    /// Creates an HTML element. The tag is lower-cased; a tag with a custom element
    /// definition is constructed through it.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidCharacter`] for invalid tag names.
    pub fn create_element(&self, tag: &str) -> Result<Element, HostError> {
        node::validate_name(tag)?;
        let element = Node::element(Some(HTML_NAMESPACE), &tag.to_ascii_lowercase());
        self.try_upgrade(&element);
        Ok(element)
    }

    /// Creates an element in `namespace`, keeping the case of `qualified_name`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidCharacter`] for invalid tag names.
    pub fn create_element_ns(
        &self,
        namespace: Option<&str>,
        qualified_name: &str,
    ) -> Result<Element, HostError> {
        node::validate_name(qualified_name)?;
        let element = Node::element(namespace, qualified_name);
        if namespace == Some(HTML_NAMESPACE) {
            self.try_upgrade(&element);
        }
        Ok(element)
    }

    fn try_upgrade(&self, element: &Element) {
        let definition = self.0.registry.borrow().get(&element.local_name()).cloned();
        if let Some(definition) = definition {
            if let Err(err) = element.upgrade(&definition) {
                tracing::error!("failed to construct <{}>: {err}", element.local_name());
            }
        }
    }

    /// Creates a text node.
    #[must_use]
    pub fn create_text_node(&self, data: &str) -> Node {
        Node::text(data)
    }

    /// Creates a comment node.
    #[must_use]
    pub fn create_comment(&self, data: &str) -> Node {
        Node::comment(data)
    }

    /// Creates an empty document fragment.
    #[must_use]
    pub fn create_document_fragment(&self) -> DocumentFragment {
        Node::fragment()
    }

    /// Creates a constructable style sheet holding `css`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NotSupported`] when constructable style sheets are
    /// disabled.
    pub fn create_style_sheet(&self, css: &str) -> Result<StyleSheet, HostError> {
        if self.supports_adopted_style_sheets() {
            Ok(StyleSheet::new(css))
        } else {
            Err(HostError::NotSupported(
                "constructable style sheets are unavailable".to_owned(),
            ))
        }
    }

    /// Whether shadow roots can adopt constructable style sheets.
    #[must_use]
    pub fn supports_adopted_style_sheets(&self) -> bool {
        self.0.constructable_style_sheets.get()
    }

    /// Turns constructable style sheet support on or off, to exercise fallbacks for
    /// older engines.
    pub fn set_adopted_style_sheets_supported(&self, supported: bool) {
        self.0.constructable_style_sheets.set(supported);
    }

    /// Registers a custom element definition. Elements with that tag already in the
    /// document are upgraded, and the connected ones receive `connected_callback`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Syntax`] for invalid custom element names and
    /// [`HostError::NotSupported`] when the name is already defined.
    pub fn define_custom_element(
        &self,
        name: &str,
        definition: ElementDefinition,
    ) -> Result<(), HostError> {
        if !is_valid_custom_element_name(name) {
            return Err(HostError::Syntax(format!(
                "`{name}` is not a valid custom element name"
            )));
        }
        {
            let mut registry = self.0.registry.borrow_mut();
            if registry.contains_key(name) {
                return Err(HostError::NotSupported(format!(
                    "`{name}` has already been defined"
                )));
            }
            registry.insert(name.to_owned(), definition.clone());
        }

        let mut candidates = Vec::new();
        self.0.root.shadow_including_elements(&mut candidates);
        for element in candidates {
            let matches = element.local_name() == name
                && element.namespace_uri().as_deref() == Some(HTML_NAMESPACE)
                && !element.is_upgraded();
            if !matches {
                continue;
            }
            if let Err(err) = element.upgrade(&definition) {
                tracing::error!("failed to upgrade <{name}>: {err}");
                continue;
            }
            if let Some(callbacks) = element.reaction() {
                callbacks.connected_callback();
            }
        }
        Ok(())
    }

    /// Whether `name` has a custom element definition.
    #[must_use]
    pub fn is_custom_element_defined(&self, name: &str) -> bool {
        self.0.registry.borrow().contains_key(name)
    }

    /// The focused element, retargeted out of shadow trees to their outermost host.
    #[must_use]
    pub fn active_element(&self) -> Option<Element> {
        let mut current = self.focused_element()?;
        loop {
            let root = current.to_node().tree_root();
            match root.kind() {
                NodeKind::Document => return Some(current),
                NodeKind::ShadowRoot => current = root.as_shadow_root()?.host()?,
                _ => return None,
            }
        }
    }

    pub(super) fn focused_element(&self) -> Option<Element> {
        self.0.focused.borrow().clone()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Document {}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("defined", &self.0.registry.borrow().keys().collect::<Vec<_>>())
            .field("focused", &self.0.focused.borrow())
            .finish_non_exhaustive()
    }
}

pub(super) fn set_focused(element: Option<&Element>) {
    let document = Document::global();
    *document.0.focused.borrow_mut() = element.cloned();
}

/// Drops focus if it sits inside the subtree rooted at `removed`.
pub(super) fn release_focus_within(removed: &Node) {
    let document = Document::global();
    let inside = document
        .focused_element()
        .is_some_and(|focused| removed.is_host_including_inclusive_ancestor_of(&focused.to_node()));
    if inside {
        *document.0.focused.borrow_mut() = None;
    }
}
