use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
};

use crate::{
    CustomElement, ElementDefinition, HTML_NAMESPACE, HostError, Listener, NodeKind,
    selector::SelectorList,
};

use super::{Document, Event, StyleSheet, document};

pub(super) struct NodeCell {
    parent: RefCell<Weak<NodeCell>>,
    children: RefCell<Vec<Node>>,
    data: NodeData,
}

pub(super) enum NodeData {
    Document,
    Element(ElementData),
    Text(RefCell<String>),
    Comment(RefCell<String>),
    Fragment,
    Shadow(ShadowData),
}

pub(super) struct ElementData {
    namespace: Option<String>,
    local_name: String,
    attributes: RefCell<Vec<(String, String)>>,
    listeners: RefCell<Vec<(String, Listener)>>,
    shadow_root: RefCell<Option<ShadowRoot>>,
    reactions: RefCell<Option<Reactions>>,
    value: RefCell<Option<String>>,
    selection: Cell<Option<(u32, u32)>>,
}

struct Reactions {
    observed: Rc<[String]>,
    callbacks: Rc<dyn CustomElement>,
}

pub(super) struct ShadowData {
    host: Weak<NodeCell>,
    adopted: RefCell<Vec<StyleSheet>>,
}

/// A node in the host tree.
#[derive(Clone)]
pub struct Node(pub(super) Rc<NodeCell>);

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self(Rc::new(NodeCell {
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            data,
        }))
    }

    pub(super) fn document_root() -> Self {
        Self::with_data(NodeData::Document)
    }

    pub(super) fn text(data: &str) -> Self {
        Self::with_data(NodeData::Text(RefCell::new(data.to_owned())))
    }

    pub(super) fn comment(data: &str) -> Self {
        Self::with_data(NodeData::Comment(RefCell::new(data.to_owned())))
    }

    pub(super) fn fragment() -> DocumentFragment {
        DocumentFragment(Self::with_data(NodeData::Fragment))
    }

    pub(super) fn element(namespace: Option<&str>, local_name: &str) -> Element {
        Element(Self::with_data(NodeData::Element(ElementData {
            namespace: namespace.map(str::to_owned),
            local_name: local_name.to_owned(),
            attributes: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            shadow_root: RefCell::new(None),
            reactions: RefCell::new(None),
            value: RefCell::new(None),
            selection: Cell::new(None),
        })))
    }

    pub(super) fn downgrade(&self) -> Weak<NodeCell> {
        Rc::downgrade(&self.0)
    }

    /// The kind of this node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match &self.0.data {
            NodeData::Document => NodeKind::Document,
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Comment(_) => NodeKind::Comment,
            NodeData::Fragment => NodeKind::DocumentFragment,
            NodeData::Shadow(_) => NodeKind::ShadowRoot,
        }
    }

    /// Whether both handles refer to the same node.
    #[must_use]
    pub fn is_same_node(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// The parent of this node. Shadow roots have no parent.
    #[must_use]
    pub fn parent_node(&self) -> Option<Self> {
        self.0.parent.borrow().upgrade().map(Self)
    }

    /// The children of this node, in order.
    #[must_use]
    pub fn child_nodes(&self) -> Vec<Self> {
        self.0.children.borrow().clone()
    }

    /// The first child of this node.
    #[must_use]
    pub fn first_child(&self) -> Option<Self> {
        self.0.children.borrow().first().cloned()
    }

    /// The concatenated text of this node and its descendants. Shadow trees are not
    /// included.
    #[must_use]
    pub fn text_content(&self) -> String {
        match &self.0.data {
            NodeData::Text(text) | NodeData::Comment(text) => text.borrow().clone(),
            NodeData::Document => String::new(),
            _ => {
                let mut out = String::new();
                self.collect_text(&mut out);
                out
            }
        }
    }

    fn collect_text(&self, out: &mut String) {
        for child in self.0.children.borrow().iter() {
            match &child.0.data {
                NodeData::Text(text) => out.push_str(&text.borrow()),
                NodeData::Element(_) => child.collect_text(out),
                _ => {}
            }
        }
    }

    /// Whether the node is in a document, looking through shadow hosts.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.shadow_including_root().kind() == NodeKind::Document
    }

    /// Returns the element behind this node, if it is one.
    #[must_use]
    pub fn as_element(&self) -> Option<Element> {
        matches!(self.0.data, NodeData::Element(_)).then(|| Element(self.clone()))
    }

    /// Returns the fragment behind this node, if it is one.
    #[must_use]
    pub fn as_fragment(&self) -> Option<DocumentFragment> {
        matches!(self.0.data, NodeData::Fragment).then(|| DocumentFragment(self.clone()))
    }

    /// Returns the shadow root behind this node, if it is one.
    #[must_use]
    pub fn as_shadow_root(&self) -> Option<ShadowRoot> {
        matches!(self.0.data, NodeData::Shadow(_)).then(|| ShadowRoot(self.clone()))
    }

    pub(super) fn tree_root(&self) -> Self {
        let mut current = self.clone();
        while let Some(parent) = current.parent_node() {
            current = parent;
        }
        current
    }

    fn shadow_including_root(&self) -> Self {
        let mut root = self.tree_root();
        while let NodeData::Shadow(shadow) = &root.0.data {
            match shadow.host.upgrade() {
                Some(host) => root = Self(host).tree_root(),
                None => break,
            }
        }
        root
    }

    /// Whether `self` is `other` or one of its ancestors, crossing shadow boundaries.
    pub(super) fn is_host_including_inclusive_ancestor_of(&self, other: &Self) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if node.is_same_node(self) {
                return true;
            }
            current = match &node.0.data {
                NodeData::Shadow(shadow) => shadow.host.upgrade().map(Self),
                _ => node.parent_node(),
            };
        }
        false
    }

    fn ensure_pre_insert_validity(&self, child: &Self) -> Result<(), HostError> {
        if matches!(self.0.data, NodeData::Text(_) | NodeData::Comment(_)) {
            return Err(HostError::HierarchyRequest("character data cannot have children"));
        }
        if matches!(child.0.data, NodeData::Document | NodeData::Shadow(_)) {
            return Err(HostError::HierarchyRequest(
                "documents and shadow roots cannot be inserted",
            ));
        }
        if child.is_host_including_inclusive_ancestor_of(self) {
            return Err(HostError::HierarchyRequest(
                "a node cannot be inserted into itself or its descendants",
            ));
        }
        Ok(())
    }

    /// Appends `child`. Fragments are emptied into this node; a child that already
    /// has a parent is moved.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::HierarchyRequest`] when the insertion would create an
    /// invalid tree.
    pub fn append_child(&self, child: &Self) -> Result<(), HostError> {
        self.ensure_pre_insert_validity(child)?;

        let inserted = if matches!(child.0.data, NodeData::Fragment) {
            let moved = std::mem::take(&mut *child.0.children.borrow_mut());
            for node in &moved {
                *node.0.parent.borrow_mut() = Weak::new();
            }
            moved
        } else {
            if let Some(old_parent) = child.parent_node() {
                old_parent.remove_child(child)?;
            }
            vec![child.clone()]
        };

        for node in &inserted {
            *node.0.parent.borrow_mut() = self.downgrade();
        }
        self.0.children.borrow_mut().extend(inserted.iter().cloned());

        if self.is_connected() {
            let mut reactions = Vec::new();
            for node in &inserted {
                node.collect_reactions(&mut reactions);
            }
            for callbacks in reactions {
                callbacks.connected_callback();
            }
        }
        Ok(())
    }

    /// Removes `child` from this node.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NotFound`] if `child` is not a child of this node.
    pub fn remove_child(&self, child: &Self) -> Result<(), HostError> {
        let was_connected = self.is_connected();
        {
            let mut children = self.0.children.borrow_mut();
            let index = children
                .iter()
                .position(|candidate| candidate.is_same_node(child))
                .ok_or(HostError::NotFound)?;
            children.remove(index);
        }
        *child.0.parent.borrow_mut() = Weak::new();

        if was_connected {
            child.after_disconnect();
        }
        Ok(())
    }

    /// Removes every child of this node.
    ///
    /// # Errors
    ///
    /// Never fails on this backend; the browser backend reports DOM exceptions.
    pub fn remove_children(&self) -> Result<(), HostError> {
        let was_connected = self.is_connected();
        let removed = std::mem::take(&mut *self.0.children.borrow_mut());
        for node in &removed {
            *node.0.parent.borrow_mut() = Weak::new();
        }
        if was_connected {
            for node in &removed {
                node.after_disconnect();
            }
        }
        Ok(())
    }

    fn after_disconnect(&self) {
        document::release_focus_within(self);

        let mut reactions = Vec::new();
        self.collect_reactions(&mut reactions);
        for callbacks in reactions {
            callbacks.disconnected_callback();
        }
    }

    /// Custom element callbacks of this subtree in shadow-including tree order.
    fn collect_reactions(&self, out: &mut Vec<Rc<dyn CustomElement>>) {
        if let NodeData::Element(data) = &self.0.data {
            if let Some(reactions) = data.reactions.borrow().as_ref() {
                out.push(reactions.callbacks.clone());
            }
            let shadow = data.shadow_root.borrow().clone();
            if let Some(shadow) = shadow {
                shadow.0.collect_reactions(out);
            }
        }
        let children = self.child_nodes();
        for child in &children {
            child.collect_reactions(out);
        }
    }

    /// Elements of this subtree in shadow-including tree order.
    pub(super) fn shadow_including_elements(&self, out: &mut Vec<Element>) {
        if let Some(element) = self.as_element() {
            let shadow = element.shadow_root();
            out.push(element);
            if let Some(shadow) = shadow {
                shadow.0.shadow_including_elements(out);
            }
        }
        for child in self.child_nodes() {
            child.shadow_including_elements(out);
        }
    }

    /// Visits descendants in tree order without entering shadow trees. The visitor
    /// returns `false` to stop.
    fn walk_elements(&self, visit: &mut dyn FnMut(&Element) -> bool) -> bool {
        for child in self.child_nodes() {
            if let Some(element) = child.as_element() {
                if !visit(&element) {
                    return false;
                }
            }
            if !child.walk_elements(visit) {
                return false;
            }
        }
        true
    }

    pub(super) fn query_selector(&self, selectors: &str) -> Result<Option<Element>, HostError> {
        let list = SelectorList::parse(selectors)?;
        let mut found = None;
        self.walk_elements(&mut |element| {
            if list.matches(element) {
                found = Some(element.clone());
                false
            } else {
                true
            }
        });
        Ok(found)
    }

    pub(super) fn query_selector_all(&self, selectors: &str) -> Result<Vec<Element>, HostError> {
        let list = SelectorList::parse(selectors)?;
        let mut found = Vec::new();
        self.walk_elements(&mut |element| {
            if list.matches(element) {
                found.push(element.clone());
            }
            true
        });
        Ok(found)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.is_same_node(other)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.data {
            NodeData::Element(data) => write!(f, "<{}>", data.local_name),
            NodeData::Text(text) => write!(f, "{:?}", text.borrow()),
            NodeData::Comment(text) => write!(f, "<!--{}-->", text.borrow()),
            NodeData::Fragment => f.write_str("#document-fragment"),
            NodeData::Shadow(_) => f.write_str("#shadow-root"),
            NodeData::Document => f.write_str("#document"),
        }
    }
}

/// An element handle.
#[derive(Clone, PartialEq, Eq)]
pub struct Element(Node);

impl Element {
    fn data(&self) -> &ElementData {
        match &self.0.0.data {
            NodeData::Element(data) => data,
            _ => unreachable!("element handle over a non-element node"),
        }
    }

    /// The element as a plain node.
    #[must_use]
    pub fn to_node(&self) -> Node {
        self.0.clone()
    }

    /// Whether both handles refer to the same element.
    #[must_use]
    pub fn is_same_node(&self, other: &Self) -> bool {
        self.0.is_same_node(&other.0)
    }

    /// The local name as created, e.g. `div` or `linearGradient`.
    #[must_use]
    pub fn local_name(&self) -> String {
        self.data().local_name.clone()
    }

    /// The tag name: upper-cased for HTML elements, as created otherwise.
    #[must_use]
    pub fn tag_name(&self) -> String {
        if self.is_html() {
            self.data().local_name.to_ascii_uppercase()
        } else {
            self.data().local_name.clone()
        }
    }

    /// The namespace URI of the element.
    #[must_use]
    pub fn namespace_uri(&self) -> Option<String> {
        self.data().namespace.clone()
    }

    fn is_html(&self) -> bool {
        self.data().namespace.as_deref() == Some(HTML_NAMESPACE)
    }

    fn normalize_attribute_name(&self, name: &str) -> String {
        if self.is_html() {
            name.to_ascii_lowercase()
        } else {
            name.to_owned()
        }
    }

    /// Returns the value of an attribute.
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<String> {
        let name = self.normalize_attribute_name(name);
        self.data()
            .attributes
            .borrow()
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, value)| value.clone())
    }

    /// Whether the attribute is present.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    /// Names of all attributes, in insertion order.
    #[must_use]
    pub fn attribute_names(&self) -> Vec<String> {
        self.data()
            .attributes
            .borrow()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Sets an attribute. Names are lower-cased on HTML elements.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidCharacter`] for names the DOM rejects.
    pub fn set_attribute(&self, name: &str, value: &str) -> Result<(), HostError> {
        validate_name(name)?;
        let name = self.normalize_attribute_name(name);
        let old = {
            let mut attributes = self.data().attributes.borrow_mut();
            if let Some(slot) = attributes.iter_mut().find(|(candidate, _)| *candidate == name) {
                Some(std::mem::replace(&mut slot.1, value.to_owned()))
            } else {
                attributes.push((name.clone(), value.to_owned()));
                None
            }
        };
        self.attribute_changed(&name, old.as_deref(), Some(value));
        Ok(())
    }

    /// Removes an attribute if present.
    ///
    /// # Errors
    ///
    /// Never fails on this backend; the browser backend reports DOM exceptions.
    pub fn remove_attribute(&self, name: &str) -> Result<(), HostError> {
        let name = self.normalize_attribute_name(name);
        let old = {
            let mut attributes = self.data().attributes.borrow_mut();
            attributes
                .iter()
                .position(|(candidate, _)| *candidate == name)
                .map(|index| attributes.remove(index).1)
        };
        if let Some(old) = old {
            self.attribute_changed(&name, Some(&old), None);
        }
        Ok(())
    }

    fn attribute_changed(&self, name: &str, old: Option<&str>, new: Option<&str>) {
        let callbacks = self
            .data()
            .reactions
            .borrow()
            .as_ref()
            .filter(|reactions| reactions.observed.iter().any(|observed| observed == name))
            .map(|reactions| reactions.callbacks.clone());
        if let Some(callbacks) = callbacks {
            callbacks.attribute_changed_callback(name, old, new);
        }
    }

    /// The `class` attribute, or an empty string.
    #[must_use]
    pub fn class_name(&self) -> String {
        self.get_attribute("class").unwrap_or_default()
    }

    /// Sets the `class` attribute.
    ///
    /// # Errors
    ///
    /// Never fails on this backend; the browser backend reports DOM exceptions.
    pub fn set_class_name(&self, class_name: &str) -> Result<(), HostError> {
        self.set_attribute("class", class_name)
    }

    /// The whitespace-separated tokens of the `class` attribute.
    #[must_use]
    pub fn class_list(&self) -> Vec<String> {
        self.class_name()
            .split_whitespace()
            .map(str::to_owned)
            .collect()
    }

    /// Replaces all children with a single text node (or nothing for `""`).
    ///
    /// # Errors
    ///
    /// Never fails on this backend; the browser backend reports DOM exceptions.
    pub fn set_text_content(&self, text: &str) -> Result<(), HostError> {
        self.0.remove_children()?;
        if !text.is_empty() {
            self.0.append_child(&Node::text(text))?;
        }
        Ok(())
    }

    /// The element children, in order.
    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        self.0
            .child_nodes()
            .iter()
            .filter_map(Node::as_element)
            .collect()
    }

    /// Appends a child node.
    ///
    /// # Errors
    ///
    /// See [`Node::append_child`].
    pub fn append_child(&self, child: &Node) -> Result<(), HostError> {
        self.0.append_child(child)
    }

    /// Registers a listener for events of type `kind`.
    ///
    /// # Errors
    ///
    /// Never fails on this backend; the browser backend reports DOM exceptions.
    pub fn add_event_listener(&self, kind: &str, listener: Listener) -> Result<(), HostError> {
        self.data()
            .listeners
            .borrow_mut()
            .push((kind.to_owned(), listener));
        Ok(())
    }

    /// Dispatches `event` to this element's listeners. Returns `false` if a listener
    /// canceled the event.
    ///
    /// # Errors
    ///
    /// Never fails on this backend; the browser backend reports DOM exceptions.
    pub fn dispatch_event(&self, event: &Event) -> Result<bool, HostError> {
        event.set_target(self);
        let kind = event.event_type();
        let listeners: Vec<Listener> = self
            .data()
            .listeners
            .borrow()
            .iter()
            .filter(|(candidate, _)| *candidate == kind)
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(event);
        }
        Ok(!event.default_prevented())
    }

    /// Attaches an open shadow root.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NotSupported`] if a shadow root is already attached.
    pub fn attach_shadow(&self) -> Result<ShadowRoot, HostError> {
        let data = self.data();
        if data.shadow_root.borrow().is_some() {
            return Err(HostError::NotSupported(format!(
                "<{}> already hosts a shadow root",
                data.local_name
            )));
        }
        let shadow = ShadowRoot(Node::with_data(NodeData::Shadow(ShadowData {
            host: self.0.downgrade(),
            adopted: RefCell::new(Vec::new()),
        })));
        *data.shadow_root.borrow_mut() = Some(shadow.clone());
        Ok(shadow)
    }

    /// The attached shadow root, if any.
    #[must_use]
    pub fn shadow_root(&self) -> Option<ShadowRoot> {
        self.data().shadow_root.borrow().clone()
    }

    pub(super) fn is_upgraded(&self) -> bool {
        self.data().reactions.borrow().is_some()
    }

    pub(super) fn reaction(&self) -> Option<Rc<dyn CustomElement>> {
        self.data()
            .reactions
            .borrow()
            .as_ref()
            .map(|reactions| reactions.callbacks.clone())
    }

    pub(super) fn upgrade(&self, definition: &ElementDefinition) -> Result<(), HostError> {
        let callbacks = definition.construct(self)?;
        *self.data().reactions.borrow_mut() = Some(Reactions {
            observed: definition.observed_attributes().into(),
            callbacks,
        });
        Ok(())
    }

    /// Returns the first descendant matching `selectors`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Syntax`] for selectors outside the supported subset.
    pub fn query_selector(&self, selectors: &str) -> Result<Option<Self>, HostError> {
        self.0.query_selector(selectors)
    }

    /// Returns all descendants matching `selectors`, in tree order.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Syntax`] for selectors outside the supported subset.
    pub fn query_selector_all(&self, selectors: &str) -> Result<Vec<Self>, HostError> {
        self.0.query_selector_all(selectors)
    }

    /// Focuses the element. Disconnected elements cannot take focus.
    ///
    /// # Errors
    ///
    /// Never fails on this backend; the browser backend reports DOM exceptions.
    pub fn focus(&self, prevent_scroll: bool) -> Result<(), HostError> {
        let _ = prevent_scroll;
        if self.0.is_connected() {
            document::set_focused(Some(self));
        }
        Ok(())
    }

    /// Removes focus from the element if it has it.
    pub fn blur(&self) {
        if Document::global()
            .focused_element()
            .is_some_and(|focused| focused.is_same_node(self))
        {
            document::set_focused(None);
        }
    }

    fn is_form_control(&self) -> bool {
        self.is_html() && matches!(self.data().local_name.as_str(), "input" | "textarea" | "select")
    }

    fn is_text_control(&self) -> bool {
        self.is_html() && matches!(self.data().local_name.as_str(), "input" | "textarea")
    }

    /// Whether the element is editable through `contenteditable`.
    #[must_use]
    pub fn is_content_editable(&self) -> bool {
        self.is_html()
            && self
                .get_attribute("contenteditable")
                .is_some_and(|value| !value.eq_ignore_ascii_case("false"))
    }

    /// The current value of an `input`, `textarea` or `select`; `None` for other
    /// elements.
    #[must_use]
    pub fn value(&self) -> Option<String> {
        if !self.is_form_control() {
            return None;
        }
        let data = self.data();
        let value = data.value.borrow().clone();
        Some(value.unwrap_or_else(|| {
            if data.local_name == "textarea" {
                self.0.text_content()
            } else {
                self.get_attribute("value").unwrap_or_default()
            }
        }))
    }

    /// Sets the current value of a form control and moves the caret to the end.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NotSupported`] for elements without a value.
    pub fn set_value(&self, value: &str) -> Result<(), HostError> {
        if !self.is_form_control() {
            return Err(HostError::NotSupported(format!(
                "<{}> has no value",
                self.data().local_name
            )));
        }
        *self.data().value.borrow_mut() = Some(value.to_owned());
        let end = text_length(value);
        self.data().selection.set(Some((end, end)));
        Ok(())
    }

    /// The selection offsets (in characters) of a text control or content-editable
    /// element.
    #[must_use]
    pub fn selection_range(&self) -> Option<(u32, u32)> {
        if self.is_text_control() {
            let end = text_length(&self.value().unwrap_or_default());
            Some(self.data().selection.get().unwrap_or((end, end)))
        } else if self.is_content_editable() {
            self.data().selection.get()
        } else {
            None
        }
    }

    /// Sets the selection offsets, clamped to the current text length.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NotSupported`] for elements without a text selection.
    pub fn set_selection_range(&self, start: u32, end: u32) -> Result<(), HostError> {
        let length = if self.is_text_control() {
            text_length(&self.value().unwrap_or_default())
        } else if self.is_content_editable() {
            text_length(&self.0.text_content())
        } else {
            return Err(HostError::NotSupported(format!(
                "<{}> has no text selection",
                self.data().local_name
            )));
        };
        let end = end.min(length);
        self.data().selection.set(Some((start.min(end), end)));
        Ok(())
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        element.0
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A lightweight container whose children move into the node it is appended to.
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentFragment(Node);

impl DocumentFragment {
    /// The fragment as a plain node.
    #[must_use]
    pub fn to_node(&self) -> Node {
        self.0.clone()
    }

    /// Appends a child node.
    ///
    /// # Errors
    ///
    /// See [`Node::append_child`].
    pub fn append_child(&self, child: &Node) -> Result<(), HostError> {
        self.0.append_child(child)
    }

    /// The children of the fragment.
    #[must_use]
    pub fn child_nodes(&self) -> Vec<Node> {
        self.0.child_nodes()
    }

    /// The concatenated text of the fragment.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.0.text_content()
    }
}

impl From<DocumentFragment> for Node {
    fn from(fragment: DocumentFragment) -> Self {
        fragment.0
    }
}

impl fmt::Debug for DocumentFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The root of an open shadow tree.
#[derive(Clone, PartialEq, Eq)]
pub struct ShadowRoot(Node);

impl ShadowRoot {
    fn data(&self) -> &ShadowData {
        match &self.0.0.data {
            NodeData::Shadow(data) => data,
            _ => unreachable!("shadow root handle over a non-shadow node"),
        }
    }

    /// The shadow root as a plain node.
    #[must_use]
    pub fn to_node(&self) -> Node {
        self.0.clone()
    }

    /// The element hosting this shadow root, unless it has been dropped.
    #[must_use]
    pub fn host(&self) -> Option<Element> {
        self.data().host.upgrade().map(|cell| Element(Node(cell)))
    }

    /// Appends a child node.
    ///
    /// # Errors
    ///
    /// See [`Node::append_child`].
    pub fn append_child(&self, child: &Node) -> Result<(), HostError> {
        self.0.append_child(child)
    }

    /// Removes all children. Adopted style sheets are kept.
    ///
    /// # Errors
    ///
    /// Never fails on this backend; the browser backend reports DOM exceptions.
    pub fn remove_children(&self) -> Result<(), HostError> {
        self.0.remove_children()
    }

    /// The children of the shadow root.
    #[must_use]
    pub fn child_nodes(&self) -> Vec<Node> {
        self.0.child_nodes()
    }

    /// The concatenated text of the shadow tree.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.0.text_content()
    }

    /// The style sheets adopted by this shadow root.
    #[must_use]
    pub fn adopted_style_sheets(&self) -> Vec<StyleSheet> {
        self.data().adopted.borrow().clone()
    }

    /// Replaces the adopted style sheets.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NotSupported`] when the document does not support
    /// constructable style sheets.
    pub fn set_adopted_style_sheets(&self, sheets: &[StyleSheet]) -> Result<(), HostError> {
        if !Document::global().supports_adopted_style_sheets() && !sheets.is_empty() {
            return Err(HostError::NotSupported(
                "adoptedStyleSheets is unavailable".to_owned(),
            ));
        }
        *self.data().adopted.borrow_mut() = sheets.to_vec();
        Ok(())
    }

    /// The focused element of this shadow tree, retargeted to the shadow host when
    /// focus sits in a nested shadow tree.
    #[must_use]
    pub fn active_element(&self) -> Option<Element> {
        let mut current = Document::global().focused_element()?;
        loop {
            let root = current.0.tree_root();
            if root.is_same_node(&self.0) {
                return Some(current);
            }
            match &root.0.data {
                NodeData::Shadow(shadow) => {
                    current = shadow.host.upgrade().map(|cell| Element(Node(cell)))?;
                }
                _ => return None,
            }
        }
    }

    /// Returns the first element in the shadow tree matching `selectors`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Syntax`] for selectors outside the supported subset.
    pub fn query_selector(&self, selectors: &str) -> Result<Option<Element>, HostError> {
        self.0.query_selector(selectors)
    }

    /// Returns all elements in the shadow tree matching `selectors`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Syntax`] for selectors outside the supported subset.
    pub fn query_selector_all(&self, selectors: &str) -> Result<Vec<Element>, HostError> {
        self.0.query_selector_all(selectors)
    }
}

impl fmt::Debug for ShadowRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Rejects empty names and names containing whitespace or markup characters.
pub(super) fn validate_name(name: &str) -> Result<(), HostError> {
    let invalid = name.is_empty()
        || name.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '.')
        || name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '\'' | '/' | '=' | '&'));
    if invalid {
        Err(HostError::InvalidCharacter(name.to_owned()))
    } else {
        Ok(())
    }
}

fn text_length(text: &str) -> u32 {
    u32::try_from(text.chars().count()).unwrap_or(u32::MAX)
}
