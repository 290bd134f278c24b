//! Browser implementation of the host contract on top of `web-sys`.

mod custom;

use js_sys::{Array, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use web_sys::{
    CssStyleSheet, FocusOptions, HtmlElement, HtmlInputElement, HtmlSelectElement,
    HtmlTextAreaElement, ShadowRootInit, ShadowRootMode,
};

use crate::{ElementDefinition, HostError, Listener, NodeKind, is_valid_custom_element_name};

const ADOPTED_STYLE_SHEETS: &str = "adoptedStyleSheets";

/// Queues `task` on the browser's microtask queue.
pub fn queue_microtask(task: impl FnOnce() + 'static) {
    if let Some(window) = web_sys::window() {
        let callback = Closure::once_into_js(task);
        window.queue_microtask(callback.unchecked_ref());
    } else {
        let callback = Closure::<dyn FnMut(JsValue)>::once(move |_| task());
        let _ = Promise::resolve(&JsValue::UNDEFINED).then(&callback);
        callback.forget();
    }
}

/// The page document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document(web_sys::Document);

impl Document {
    /// Returns the document of the current window.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::DomUnavailable`] outside a window.
    pub fn current() -> Result<Self, HostError> {
        web_sys::window()
            .and_then(|window| window.document())
            .map(Self)
            .ok_or(HostError::DomUnavailable)
    }

    /// The document as a plain node.
    #[must_use]
    pub fn to_node(&self) -> Node {
        Node(self.0.clone().into())
    }

    /// The `<head>` element.
    #[must_use]
    pub fn head(&self) -> Option<Element> {
        self.0.head().map(|head| Element(head.into()))
    }

    /// The `<body>` element.
    #[must_use]
    pub fn body(&self) -> Option<Element> {
        self.0.body().map(|body| Element(body.into()))
    }

    /// Creates an HTML element, constructing it as a custom element when its tag is
    /// defined.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid tag names.
    pub fn create_element(&self, tag: &str) -> Result<Element, HostError> {
        Ok(Element(self.0.create_element(tag)?))
    }

    /// Creates an element in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid qualified names.
    pub fn create_element_ns(
        &self,
        namespace: Option<&str>,
        qualified_name: &str,
    ) -> Result<Element, HostError> {
        Ok(Element(self.0.create_element_ns(namespace, qualified_name)?))
    }

    /// Creates a text node.
    #[must_use]
    pub fn create_text_node(&self, data: &str) -> Node {
        Node(self.0.create_text_node(data).into())
    }

    /// Creates a comment node.
    #[must_use]
    pub fn create_comment(&self, data: &str) -> Node {
        Node(self.0.create_comment(data).into())
    }

    /// Creates an empty document fragment.
    #[must_use]
    pub fn create_document_fragment(&self) -> DocumentFragment {
        DocumentFragment(self.0.create_document_fragment())
    }

    /// Creates a constructable style sheet holding `css`.
    ///
    /// # Errors
    ///
    /// Returns an error when the browser lacks constructable style sheets or rejects
    /// the CSS.
    pub fn create_style_sheet(&self, css: &str) -> Result<StyleSheet, HostError> {
        let sheet = CssStyleSheet::new()?;
        sheet.replace_sync(css)?;
        Ok(StyleSheet(sheet))
    }

    /// Whether shadow roots can adopt constructable style sheets.
    #[must_use]
    pub fn supports_adopted_style_sheets(&self) -> bool {
        Reflect::has(&self.0, &JsValue::from_str(ADOPTED_STYLE_SHEETS)).unwrap_or(false)
    }

    /// Defines a custom element on the page registry.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Syntax`] for invalid names, [`HostError::NotSupported`]
    /// when the name is taken, and [`HostError::Js`] for registry failures.
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
        if self.is_custom_element_defined(name) {
            return Err(HostError::NotSupported(format!(
                "`{name}` has already been defined"
            )));
        }
        custom::define(name, definition)
    }

    /// Whether `name` is defined on the page registry.
    #[must_use]
    pub fn is_custom_element_defined(&self, name: &str) -> bool {
        web_sys::window()
            .map(|window| window.custom_elements().get(name))
            .is_some_and(|constructor| !constructor.is_undefined())
    }

    /// The focused element as seen from the document.
    #[must_use]
    pub fn active_element(&self) -> Option<Element> {
        self.0.active_element().map(Element)
    }
}

/// A node in the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node(web_sys::Node);

impl Node {
    /// The kind of this node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self.0.node_type() {
            web_sys::Node::ELEMENT_NODE => NodeKind::Element,
            web_sys::Node::TEXT_NODE | web_sys::Node::CDATA_SECTION_NODE => NodeKind::Text,
            web_sys::Node::DOCUMENT_NODE => NodeKind::Document,
            web_sys::Node::DOCUMENT_FRAGMENT_NODE
                if self.0.is_instance_of::<web_sys::ShadowRoot>() =>
            {
                NodeKind::ShadowRoot
            }
            web_sys::Node::DOCUMENT_FRAGMENT_NODE => NodeKind::DocumentFragment,
            _ => NodeKind::Comment,
        }
    }

    /// Whether both handles refer to the same node.
    #[must_use]
    pub fn is_same_node(&self, other: &Self) -> bool {
        self.0.is_same_node(Some(&other.0))
    }

    /// The parent of this node.
    #[must_use]
    pub fn parent_node(&self) -> Option<Self> {
        self.0.parent_node().map(Self)
    }

    /// The children of this node, in order.
    #[must_use]
    pub fn child_nodes(&self) -> Vec<Self> {
        let list = self.0.child_nodes();
        (0..list.length()).filter_map(|i| list.get(i)).map(Self).collect()
    }

    /// The first child of this node.
    #[must_use]
    pub fn first_child(&self) -> Option<Self> {
        self.0.first_child().map(Self)
    }

    /// The concatenated text of this node and its descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.0.text_content().unwrap_or_default()
    }

    /// Whether the node is in a document.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.0.is_connected()
    }

    /// Returns the element behind this node, if it is one.
    #[must_use]
    pub fn as_element(&self) -> Option<Element> {
        self.0.dyn_ref::<web_sys::Element>().cloned().map(Element)
    }

    /// Returns the fragment behind this node, if it is one.
    #[must_use]
    pub fn as_fragment(&self) -> Option<DocumentFragment> {
        (self.kind() == NodeKind::DocumentFragment)
            .then(|| DocumentFragment(self.0.clone().unchecked_into()))
    }

    /// Returns the shadow root behind this node, if it is one.
    #[must_use]
    pub fn as_shadow_root(&self) -> Option<ShadowRoot> {
        self.0.dyn_ref::<web_sys::ShadowRoot>().cloned().map(ShadowRoot)
    }

    /// Appends `child`, moving it from its old parent.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid hierarchies.
    pub fn append_child(&self, child: &Self) -> Result<(), HostError> {
        self.0.append_child(&child.0)?;
        Ok(())
    }

    /// Removes `child` from this node.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NotFound`] if `child` is not a child of this node.
    pub fn remove_child(&self, child: &Self) -> Result<(), HostError> {
        if !child.parent_node().is_some_and(|parent| parent.is_same_node(self)) {
            return Err(HostError::NotFound);
        }
        self.0.remove_child(&child.0)?;
        Ok(())
    }

    /// Removes every child of this node.
    ///
    /// # Errors
    ///
    /// Propagates DOM exceptions.
    pub fn remove_children(&self) -> Result<(), HostError> {
        while let Some(child) = self.0.first_child() {
            self.0.remove_child(&child)?;
        }
        Ok(())
    }
}

/// An element in the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element(web_sys::Element);

impl Element {
    /// The element as a plain node.
    #[must_use]
    pub fn to_node(&self) -> Node {
        Node(self.0.clone().into())
    }

    /// Whether both handles refer to the same element.
    #[must_use]
    pub fn is_same_node(&self, other: &Self) -> bool {
        self.0.is_same_node(Some(&other.0))
    }

    /// The local name as created.
    #[must_use]
    pub fn local_name(&self) -> String {
        self.0.local_name()
    }

    /// The tag name: upper-cased for HTML elements.
    #[must_use]
    pub fn tag_name(&self) -> String {
        self.0.tag_name()
    }

    /// The namespace URI of the element.
    #[must_use]
    pub fn namespace_uri(&self) -> Option<String> {
        self.0.namespace_uri()
    }

    /// Returns the value of an attribute.
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    /// Whether the attribute is present.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.0.has_attribute(name)
    }

    /// Names of all attributes.
    #[must_use]
    pub fn attribute_names(&self) -> Vec<String> {
        self.0
            .get_attribute_names()
            .iter()
            .filter_map(|name| name.as_string())
            .collect()
    }

    /// Sets an attribute.
    ///
    /// # Errors
    ///
    /// Returns an error for names the DOM rejects.
    pub fn set_attribute(&self, name: &str, value: &str) -> Result<(), HostError> {
        self.0.set_attribute(name, value)?;
        Ok(())
    }

    /// Removes an attribute if present.
    ///
    /// # Errors
    ///
    /// Propagates DOM exceptions.
    pub fn remove_attribute(&self, name: &str) -> Result<(), HostError> {
        self.0.remove_attribute(name)?;
        Ok(())
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
    /// Propagates DOM exceptions.
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

    /// Replaces all children with a single text node.
    ///
    /// # Errors
    ///
    /// Propagates DOM exceptions.
    pub fn set_text_content(&self, text: &str) -> Result<(), HostError> {
        self.0.set_text_content(Some(text));
        Ok(())
    }

    /// The element children, in order.
    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        let collection = self.0.children();
        (0..collection.length())
            .filter_map(|i| collection.item(i))
            .map(Self)
            .collect()
    }

    /// Appends a child node.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid hierarchies.
    pub fn append_child(&self, child: &Node) -> Result<(), HostError> {
        self.0.append_child(&child.0)?;
        Ok(())
    }

    /// Registers a listener for events of type `kind`. The listener stays attached
    /// for the life of the element.
    ///
    /// # Errors
    ///
    /// Propagates DOM exceptions.
    pub fn add_event_listener(&self, kind: &str, listener: Listener) -> Result<(), HostError> {
        let closure =
            Closure::<dyn Fn(web_sys::Event)>::new(move |event| listener(&Event(event)));
        self.0
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    /// Dispatches `event`. Returns `false` if a listener canceled it.
    ///
    /// # Errors
    ///
    /// Propagates DOM exceptions.
    pub fn dispatch_event(&self, event: &Event) -> Result<bool, HostError> {
        Ok(self.0.dispatch_event(&event.0)?)
    }

    /// Attaches an open shadow root.
    ///
    /// # Errors
    ///
    /// Returns an error if the element cannot host a shadow root or already does.
    pub fn attach_shadow(&self) -> Result<ShadowRoot, HostError> {
        let init = ShadowRootInit::new(ShadowRootMode::Open);
        Ok(ShadowRoot(self.0.attach_shadow(&init)?))
    }

    /// The attached open shadow root, if any.
    #[must_use]
    pub fn shadow_root(&self) -> Option<ShadowRoot> {
        self.0.shadow_root().map(ShadowRoot)
    }

    /// Returns the first descendant matching `selectors`.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid selectors.
    pub fn query_selector(&self, selectors: &str) -> Result<Option<Self>, HostError> {
        Ok(self.0.query_selector(selectors)?.map(Self))
    }

    /// Returns all descendants matching `selectors`, in tree order.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid selectors.
    pub fn query_selector_all(&self, selectors: &str) -> Result<Vec<Self>, HostError> {
        Ok(elements_of(&self.0.query_selector_all(selectors)?))
    }

    fn as_html(&self) -> Option<&HtmlElement> {
        self.0.dyn_ref::<HtmlElement>()
    }

    /// Focuses the element.
    ///
    /// # Errors
    ///
    /// Propagates DOM exceptions.
    pub fn focus(&self, prevent_scroll: bool) -> Result<(), HostError> {
        if let Some(html) = self.as_html() {
            let options = FocusOptions::new();
            options.set_prevent_scroll(prevent_scroll);
            html.focus_with_options(&options)?;
        }
        Ok(())
    }

    /// Removes focus from the element.
    pub fn blur(&self) {
        if let Some(html) = self.as_html() {
            let _ = html.blur();
        }
    }

    /// Whether the element is editable through `contenteditable`.
    #[must_use]
    pub fn is_content_editable(&self) -> bool {
        self.as_html().is_some_and(HtmlElement::is_content_editable)
    }

    /// The current value of an `input`, `textarea` or `select`.
    #[must_use]
    pub fn value(&self) -> Option<String> {
        if let Some(input) = self.0.dyn_ref::<HtmlInputElement>() {
            Some(input.value())
        } else if let Some(textarea) = self.0.dyn_ref::<HtmlTextAreaElement>() {
            Some(textarea.value())
        } else {
            self.0.dyn_ref::<HtmlSelectElement>().map(HtmlSelectElement::value)
        }
    }

    /// Sets the current value of a form control.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NotSupported`] for elements without a value.
    pub fn set_value(&self, value: &str) -> Result<(), HostError> {
        if let Some(input) = self.0.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(textarea) = self.0.dyn_ref::<HtmlTextAreaElement>() {
            textarea.set_value(value);
        } else if let Some(select) = self.0.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        } else {
            return Err(HostError::NotSupported(format!(
                "<{}> has no value",
                self.local_name()
            )));
        }
        Ok(())
    }

    /// The selection offsets of a text control or content-editable element.
    #[must_use]
    pub fn selection_range(&self) -> Option<(u32, u32)> {
        if let Some(input) = self.0.dyn_ref::<HtmlInputElement>() {
            let start = input.selection_start().ok().flatten()?;
            let end = input.selection_end().ok().flatten()?;
            Some((start, end))
        } else if let Some(textarea) = self.0.dyn_ref::<HtmlTextAreaElement>() {
            let start = textarea.selection_start().ok().flatten()?;
            let end = textarea.selection_end().ok().flatten()?;
            Some((start, end))
        } else if self.is_content_editable() {
            let selection = web_sys::window()?.get_selection().ok().flatten()?;
            let anchor = selection.anchor_node()?;
            if !self.0.contains(Some(&anchor)) {
                return None;
            }
            let (a, b) = (selection.anchor_offset(), selection.focus_offset());
            Some((a.min(b), a.max(b)))
        } else {
            None
        }
    }

    /// Sets the selection offsets.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NotSupported`] for elements without a text selection.
    pub fn set_selection_range(&self, start: u32, end: u32) -> Result<(), HostError> {
        if let Some(input) = self.0.dyn_ref::<HtmlInputElement>() {
            input.set_selection_range(start, end)?;
        } else if let Some(textarea) = self.0.dyn_ref::<HtmlTextAreaElement>() {
            textarea.set_selection_range(start, end)?;
        } else if self.is_content_editable() {
            let target = self.0.first_child().unwrap_or_else(|| self.0.clone().into());
            let length = target
                .text_content()
                .map_or(0, |text| u32::try_from(text.chars().count()).unwrap_or(u32::MAX));
            let selection = web_sys::window()
                .ok_or(HostError::DomUnavailable)?
                .get_selection()?
                .ok_or(HostError::DomUnavailable)?;
            let end = end.min(length);
            selection.set_base_and_extent(&target, start.min(end), &target, end)?;
        } else {
            return Err(HostError::NotSupported(format!(
                "<{}> has no text selection",
                self.local_name()
            )));
        }
        Ok(())
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self(element.0.into())
    }
}

/// A lightweight container whose children move into the node it is appended to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFragment(web_sys::DocumentFragment);

impl DocumentFragment {
    /// The fragment as a plain node.
    #[must_use]
    pub fn to_node(&self) -> Node {
        Node(self.0.clone().into())
    }

    /// Appends a child node.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid hierarchies.
    pub fn append_child(&self, child: &Node) -> Result<(), HostError> {
        self.0.append_child(&child.0)?;
        Ok(())
    }

    /// The children of the fragment.
    #[must_use]
    pub fn child_nodes(&self) -> Vec<Node> {
        self.to_node().child_nodes()
    }

    /// The concatenated text of the fragment.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.to_node().text_content()
    }
}

impl From<DocumentFragment> for Node {
    fn from(fragment: DocumentFragment) -> Self {
        Self(fragment.0.into())
    }
}

/// The root of an open shadow tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowRoot(web_sys::ShadowRoot);

impl ShadowRoot {
    /// The shadow root as a plain node.
    #[must_use]
    pub fn to_node(&self) -> Node {
        Node(self.0.clone().into())
    }

    /// The element hosting this shadow root.
    #[must_use]
    pub fn host(&self) -> Option<Element> {
        Some(Element(self.0.host()))
    }

    /// Appends a child node.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid hierarchies.
    pub fn append_child(&self, child: &Node) -> Result<(), HostError> {
        self.0.append_child(&child.0)?;
        Ok(())
    }

    /// Removes all children. Adopted style sheets are kept.
    ///
    /// # Errors
    ///
    /// Propagates DOM exceptions.
    pub fn remove_children(&self) -> Result<(), HostError> {
        self.to_node().remove_children()
    }

    /// The children of the shadow root.
    #[must_use]
    pub fn child_nodes(&self) -> Vec<Node> {
        self.to_node().child_nodes()
    }

    /// The concatenated text of the shadow tree.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.to_node().text_content()
    }

    /// The style sheets adopted by this shadow root.
    #[must_use]
    pub fn adopted_style_sheets(&self) -> Vec<StyleSheet> {
        Reflect::get(&self.0, &JsValue::from_str(ADOPTED_STYLE_SHEETS))
            .ok()
            .and_then(|value| value.dyn_into::<Array>().ok())
            .map(|sheets| {
                sheets
                    .iter()
                    .filter_map(|sheet| sheet.dyn_into::<CssStyleSheet>().ok())
                    .map(StyleSheet)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Replaces the adopted style sheets.
    ///
    /// # Errors
    ///
    /// Returns an error when the browser refuses the assignment.
    pub fn set_adopted_style_sheets(&self, sheets: &[StyleSheet]) -> Result<(), HostError> {
        let array: Array = sheets.iter().map(|sheet| JsValue::from(&sheet.0)).collect();
        Reflect::set(&self.0, &JsValue::from_str(ADOPTED_STYLE_SHEETS), &array)?;
        Ok(())
    }

    /// The focused element of this shadow tree.
    #[must_use]
    pub fn active_element(&self) -> Option<Element> {
        self.0.active_element().map(Element)
    }

    /// Returns the first element in the shadow tree matching `selectors`.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid selectors.
    pub fn query_selector(&self, selectors: &str) -> Result<Option<Element>, HostError> {
        Ok(self.0.query_selector(selectors)?.map(Element))
    }

    /// Returns all elements in the shadow tree matching `selectors`.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid selectors.
    pub fn query_selector_all(&self, selectors: &str) -> Result<Vec<Element>, HostError> {
        Ok(elements_of(&self.0.query_selector_all(selectors)?))
    }
}

/// A constructable style sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSheet(CssStyleSheet);

impl StyleSheet {
    /// Replaces the rules of the sheet.
    ///
    /// # Errors
    ///
    /// Returns an error when the browser rejects the CSS.
    pub fn replace_sync(&self, css: &str) -> Result<(), HostError> {
        self.0.replace_sync(css)?;
        Ok(())
    }

    /// The CSS text of the sheet, rebuilt from its rules.
    #[must_use]
    pub fn css_text(&self) -> String {
        let Ok(rules) = self.0.css_rules() else {
            return String::new();
        };
        (0..rules.length())
            .filter_map(|i| rules.item(i))
            .map(|rule| rule.css_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// An event dispatched to an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event(web_sys::Event);

impl Event {
    /// Creates an event of the given type.
    ///
    /// # Errors
    ///
    /// Propagates construction errors.
    pub fn new(kind: &str) -> Result<Self, HostError> {
        Ok(Self(web_sys::Event::new(kind)?))
    }

    /// The event type, e.g. `click`.
    #[must_use]
    pub fn event_type(&self) -> String {
        self.0.type_()
    }

    /// The element the event was dispatched to.
    #[must_use]
    pub fn target(&self) -> Option<Element> {
        self.0
            .target()
            .and_then(|target| target.dyn_into::<web_sys::Element>().ok())
            .map(Element)
    }

    /// Marks the event as canceled.
    pub fn prevent_default(&self) {
        self.0.prevent_default();
    }

    /// Whether a listener called [`Event::prevent_default`].
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.0.default_prevented()
    }
}

fn elements_of(list: &web_sys::NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
        .map(Element)
        .collect()
}
