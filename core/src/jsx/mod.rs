//! JSX-style element factory.
//!
//! [`h`] turns a tag, a set of [`Props`] and [`Child`]ren into a host node, the way a
//! JSX transform's `h(tag, props, ...children)` target does. There is no virtual
//! tree: every call creates real nodes.
//!
//! ```
//! use wsx_core::{children, jsx::{h, on}, props};
//!
//! # fn main() -> Result<(), wsx_host::HostError> {
//! let button = h(
//!     "button",
//!     props! { "className" => "primary", "disabled" => false, "onClick" => on(|_| {}) },
//!     children!["Save"],
//! )?;
//! let button = button.as_element().unwrap();
//! assert_eq!(button.get_attribute("class").as_deref(), Some("primary"));
//! assert!(!button.has_attribute("disabled"));
//! # Ok(())
//! # }
//! ```

mod children;
mod props;

use std::{fmt, rc::Rc};

use wsx_host::{Document, DocumentFragment, Element, HostError, Node, NodeKind};

use crate::namespace::{self, CreateContext, attribute_name};

pub use children::{Child, Deferred, flatten};
pub use props::{PropValue, Props, RefCallback, format_number, node_ref, on};

/// A function component: receives its props and flattened children.
pub type ComponentFn = Rc<dyn Fn(Props, Vec<Child>) -> Result<Node, HostError>>;

/// What [`h`] creates: a host element or the output of a function component.
#[derive(Clone)]
pub enum Tag {
    /// An element tag name such as `div` or `circle`.
    Element(String),
    /// A function component.
    Component(ComponentFn),
}

/// Wraps a closure into a [`Tag::Component`].
pub fn component(f: impl Fn(Props, Vec<Child>) -> Result<Node, HostError> + 'static) -> Tag {
    Tag::Component(Rc::new(f))
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Self::Element(value.to_owned())
    }
}

impl From<String> for Tag {
    fn from(value: String) -> Self {
        Self::Element(value)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(name) => f.debug_tuple("Element").field(name).finish(),
            Self::Component(_) => f.write_str("Component(..)"),
        }
    }
}

/// Creates a node in HTML context. See [`h_in`].
///
/// # Errors
///
/// Propagates host failures such as invalid tag or attribute names, and errors
/// returned by function components.
pub fn h(
    tag: impl Into<Tag>,
    props: Props,
    children: impl Into<Child>,
) -> Result<Node, HostError> {
    h_in(CreateContext::html(), tag, props, children)
}

/// Creates a node in SVG context, so dual tags like `text` become SVG elements.
///
/// # Errors
///
/// Same as [`h`].
pub fn svg(
    tag: impl Into<Tag>,
    props: Props,
    children: impl Into<Child>,
) -> Result<Node, HostError> {
    h_in(CreateContext::svg(), tag, props, children)
}

/// Like [`h`], but the node is created when a parent attaches it, under the
/// parent's context.
///
/// Arguments are evaluated before the call they are passed to, so a child built
/// with [`h`] exists before its parent and is always created in HTML context. A
/// dual tag such as `text` placed inside `<svg>` this way becomes an SVG element.
///
/// ```
/// use wsx_core::{children, jsx::{h, nested}, props};
/// use wsx_host::SVG_NAMESPACE;
///
/// # fn main() -> Result<(), wsx_host::HostError> {
/// let chart = h("svg", props! {}, children![nested("text", props! {}, "label")])?;
/// let label = chart.first_child().and_then(|node| node.as_element()).unwrap();
/// assert_eq!(label.namespace_uri().as_deref(), Some(SVG_NAMESPACE));
/// # Ok(())
/// # }
/// ```
pub fn nested(tag: impl Into<Tag>, props: Props, children: impl Into<Child>) -> Child {
    let tag = tag.into();
    let children = children.into();
    Child::Deferred(Deferred::new(move |cx| h_in(cx, tag, props, children)))
}

/// Creates a node under an explicit [`CreateContext`].
///
/// Function components are called with the props and flattened children and their
/// result is returned as is. Element tags are created in the namespace `cx`
/// selects, then props are applied in insertion order, then children are appended.
/// Deferred children are created under `cx.enter(tag)`.
///
/// # Errors
///
/// Same as [`h`].
pub fn h_in(
    cx: CreateContext,
    tag: impl Into<Tag>,
    props: Props,
    children: impl Into<Child>,
) -> Result<Node, HostError> {
    let children = flatten(vec![children.into()]);
    match tag.into() {
        Tag::Component(render) => render(props, children),
        Tag::Element(name) => {
            let document = Document::current()?;
            let element = namespace::create_element(&document, &name, cx)?;
            apply_props(&element, props)?;
            append_children(&document, &element.to_node(), children, cx.enter(&name))?;
            Ok(element.into())
        }
    }
}

/// Fragment component: collects its children into a document fragment.
///
/// # Errors
///
/// Propagates host failures.
#[allow(non_snake_case)]
pub fn Fragment(_props: Props, children: Vec<Child>) -> Result<Node, HostError> {
    fragment(children).map(Into::into)
}

/// Collects `children` into a new document fragment. Deferred children are created
/// in HTML context.
///
/// # Errors
///
/// Propagates host failures.
pub fn fragment(children: impl Into<Child>) -> Result<DocumentFragment, HostError> {
    let document = Document::current()?;
    let fragment = document.create_document_fragment();
    append_children(
        &document,
        &fragment.to_node(),
        flatten(vec![children.into()]),
        CreateContext::html(),
    )?;
    Ok(fragment)
}

/// Appends `children` to an existing element through the same pipeline as [`h`].
/// Deferred children are created in the context `parent`'s namespace implies.
///
/// # Errors
///
/// Propagates host failures.
pub fn append(parent: &Element, children: impl Into<Child>) -> Result<(), HostError> {
    let document = Document::current()?;
    append_children(
        &document,
        &parent.to_node(),
        flatten(vec![children.into()]),
        CreateContext::child_of(parent),
    )
}

fn apply_props(element: &Element, props: Props) -> Result<(), HostError> {
    for (key, value) in props {
        match value {
            PropValue::Null | PropValue::Bool(false) => {}
            PropValue::Ref(callback) if key == "ref" => callback(element),
            PropValue::Listener(listener) if key.len() > 2 && key.starts_with("on") => {
                element.add_event_listener(&key[2..].to_lowercase(), listener)?;
            }
            PropValue::Ref(_) | PropValue::Listener(_) => {
                tracing::warn!(
                    "ignoring callback under `{key}` on <{}>",
                    element.local_name()
                );
            }
            value if key == "className" || key == "class" => {
                if let Some(class) = value.to_attribute_value() {
                    element.set_attribute("class", &class)?;
                }
            }
            PropValue::Text(style) if key == "style" => element.set_attribute("style", &style)?,
            PropValue::Bool(true) => element.set_attribute(attribute_name(&key), "")?,
            PropValue::Text(text) => element.set_attribute(attribute_name(&key), &text)?,
            PropValue::Number(number) => {
                element.set_attribute(attribute_name(&key), &format_number(number))?;
            }
        }
    }
    Ok(())
}

fn append_children(
    document: &Document,
    parent: &Node,
    children: Vec<Child>,
    cx: CreateContext,
) -> Result<(), HostError> {
    for child in children {
        match child {
            Child::Text(text) => parent.append_child(&document.create_text_node(&text))?,
            Child::Number(number) => {
                parent.append_child(&document.create_text_node(&format_number(number)))?;
            }
            Child::Node(node) => append_node(parent, &node)?,
            Child::Deferred(deferred) => match deferred.build(cx)? {
                Some(node) => append_node(parent, &node)?,
                None => tracing::trace!("deferred child was already built"),
            },
            Child::Bool(_) | Child::Null | Child::List(_) => {}
        }
    }
    Ok(())
}

fn append_node(parent: &Node, node: &Node) -> Result<(), HostError> {
    match node.kind() {
        NodeKind::Element | NodeKind::DocumentFragment | NodeKind::Text => {
            parent.append_child(node)?;
        }
        kind => tracing::trace!(?kind, "skipping child node"),
    }
    Ok(())
}

/// Builds [`Props`](crate::jsx::Props) from `key => value` pairs.
#[macro_export]
macro_rules! props {
    () => {
        $crate::jsx::Props::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut props = $crate::jsx::Props::new();
        $(props.set($key, $value);)+
        props
    }};
}

/// Builds a [`Child::List`](crate::jsx::Child::List) from anything convertible into a
/// child.
#[macro_export]
macro_rules! children {
    ($($child:expr),* $(,)?) => {
        $crate::jsx::Child::List(vec![$($crate::jsx::Child::from($child)),*])
    };
}

/// Calls [`h`](crate::jsx::h) with children listed inline.
///
/// `h!("p")`, `h!("p", props)` and `h!("p", props, "text", other_node)` are all
/// accepted.
#[macro_export]
macro_rules! h {
    ($tag:expr) => {
        $crate::jsx::h($tag, $crate::jsx::Props::new(), $crate::jsx::Child::Null)
    };
    ($tag:expr, $props:expr $(, $child:expr)* $(,)?) => {
        $crate::jsx::h($tag, $props, $crate::children![$($child),*])
    };
}

#[cfg(test)]
mod tests;
