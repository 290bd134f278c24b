use std::{cell::RefCell, fmt, rc::Rc};

use wsx_host::{DocumentFragment, Element, HostError, Node};

use crate::namespace::CreateContext;

/// A child passed to [`h`](super::h) or [`fragment`](super::fragment).
#[derive(Debug, Clone)]
pub enum Child {
    /// Nothing.
    Null,
    /// `false` is dropped; `true` is ignored when attaching.
    Bool(bool),
    /// Becomes a text node.
    Text(String),
    /// Becomes a text node holding the JavaScript rendering of the number.
    Number(f64),
    /// An element, fragment or text node to append.
    Node(Node),
    /// Nested children, flattened in order.
    List(Vec<Child>),
    /// A node created when its parent attaches it, in the parent's context.
    Deferred(Deferred),
}

type Build = Box<dyn FnOnce(CreateContext) -> Result<Node, HostError>>;

/// A node whose creation waits for the [`CreateContext`] of its parent.
///
/// Clones share the pending build; it runs at most once.
#[derive(Clone)]
pub struct Deferred(Rc<RefCell<Option<Build>>>);

impl Deferred {
    /// Wraps `build`, called with the parent's context on attach.
    pub fn new(build: impl FnOnce(CreateContext) -> Result<Node, HostError> + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(build)))))
    }

    /// Creates the node under `cx`. `None` if it was already built.
    ///
    /// # Errors
    ///
    /// Whatever the build returns.
    pub fn build(&self, cx: CreateContext) -> Result<Option<Node>, HostError> {
        let build = self.0.borrow_mut().take();
        build.map(|build| build(cx)).transpose()
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.0.borrow().is_some() { "pending" } else { "built" };
        f.debug_tuple("Deferred").field(&state).finish()
    }
}

impl Child {
    /// Whether flattening drops this child.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Null | Self::Bool(false))
    }
}

/// Flattens nested lists, dropping `Null` and `false` at every depth. Order is
/// preserved.
#[must_use]
pub fn flatten(children: Vec<Child>) -> Vec<Child> {
    let mut out = Vec::with_capacity(children.len());
    flatten_into(children, &mut out);
    out
}

fn flatten_into(children: Vec<Child>, out: &mut Vec<Child>) {
    for child in children {
        match child {
            Child::List(nested) => flatten_into(nested, out),
            child if child.is_empty() => {}
            child => out.push(child),
        }
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for Child {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<bool> for Child {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<()> for Child {
    fn from((): ()) -> Self {
        Self::Null
    }
}

impl From<Deferred> for Child {
    fn from(value: Deferred) -> Self {
        Self::Deferred(value)
    }
}

impl From<Node> for Child {
    fn from(value: Node) -> Self {
        Self::Node(value)
    }
}

impl From<Element> for Child {
    fn from(value: Element) -> Self {
        Self::Node(value.into())
    }
}

impl From<DocumentFragment> for Child {
    fn from(value: DocumentFragment) -> Self {
        Self::Node(value.into())
    }
}

impl<T: Into<Self>> From<Option<T>> for Child {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Child {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>, const N: usize> From<[T; N]> for Child {
    fn from(value: [T; N]) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

macro_rules! number_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Child {
                fn from(value: $ty) -> Self {
                    Self::Number(f64::from(value))
                }
            }
        )*
    };
}

number_from!(f64, f32, i32, u32, i16, u16, i8, u8);

macro_rules! wide_number_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Child {
                #[allow(clippy::cast_precision_loss)]
                fn from(value: $ty) -> Self {
                    Self::Number(value as f64)
                }
            }
        )*
    };
}

wide_number_from!(i64, u64, isize, usize);
