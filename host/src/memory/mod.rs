//! Single-threaded, in-memory implementation of the host contract.
//!
//! Each thread owns one [`Document`]. Nodes are reference counted; a parent owns its
//! children and an element owns its shadow root, while back references (parent,
//! shadow host) are weak.

mod document;
mod event;
mod microtask;
mod node;
mod style;

pub use document::Document;
pub use event::Event;
pub use microtask::{perform_microtask_checkpoint, queue_microtask};
pub use node::{DocumentFragment, Element, Node, ShadowRoot};
pub use style::StyleSheet;

#[cfg(test)]
mod tests;
