#![allow(clippy::module_name_repetitions)]

//! Core of WSX: a JSX-style element factory and components backed by custom
//! elements.
//!
//! - [`jsx`] builds real host nodes from tags, props and children.
//! - [`namespace`] decides whether a tag is created as HTML or SVG.
//! - [`WebComponent`] describes a component; [`register_component`] defines it as a
//!   custom element rendering into an open shadow root.
//! - [`ReactiveHost`] adds reactive values and keyed state whose changes rerender
//!   the component once per microtask.

pub mod config;
pub mod error;
pub mod jsx;
pub mod namespace;
pub mod register;
pub mod style;

mod component;

#[doc(inline)]
pub use component::{ComponentHost, Host, ReactiveHost, WebComponent};
pub use config::ComponentConfig;
pub use error::ComponentError;
#[doc(inline)]
pub use jsx::{Child, Fragment, PropValue, Props, fragment, h, nested, svg};
pub use namespace::CreateContext;
pub use register::{RegisterOptions, is_registered, register_component};
pub use style::StyleManager;
