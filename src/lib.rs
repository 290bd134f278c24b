#![doc = include_str!("../README.md")]

pub mod logging;

#[doc(inline)]
pub use wsx_core::{
    Child, ComponentConfig, ComponentError, ComponentHost, CreateContext, Fragment, Host,
    PropValue, Props, ReactiveHost, RegisterOptions, StyleManager, WebComponent, config, error,
    fragment, h, is_registered, jsx, namespace, nested, register, register_all,
    register_component, style, svg,
};
pub use wsx_core::{children, props};
#[doc(inline)]
pub use wsx_reactive::{
    Reactive, ReactiveCallback, ReactiveDebug, StateGetter, StateSetter, UpdateScheduler,
    callback, create_state, reactive, reactive_with_debug,
};

/// The host runtime: documents, nodes, events and microtasks.
pub use wsx_host as host;

pub use anyhow;

pub mod prelude {
    //! Everything a component module usually needs.
    //!
    //! ```
    //! use wsx::prelude::*;
    //!
    //! struct Hello;
    //!
    //! impl WebComponent for Hello {
    //!     type Host = Host;
    //!
    //!     fn new(_: &Host) -> Self {
    //!         Self
    //!     }
    //!
    //!     fn render(&self, _: &Host) -> anyhow::Result<Node> {
    //!         Ok(h("p", props! {}, "hello")?)
    //!     }
    //! }
    //! ```
    pub use super::{
        Child, ComponentConfig, ComponentError, ComponentHost, Fragment, Host, Props,
        ReactiveHost, RegisterOptions, WebComponent, children, fragment, h, nested, props,
        register_component, svg,
    };
    pub use wsx_core::jsx::{node_ref, on};
    pub use wsx_host::{Element, Event, Node};
    pub use wsx_reactive::{Reactive, StateGetter, StateSetter};

    pub use anyhow;
}
