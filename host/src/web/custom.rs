//! Glue between the page's `customElements` registry and [`ElementDefinition`].
//!
//! Each definition becomes a small class extending `HTMLElement`. Its constructor
//! stores a [`WsxInstance`] on the element and its lifecycle methods call into it,
//! so the Rust instance lives exactly as long as the JavaScript element.

use std::rc::Rc;

use js_sys::{Array, Function};
use wasm_bindgen::{JsCast, JsValue, closure::Closure, prelude::wasm_bindgen};

use super::Element;
use crate::{CustomElement, ElementDefinition, HostError};

#[wasm_bindgen(inline_js = r#"
export function wsx_define(name, observed, construct) {
    class WsxElement extends HTMLElement {
        static get observedAttributes() {
            return observed;
        }
        constructor() {
            super();
            this.__wsx = construct(this);
        }
        connectedCallback() {
            this.__wsx?.connected();
        }
        disconnectedCallback() {
            this.__wsx?.disconnected();
        }
        attributeChangedCallback(attr, oldValue, newValue) {
            this.__wsx?.attributeChanged(attr, oldValue, newValue);
        }
    }
    customElements.define(name, WsxElement);
}
"#)]
extern "C" {
    #[wasm_bindgen(catch)]
    fn wsx_define(name: &str, observed: &Array, construct: &Function) -> Result<(), JsValue>;
}

/// The Rust side of one constructed custom element.
///
/// Owned by the element's JavaScript wrapper and freed with it.
#[wasm_bindgen]
pub struct WsxInstance {
    callbacks: Rc<dyn CustomElement>,
}

impl std::fmt::Debug for WsxInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsxInstance").finish_non_exhaustive()
    }
}

#[wasm_bindgen]
impl WsxInstance {
    /// Forwards `connectedCallback`.
    pub fn connected(&self) {
        self.callbacks.connected_callback();
    }

    /// Forwards `disconnectedCallback`.
    pub fn disconnected(&self) {
        self.callbacks.disconnected_callback();
    }

    /// Forwards `attributeChangedCallback`.
    #[wasm_bindgen(js_name = attributeChanged)]
    pub fn attribute_changed(&self, attr: &str, old: Option<String>, new: Option<String>) {
        self.callbacks
            .attribute_changed_callback(attr, old.as_deref(), new.as_deref());
    }
}

pub(super) fn define(name: &str, definition: ElementDefinition) -> Result<(), HostError> {
    let observed: Array = definition
        .observed_attributes()
        .iter()
        .map(|attr| JsValue::from_str(attr))
        .collect();

    let tag = name.to_owned();
    let construct = Closure::<dyn Fn(web_sys::Element) -> Option<WsxInstance>>::new(move |raw| {
        match definition.construct(&Element(raw)) {
            Ok(callbacks) => Some(WsxInstance { callbacks }),
            Err(err) => {
                tracing::error!("failed to construct <{tag}>: {err}");
                None
            }
        }
    });

    wsx_define(name, &observed, construct.into_js_value().unchecked_ref())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        cell::{Cell, RefCell},
        rc::Weak,
    };

    use js_sys::Reflect;
    use wasm_bindgen_test::wasm_bindgen_test;

    use super::*;
    use crate::Document;

    wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

    #[derive(Default)]
    struct Counter {
        connected: Cell<u32>,
    }

    impl CustomElement for Counter {
        fn connected_callback(&self) {
            self.connected.set(self.connected.get() + 1);
        }

        fn disconnected_callback(&self) {}

        fn attribute_changed_callback(&self, _: &str, _: Option<&str>, _: Option<&str>) {}
    }

    thread_local! {
        static LAST: RefCell<Weak<Counter>> = RefCell::new(Weak::new());
    }

    fn handle(element: &Element) -> JsValue {
        Reflect::get(&element.0, &JsValue::from_str("__wsx")).unwrap()
    }

    #[wasm_bindgen_test]
    fn the_element_owns_its_instance() {
        let definition = ElementDefinition::new(Vec::<String>::new(), |_| {
            let counter = Rc::new(Counter::default());
            LAST.with(|last| *last.borrow_mut() = Rc::downgrade(&counter));
            Ok(counter as Rc<dyn CustomElement>)
        });
        let document = Document::current().unwrap();
        document.define_custom_element("wsx-owned", definition).unwrap();

        let element = document.create_element("wsx-owned").unwrap();
        assert!(handle(&element).is_object());
        let instance = LAST.with(|last| last.borrow().upgrade()).unwrap();
        // The element's handle and this test are the only owners.
        assert_eq!(Rc::strong_count(&instance), 2);

        document.body().unwrap().append_child(&element.to_node()).unwrap();
        assert_eq!(instance.connected.get(), 1);
    }

    #[wasm_bindgen_test]
    fn failed_construction_leaves_no_instance() {
        let definition = ElementDefinition::new(Vec::<String>::new(), |_| {
            Err(HostError::NotSupported("refused".into()))
        });
        let document = Document::current().unwrap();
        document.define_custom_element("wsx-refused", definition).unwrap();

        let element = document.create_element("wsx-refused").unwrap();
        assert!(handle(&element).is_null() || handle(&element).is_undefined());
        document.body().unwrap().append_child(&element.to_node()).unwrap();
    }
}
