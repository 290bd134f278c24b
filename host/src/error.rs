use thiserror::Error;

/// Error type produced by host DOM operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The DOM APIs are not accessible (e.g., no `window` in a worker).
    #[error("DOM is not available")]
    DomUnavailable,
    /// A tag or attribute name contains characters the DOM rejects.
    #[error("`{0}` is not a valid name")]
    InvalidCharacter(String),
    /// The requested tree mutation would produce an invalid hierarchy.
    #[error("invalid hierarchy: {0}")]
    HierarchyRequest(&'static str),
    /// The node to remove is not a child of the target.
    #[error("the node is not a child of this node")]
    NotFound,
    /// The host does not support the requested operation on this node.
    #[error("operation not supported: {0}")]
    NotSupported(String),
    /// A selector or custom element name failed to parse.
    #[error("syntax error: {0}")]
    Syntax(String),
    /// Wrapper around JavaScript exceptions.
    #[error("JavaScript error: {0}")]
    Js(String),
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for HostError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        use wasm_bindgen::JsCast;

        if let Some(error) = value.dyn_ref::<js_sys::Error>() {
            return Self::Js(String::from(error.message()));
        }
        value
            .as_string()
            .map_or_else(|| Self::Js(format!("{value:?}")), Self::Js)
    }
}

#[cfg(target_arch = "wasm32")]
impl From<HostError> for wasm_bindgen::JsValue {
    fn from(value: HostError) -> Self {
        Self::from(value.to_string())
    }
}
