use std::{
    cell::{Ref, RefCell},
    fmt,
    rc::Rc,
};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use wsx_host::{Element, HostError, Node, ShadowRoot};

use super::ComponentHost;
use crate::{ComponentConfig, ComponentError, StyleManager, jsx::h, props};

const ERROR_STYLE: &str =
    "color: red; padding: 10px; border: 1px solid red; background: #ffe6e6; font-family: monospace;";
const ERROR_DETAIL_STYLE: &str = "margin: 10px 0; white-space: pre-wrap;";

type Renderer = Box<dyn Fn() -> anyhow::Result<Node>>;

/// The base component host: owns the shadow root and configuration of one element.
///
/// Cloning is cheap and yields a handle to the same host.
#[derive(Clone)]
pub struct Host(Rc<HostInner>);

struct HostInner {
    name: &'static str,
    shadow: ShadowRoot,
    config: RefCell<ComponentConfig>,
    renderer: RefCell<Option<Renderer>>,
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("name", &self.0.name)
            .field("config", &self.0.config.borrow())
            .finish_non_exhaustive()
    }
}

impl ComponentHost for Host {
    fn create(
        element: &Element,
        name: &'static str,
        config: ComponentConfig,
    ) -> Result<Self, HostError> {
        let shadow = element.attach_shadow()?;
        let host = Self(Rc::new(HostInner {
            name,
            shadow,
            config: RefCell::new(config),
            renderer: RefCell::new(None),
        }));
        host.apply_styles()?;
        Ok(host)
    }

    fn base(&self) -> &Host {
        self
    }
}

impl Host {
    /// The component name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.0.name
    }

    /// The custom element this host belongs to.
    #[must_use]
    pub fn element(&self) -> Option<Element> {
        self.0.shadow.host()
    }

    /// The open shadow root holding the rendered content.
    #[must_use]
    pub fn shadow_root(&self) -> &ShadowRoot {
        &self.0.shadow
    }

    /// Whether the element is in a document.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.element()
            .is_some_and(|element| element.to_node().is_connected())
    }

    pub(crate) fn set_renderer(&self, renderer: impl Fn() -> anyhow::Result<Node> + 'static) {
        *self.0.renderer.borrow_mut() = Some(Box::new(renderer));
    }

    fn apply_styles(&self) -> Result<(), HostError> {
        let config = self.0.config.borrow();
        let Some(css) = config.styles.as_deref() else {
            return Ok(());
        };
        let style_name = config.style_name.as_deref().unwrap_or(self.0.name);
        StyleManager::apply_styles(&self.0.shadow, style_name, css)
    }

    fn render(&self) -> anyhow::Result<Node> {
        match self.0.renderer.borrow().as_ref() {
            Some(render) => render(),
            None => Err(anyhow::anyhow!("{} has no renderer", self.0.name)),
        }
    }

    /// Renders on connection. Content rendered earlier, while disconnected or before
    /// a reconnection, is replaced rather than duplicated.
    pub(crate) fn mount(&self) -> bool {
        self.rerender_base()
    }

    /// Clears the shadow root, keeping adopted style sheets, and renders again.
    pub fn rerender(&self) {
        self.rerender_base();
    }

    pub(crate) fn rerender_base(&self) -> bool {
        let shadow = &self.0.shadow;
        let sheets = shadow.adopted_style_sheets();
        if let Err(err) = shadow.remove_children() {
            tracing::warn!("[{}] failed to clear shadow root: {err}", self.0.name);
        }
        if let Err(err) = shadow.set_adopted_style_sheets(&sheets) {
            tracing::debug!("[{}] failed to restore style sheets: {err}", self.0.name);
        }
        if sheets.is_empty() {
            if let Err(err) = self.apply_styles() {
                tracing::warn!("[{}] failed to apply styles: {err}", self.0.name);
            }
        }
        self.render_into_shadow()
    }

    fn render_into_shadow(&self) -> bool {
        let appended = self
            .render()
            .and_then(|node| Ok(self.0.shadow.append_child(&node)?));
        match appended {
            Ok(()) => true,
            Err(err) => {
                tracing::error!("[{}] render failed: {err:#}", self.0.name);
                self.render_error(&err);
                false
            }
        }
    }

    fn render_error(&self, err: &anyhow::Error) {
        let shadow = &self.0.shadow;
        let shown = shadow.remove_children().and_then(|()| {
            let block = h(
                "div",
                props! { "style" => ERROR_STYLE },
                crate::children![
                    h("strong", props! {}, format!("[{}] Component Error:", self.0.name))?,
                    h("pre", props! { "style" => ERROR_DETAIL_STYLE }, format!("{err:#}"))?,
                ],
            )?;
            shadow.append_child(&block)
        });
        if let Err(host_err) = shown {
            tracing::error!("[{}] failed to show error block: {host_err}", self.0.name);
        }
    }

    /// Borrows the configuration.
    ///
    /// # Panics
    ///
    /// Panics if called while [`Host::set_config`] runs.
    #[must_use]
    pub fn config(&self) -> Ref<'_, ComponentConfig> {
        self.0.config.borrow()
    }

    /// The configuration value under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::Config`] if the value does not convert to `T`.
    pub fn config_value<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ComponentError> {
        self.0.config.borrow().get(key)
    }

    /// The configuration value under `key`, or `default` if it is missing or does not
    /// convert.
    pub fn config_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.config_value(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(err) => {
                tracing::debug!("[{}] {err}", self.0.name);
                default
            }
        }
    }

    /// Stores a configuration value.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::Config`] if the value does not fit the key.
    pub fn set_config<T: Serialize>(&self, key: &str, value: T) -> Result<(), ComponentError> {
        self.0.config.borrow_mut().set(key, value)
    }

    /// Whether a configuration value is stored under `key`.
    #[must_use]
    pub fn has_config(&self, key: &str) -> bool {
        self.0.config.borrow().contains(key)
    }

    /// Removes a configuration value, returning it.
    pub fn remove_config(&self, key: &str) -> Option<Value> {
        self.0.config.borrow_mut().remove(key)
    }

    /// The attribute `name` of the element.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<String> {
        self.element()?.get_attribute(name)
    }

    /// The attribute `name`, or `default` when it is missing or empty.
    #[must_use]
    pub fn attr_or(&self, name: &str, default: &str) -> String {
        self.attr(name)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| default.to_owned())
    }

    /// Sets an attribute on the element.
    ///
    /// # Errors
    ///
    /// Propagates host failures.
    pub fn set_attr(&self, name: &str, value: &str) -> Result<(), HostError> {
        self.element()
            .ok_or(HostError::DomUnavailable)?
            .set_attribute(name, value)
    }

    /// Whether the element has the attribute `name`.
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.element()
            .is_some_and(|element| element.has_attribute(name))
    }

    /// Removes an attribute from the element.
    ///
    /// # Errors
    ///
    /// Propagates host failures.
    pub fn remove_attr(&self, name: &str) -> Result<(), HostError> {
        self.element()
            .ok_or(HostError::DomUnavailable)?
            .remove_attribute(name)
    }

    /// The first element in the shadow root matching `selectors`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Syntax`] for invalid selectors.
    pub fn query_selector(&self, selectors: &str) -> Result<Option<Element>, HostError> {
        self.0.shadow.query_selector(selectors)
    }

    /// All elements in the shadow root matching `selectors`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Syntax`] for invalid selectors.
    pub fn query_selector_all(&self, selectors: &str) -> Result<Vec<Element>, HostError> {
        self.0.shadow.query_selector_all(selectors)
    }
}
