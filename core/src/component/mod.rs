//! Components backed by custom elements.
//!
//! A component is a plain type implementing [`WebComponent`]. Registering it (see
//! [`crate::register`]) defines a custom element whose instances each own one
//! component value and one host. The host is either the base [`Host`] or the
//! [`ReactiveHost`], chosen through [`WebComponent::Host`].
//!
//! Lifecycle of an instance: constructed (shadow root attached, styles applied),
//! connected (first render), any number of rerenders, disconnected.

mod focus;
mod host;
mod reactive;

use std::rc::Rc;

use wsx_host::{CustomElement, Element, ElementDefinition, HostError, Node};

pub use host::Host;
pub use reactive::ReactiveHost;

use crate::ComponentConfig;

/// A component type that can be registered as a custom element.
///
/// ```
/// use wsx_core::{Host, WebComponent, h, props};
/// use wsx_host::Node;
///
/// struct Greeting;
///
/// impl WebComponent for Greeting {
///     type Host = Host;
///
///     fn observed_attributes() -> &'static [&'static str] {
///         &["name"]
///     }
///
///     fn new(_: &Host) -> Self {
///         Self
///     }
///
///     fn render(&self, host: &Host) -> anyhow::Result<Node> {
///         let name = host.attr_or("name", "world");
///         Ok(h("p", props! { "className" => "greeting" }, format!("Hello, {name}!"))?)
///     }
/// }
/// ```
pub trait WebComponent: Sized + 'static {
    /// The host flavor: [`Host`] or [`ReactiveHost`].
    type Host: ComponentHost;

    /// Name used in logs, error blocks and derived tag names.
    fn name() -> &'static str {
        wsx_reactive::short_type_name::<Self>()
    }

    /// Attributes whose changes reach [`WebComponent::on_attribute_changed`].
    fn observed_attributes() -> &'static [&'static str] {
        &[]
    }

    /// Configuration each instance starts with.
    fn config() -> ComponentConfig {
        ComponentConfig::default()
    }

    /// Creates the component for a freshly constructed host.
    fn new(host: &Self::Host) -> Self;

    /// Builds the shadow root content.
    ///
    /// # Errors
    ///
    /// Any error is shown in place of the content as an error block.
    fn render(&self, host: &Self::Host) -> anyhow::Result<Node>;

    /// Runs after the first successful render following a connection.
    fn on_connected(&self, host: &Self::Host) {
        let _ = host;
    }

    /// Runs when the element leaves the document.
    fn on_disconnected(&self, host: &Self::Host) {
        let _ = host;
    }

    /// Runs when an observed attribute changes.
    fn on_attribute_changed(
        &self,
        host: &Self::Host,
        name: &str,
        old: Option<&str>,
        new: Option<&str>,
    ) {
        let _ = (host, name, old, new);
    }
}

/// The per-instance side of a component: shadow root, configuration and rendering.
pub trait ComponentHost: Clone + 'static {
    /// Attaches a shadow root to `element` and applies the configured styles.
    ///
    /// # Errors
    ///
    /// Propagates host failures, such as an element that already has a shadow root.
    fn create(element: &Element, name: &'static str, config: ComponentConfig)
    -> Result<Self, HostError>;

    /// The base host.
    fn base(&self) -> &Host;

    /// Renders into the shadow root on connection. Returns whether rendering
    /// succeeded.
    fn connected(&self) -> bool {
        self.base().mount()
    }

    /// Called after [`WebComponent::on_disconnected`].
    fn disconnected(&self) {}

    /// Replaces the shadow root content with a fresh render.
    fn rerender(&self) {
        self.base().rerender();
    }
}

struct Instance<C: WebComponent> {
    host: C::Host,
    component: C,
}

impl<C: WebComponent> CustomElement for Instance<C> {
    fn connected_callback(&self) {
        if self.host.connected() {
            self.component.on_connected(&self.host);
        }
    }

    fn disconnected_callback(&self) {
        self.component.on_disconnected(&self.host);
        self.host.disconnected();
    }

    fn attribute_changed_callback(&self, name: &str, old: Option<&str>, new: Option<&str>) {
        self.component
            .on_attribute_changed(&self.host, name, old, new);
    }
}

/// The element definition registered for `C`.
pub(crate) fn definition<C: WebComponent>() -> ElementDefinition {
    ElementDefinition::new(C::observed_attributes().iter().copied(), |element| {
        let host = C::Host::create(element, C::name(), C::config())?;
        let component = C::new(&host);
        let instance = Rc::new(Instance::<C> { host, component });

        let weak = Rc::downgrade(&instance);
        instance.host.base().set_renderer(move || match weak.upgrade() {
            Some(instance) => instance.component.render(&instance.host),
            None => Err(anyhow::anyhow!("{} instance is gone", C::name())),
        });
        Ok(instance as Rc<dyn CustomElement>)
    })
}
