//! Custom element registration.

use wsx_host::{Document, is_valid_custom_element_name};

use crate::{ComponentError, component::WebComponent};

/// Options for [`register_component`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterOptions {
    /// Explicit tag name. Wins over the derived one.
    pub tag_name: Option<String>,
    /// Prepended to the derived tag name.
    pub prefix: Option<String>,
}

impl RegisterOptions {
    /// Options with an explicit tag name.
    #[must_use]
    pub fn tag(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: Some(tag_name.into()),
            prefix: None,
        }
    }

    /// Options with a prefix for the derived tag name.
    #[must_use]
    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            tag_name: None,
            prefix: Some(prefix.into()),
        }
    }
}

/// Derives a tag name from a component name.
///
/// A hyphen goes between each lowercase letter and a following uppercase letter,
/// the result is lowercased, and `-component` is appended when it still has no
/// hyphen. `prefix` is prepended as is.
///
/// ```
/// use wsx_core::register::derive_tag_name;
///
/// assert_eq!(derive_tag_name("MyButton", None), "my-button");
/// assert_eq!(derive_tag_name("Card", None), "card-component");
/// assert_eq!(derive_tag_name("Card", Some("x-")), "x-card-component");
/// ```
#[must_use]
pub fn derive_tag_name(name: &str, prefix: Option<&str>) -> String {
    let mut tag = String::with_capacity(name.len() + 10);
    let mut previous_lower = false;
    for c in name.chars() {
        if previous_lower && c.is_ascii_uppercase() {
            tag.push('-');
        }
        previous_lower = c.is_ascii_lowercase();
        tag.push(c.to_ascii_lowercase());
    }
    if !tag.contains('-') {
        tag.push_str("-component");
    }
    match prefix {
        Some(prefix) => format!("{prefix}{tag}"),
        None => tag,
    }
}

/// The tag `C` registers under with `options`.
#[must_use]
pub fn tag_name_for<C: WebComponent>(options: &RegisterOptions) -> String {
    options
        .tag_name
        .clone()
        .unwrap_or_else(|| derive_tag_name(C::name(), options.prefix.as_deref()))
}

/// Defines `C` as a custom element and returns its tag name.
///
/// Registering a tag that is already defined does nothing and succeeds.
///
/// # Errors
///
/// Returns [`ComponentError::InvalidTagName`] if the tag is not a valid custom
/// element name, or the host error if the registry rejects the definition.
pub fn register_component<C: WebComponent>(
    options: RegisterOptions,
) -> Result<String, ComponentError> {
    let tag = tag_name_for::<C>(&options);
    if !is_valid_custom_element_name(&tag) {
        return Err(ComponentError::InvalidTagName(tag));
    }

    let document = Document::current()?;
    if document.is_custom_element_defined(&tag) {
        tracing::debug!("<{tag}> is already defined");
        return Ok(tag);
    }
    document.define_custom_element(&tag, crate::component::definition::<C>())?;
    tracing::debug!("registered {} as <{tag}>", C::name());
    Ok(tag)
}

/// Whether `tag` has a custom element definition.
#[must_use]
pub fn is_registered(tag: &str) -> bool {
    Document::current().is_ok_and(|document| document.is_custom_element_defined(tag))
}

/// Registers several components with default options, stopping at the first error.
///
/// ```
/// use wsx_core::{Host, WebComponent, h, props, register_all};
///
/// struct Badge;
///
/// impl WebComponent for Badge {
///     type Host = Host;
///
///     fn new(_: &Host) -> Self {
///         Self
///     }
///
///     fn render(&self, _: &Host) -> anyhow::Result<wsx_host::Node> {
///         Ok(h("span", props! {}, "new")?)
///     }
/// }
///
/// # fn main() -> Result<(), wsx_core::ComponentError> {
/// let tags = register_all!(Badge)?;
/// assert_eq!(tags, ["badge-component"]);
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! register_all {
    ($($component:ty),+ $(,)?) => {
        (|| -> ::std::result::Result<::std::vec::Vec<::std::string::String>, $crate::ComponentError> {
            ::std::result::Result::Ok(::std::vec![$(
                $crate::register::register_component::<$component>(
                    $crate::register::RegisterOptions::default(),
                )?
            ),+])
        })()
    };
}

#[cfg(test)]
mod tests {
    use wsx_host::Node;

    use super::*;
    use crate::{Host, h, props};

    struct StatusBadge;

    impl WebComponent for StatusBadge {
        type Host = Host;

        fn new(_: &Host) -> Self {
            Self
        }

        fn render(&self, _: &Host) -> anyhow::Result<Node> {
            Ok(h("span", props! {}, "ok")?)
        }
    }

    struct Panel;

    impl WebComponent for Panel {
        type Host = Host;

        fn name() -> &'static str {
            "Panel"
        }

        fn new(_: &Host) -> Self {
            Self
        }

        fn render(&self, _: &Host) -> anyhow::Result<Node> {
            Ok(h("div", props! {}, ())?)
        }
    }

    #[test]
    fn derived_names() {
        assert_eq!(derive_tag_name("TodoListItem", None), "todo-list-item");
        assert_eq!(derive_tag_name("Card", None), "card-component");
        assert_eq!(derive_tag_name("XMLView", None), "xmlview-component");
        assert_eq!(derive_tag_name("my-widget", None), "my-widget");
        assert_eq!(derive_tag_name("Tabs", Some("wsx-")), "wsx-tabs-component");
    }

    #[test]
    fn register_is_idempotent() {
        let tag = register_component::<StatusBadge>(RegisterOptions::default()).unwrap();
        assert_eq!(tag, "status-badge");
        assert!(is_registered("status-badge"));
        assert_eq!(
            register_component::<StatusBadge>(RegisterOptions::default()).unwrap(),
            "status-badge"
        );
    }

    #[test]
    fn explicit_and_prefixed_tags() {
        let tag = register_component::<Panel>(RegisterOptions::tag("side-panel")).unwrap();
        assert_eq!(tag, "side-panel");
        let tag = register_component::<Panel>(RegisterOptions::prefixed("app-")).unwrap();
        assert_eq!(tag, "app-panel-component");
        assert!(is_registered("side-panel") && is_registered("app-panel-component"));
    }

    #[test]
    fn invalid_tags_are_rejected() {
        let err = register_component::<Panel>(RegisterOptions::tag("Panel")).unwrap_err();
        assert!(matches!(err, ComponentError::InvalidTagName(ref tag) if tag == "Panel"));
        assert!(!is_registered("Panel"));
    }

    #[test]
    fn register_all_collects_tags() {
        let tags = register_all!(StatusBadge, Panel).unwrap();
        assert_eq!(tags, ["status-badge", "panel-component"]);
    }
}
