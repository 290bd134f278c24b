use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::ComponentError;

/// Per-component configuration.
///
/// Known keys have typed fields; any other key is kept in [`ComponentConfig::extra`].
/// The JSON form uses camel case keys:
///
/// ```
/// use wsx_core::ComponentConfig;
///
/// let config = ComponentConfig::from_json(
///     r#"{ "styles": ":host { color: red }", "preserveFocus": true, "theme": "dark" }"#,
/// )
/// .unwrap();
/// assert!(config.preserve_focus);
/// assert_eq!(config.get::<String>("theme").unwrap().as_deref(), Some("dark"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentConfig {
    /// CSS applied to the shadow root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub styles: Option<String>,
    /// Cache key for the shared style sheet. Defaults to the component name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_name: Option<String>,
    /// Report reactive state changes of the component.
    pub debug: bool,
    /// Keep focus, value and selection of the focused control across rerenders.
    pub preserve_focus: bool,
    /// Any other keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ComponentConfig {
    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::Config`] for malformed input.
    pub fn from_json(json: &str) -> Result<Self, ComponentError> {
        serde_json::from_str(json).map_err(|source| ComponentError::Config {
            key: String::new(),
            source,
        })
    }

    /// Builder: sets the CSS.
    #[must_use]
    pub fn with_styles(mut self, css: impl Into<String>) -> Self {
        self.styles = Some(css.into());
        self
    }

    /// Builder: sets the style cache key.
    #[must_use]
    pub fn with_style_name(mut self, name: impl Into<String>) -> Self {
        self.style_name = Some(name.into());
        self
    }

    /// Builder: enables focus preservation.
    #[must_use]
    pub fn with_preserve_focus(mut self, preserve: bool) -> Self {
        self.preserve_focus = preserve;
        self
    }

    /// Builder: enables reactive debug reporting.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    fn to_object(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// The raw JSON value stored under `key`, known keys included.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<Value> {
        self.to_object().remove(key).filter(|value| !value.is_null())
    }

    /// The value under `key`, converted to `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::Config`] if the stored value does not convert.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ComponentError> {
        self.value(key)
            .map(|value| {
                serde_json::from_value(value).map_err(|source| ComponentError::Config {
                    key: key.to_owned(),
                    source,
                })
            })
            .transpose()
    }

    /// Stores `value` under `key`. Known keys update their typed field.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::Config`] if `value` does not serialize, or does not
    /// fit the typed field of a known key.
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), ComponentError> {
        let config_error = |source: serde_json::Error| ComponentError::Config {
            key: key.to_owned(),
            source,
        };
        let value = serde_json::to_value(value).map_err(config_error)?;
        let mut object = self.to_object();
        object.insert(key.to_owned(), value);
        *self = serde_json::from_value(Value::Object(object)).map_err(config_error)?;
        Ok(())
    }

    /// Whether a non-null value is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    /// Removes `key`. Known keys return to their defaults.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let previous = self.value(key);
        let mut object = self.to_object();
        object.remove(key);
        if let Ok(config) = serde_json::from_value(Value::Object(object)) {
            *self = config;
        }
        previous
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn known_and_extra_keys() {
        let mut config = ComponentConfig::default().with_style_name("card");
        config.set("theme", "dark").unwrap();
        config.set("preserveFocus", true).unwrap();

        assert!(config.preserve_focus);
        assert_eq!(config.extra.get("theme"), Some(&json!("dark")));
        assert_eq!(config.get::<String>("styleName").unwrap().as_deref(), Some("card"));
        assert!(config.contains("theme"));
        assert!(!config.contains("styles"));
    }

    #[test]
    fn typed_access_errors() {
        let mut config = ComponentConfig::default();
        config.set("limit", 3).unwrap();

        assert_eq!(config.get::<u32>("limit").unwrap(), Some(3));
        assert_eq!(config.get::<u32>("missing").unwrap(), None);
        assert!(matches!(
            config.get::<bool>("limit"),
            Err(ComponentError::Config { ref key, .. }) if key == "limit"
        ));
        assert!(config.set("debug", "yes").is_err());
        assert!(!config.debug);
    }

    #[test]
    fn remove_resets_known_keys() {
        let mut config = ComponentConfig::default().with_debug(true).with_styles("p {}");
        config.set("extra", json!({ "a": 1 })).unwrap();

        assert_eq!(config.remove("debug"), Some(json!(true)));
        assert!(!config.debug);
        assert_eq!(config.remove("styles"), Some(json!("p {}")));
        assert_eq!(config.styles, None);
        assert_eq!(config.remove("extra"), Some(json!({ "a": 1 })));
        assert!(config.extra.is_empty());
        assert_eq!(config.remove("nothing"), None);
    }

    #[test]
    fn round_trips_through_json() {
        let config = ComponentConfig::from_json(r#"{"styles":"p{}","debug":true,"x":[1]}"#).unwrap();
        assert_eq!(config.styles.as_deref(), Some("p{}"));
        assert!(config.debug);
        assert_eq!(config.extra.get("x"), Some(&json!([1])));
        assert!(ComponentConfig::from_json("{").is_err());
    }
}
