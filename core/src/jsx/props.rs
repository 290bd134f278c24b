use std::{fmt, rc::Rc};

use wsx_host::{Element, Event, Listener};

/// A callback receiving the element created for a `ref` property.
pub type RefCallback = Rc<dyn Fn(&Element)>;

/// The value of a single property passed to [`h`](super::h).
#[derive(Clone)]
pub enum PropValue {
    /// Absent; never produces an attribute.
    Null,
    /// A string attribute value.
    Text(String),
    /// A numeric attribute value, formatted the way JavaScript stringifies numbers.
    Number(f64),
    /// `true` adds an empty attribute, `false` adds nothing.
    Bool(bool),
    /// An event listener, used under `on*` keys.
    Listener(Listener),
    /// An element callback, used under the `ref` key.
    Ref(RefCallback),
}

/// Creates a [`PropValue::Listener`] from a closure.
pub fn on(f: impl Fn(&Event) + 'static) -> PropValue {
    PropValue::Listener(Rc::new(f))
}

/// Creates a [`PropValue::Ref`] from a closure.
pub fn node_ref(f: impl Fn(&Element) + 'static) -> PropValue {
    PropValue::Ref(Rc::new(f))
}

impl PropValue {
    /// Whether this value can produce an attribute or side effect at all.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        !matches!(self, Self::Null | Self::Bool(false))
    }

    /// The attribute text for scalar values.
    #[must_use]
    pub fn to_attribute_value(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Number(number) => Some(format_number(*number)),
            Self::Bool(flag) => Some(flag.to_string()),
            Self::Null | Self::Listener(_) | Self::Ref(_) => None,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Number(number) => f.debug_tuple("Number").field(number).finish(),
            Self::Bool(flag) => f.debug_tuple("Bool").field(flag).finish(),
            Self::Listener(_) => f.write_str("Listener(..)"),
            Self::Ref(_) => f.write_str("Ref(..)"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for PropValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<()> for PropValue {
    fn from((): ()) -> Self {
        Self::Null
    }
}

impl<T: Into<Self>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

macro_rules! number_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for PropValue {
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
            impl From<$ty> for PropValue {
                #[allow(clippy::cast_precision_loss)]
                fn from(value: $ty) -> Self {
                    Self::Number(value as f64)
                }
            }
        )*
    };
}

wide_number_from!(i64, u64, isize, usize);

/// Ordered properties for [`h`](super::h).
///
/// Keys keep their first insertion position; setting an existing key replaces its
/// value in place.
#[derive(Clone, Default)]
pub struct Props {
    entries: Vec<(String, PropValue)>,
}

impl Props {
    /// Empty properties.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builder form of [`Props::set`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets `key` to `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// The value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// The string form of a scalar value stored under `key`.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key)
            .filter(|value| value.is_present())
            .and_then(PropValue::to_attribute_value)
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        let index = self.entries.iter().position(|(existing, _)| existing == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl IntoIterator for Props {
    type Item = (String, PropValue);
    type IntoIter = std::vec::IntoIter<(String, PropValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Self::new();
        for (key, value) in iter {
            props.set(key, value);
        }
        props
    }
}

/// Formats `number` the way JavaScript's `String(number)` does.
#[must_use]
pub fn format_number(number: f64) -> String {
    if number.is_nan() {
        return "NaN".to_owned();
    }
    if number.is_infinite() {
        return if number > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    if number == 0.0 {
        return "0".to_owned();
    }

    let magnitude = number.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return number.to_string();
    }

    let scientific = format!("{number:e}");
    match scientific.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => scientific,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_in_place() {
        let mut props = Props::new().with("a", 1).with("b", "x");
        props.set("a", true);

        let keys: Vec<_> = props.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, ["a", "b"]);
        assert!(matches!(props.get("a"), Some(PropValue::Bool(true))));
        assert_eq!(props.len(), 2);

        assert!(props.remove("a").is_some());
        assert!(props.remove("a").is_none());
    }

    #[test]
    fn text_of_scalars() {
        let props: Props = [("n", PropValue::from(2.5)), ("off", PropValue::from(false))]
            .into_iter()
            .collect();
        assert_eq!(props.text("n").as_deref(), Some("2.5"));
        assert_eq!(props.text("off"), None);
        assert_eq!(props.text("missing"), None);
    }

    #[test]
    fn option_and_unit_are_null() {
        assert!(!PropValue::from(None::<&str>).is_present());
        assert!(!PropValue::from(()).is_present());
        assert!(PropValue::from(Some("x")).is_present());
    }

    #[test]
    fn numbers_format_like_javascript() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(123_456.0), "123456");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }
}
