//! Callback payloads.
//!
//! An update cycle produces one [`ChangeRecord`] per reported property, which
//! is then shaped into [`StyleChanges`] according to the configured
//! [`ReturnFormat`].

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::options::ReturnFormat;

/// Detail record for one property in `Object` format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyChange<E> {
    /// Current computed value.
    pub value: String,
    /// Value from the previous cycle, `None` on first observation.
    pub previous_value: Option<String>,
    /// Whether `value` differs from `previous_value`.
    pub changed: bool,
    /// Element the value was read from.
    pub element: E,
}

/// Property name → value map that keeps the tracked-property order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for PropertyMap<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> PropertyMap<T> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Names are unique because tracked properties are.
    pub(crate) fn push(&mut self, name: String, value: T) {
        self.entries.push((name, value));
    }

    /// Look up the entry for `name`.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Check whether `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Property names in tracked order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Iterate over name/value pairs in tracked order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<T: Serialize> Serialize for PropertyMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Payload handed to the observer callback. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StyleChanges<E> {
    /// `ValueOnly` format.
    Values(PropertyMap<String>),
    /// `Object` format.
    Details(PropertyMap<PropertyChange<E>>),
}

impl<E> StyleChanges<E> {
    /// Shape a cycle's records per `format`.
    pub(crate) fn from_records(records: Vec<ChangeRecord<E>>, format: ReturnFormat) -> Self {
        match format {
            ReturnFormat::ValueOnly => {
                let mut values = PropertyMap::new();
                for record in records {
                    values.push(record.name, record.value);
                }
                Self::Values(values)
            }
            ReturnFormat::Object => {
                let mut details = PropertyMap::new();
                for record in records {
                    details.push(
                        record.name,
                        PropertyChange {
                            value: record.value,
                            previous_value: record.previous_value,
                            changed: record.changed,
                            element: record.element,
                        },
                    );
                }
                Self::Details(details)
            }
        }
    }

    /// Number of reported properties.
    pub fn len(&self) -> usize {
        match self {
            Self::Values(values) => values.len(),
            Self::Details(details) => details.len(),
        }
    }

    /// Always false for payloads produced by an observer.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reported property names in tracked order.
    pub fn property_names(&self) -> Vec<&str> {
        match self {
            Self::Values(values) => values.keys().collect(),
            Self::Details(details) => details.keys().collect(),
        }
    }

    /// Current value of a reported property, in either format.
    pub fn value(&self, name: &str) -> Option<&str> {
        match self {
            Self::Values(values) => values.get(name).map(String::as_str),
            Self::Details(details) => details.get(name).map(|d| d.value.as_str()),
        }
    }

    /// The bare values, if this payload is in `ValueOnly` format.
    pub fn values(&self) -> Option<&PropertyMap<String>> {
        match self {
            Self::Values(values) => Some(values),
            Self::Details(_) => None,
        }
    }

    /// The detail records, if this payload is in `Object` format.
    pub fn details(&self) -> Option<&PropertyMap<PropertyChange<E>>> {
        match self {
            Self::Values(_) => None,
            Self::Details(details) => Some(details),
        }
    }
}

/// One reported property within an update cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChangeRecord<E> {
    pub name: String,
    pub value: String,
    pub previous_value: Option<String>,
    pub changed: bool,
    pub element: E,
}
