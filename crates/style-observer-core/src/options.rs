//! Observer configuration.
//!
//! Mode and format values parse permissively: anything that is not the
//! recognised keyword falls back to `ChangedOnly` / `ValueOnly` rather than
//! failing. Omitted values use the defaults (`ChangedOnly` / `Object`).

use serde::{Deserialize, Serialize};

/// Which tracked properties are reported on each update cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationMode {
    /// Report every tracked property, changed or not.
    All,
    /// Report only properties whose value differs from the cache.
    #[default]
    ChangedOnly,
}

impl NotificationMode {
    /// Keyword form used in configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::ChangedOnly => "changed_only",
        }
    }
}

impl From<&str> for NotificationMode {
    fn from(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::ChangedOnly
        }
    }
}

impl From<String> for NotificationMode {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<NotificationMode> for String {
    fn from(mode: NotificationMode) -> Self {
        mode.as_str().to_string()
    }
}

/// Shape of the payload passed to the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReturnFormat {
    /// Property name → current value.
    ValueOnly,
    /// Property name → `{value, previousValue, changed, element}`.
    #[default]
    Object,
}

impl ReturnFormat {
    /// Keyword form used in configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ValueOnly => "value_only",
            Self::Object => "object",
        }
    }
}

impl From<&str> for ReturnFormat {
    fn from(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("object") {
            Self::Object
        } else {
            Self::ValueOnly
        }
    }
}

impl From<String> for ReturnFormat {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<ReturnFormat> for String {
    fn from(format: ReturnFormat) -> Self {
        format.as_str().to_string()
    }
}

/// Construction options for a [`StyleObserver`](crate::StyleObserver).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserverOptions {
    /// Property names to track, in reporting order.
    pub properties: Vec<String>,
    /// Which properties are reported per cycle.
    #[serde(default)]
    pub notification_mode: NotificationMode,
    /// Payload shape.
    #[serde(default)]
    pub return_format: ReturnFormat,
}

impl ObserverOptions {
    /// Create options tracking `properties` with default mode and format.
    pub fn new<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            properties: properties.into_iter().map(Into::into).collect(),
            notification_mode: NotificationMode::default(),
            return_format: ReturnFormat::default(),
        }
    }

    /// Set the notification mode.
    pub fn with_notification_mode(mut self, mode: NotificationMode) -> Self {
        self.notification_mode = mode;
        self
    }

    /// Set the return format.
    pub fn with_return_format(mut self, format: ReturnFormat) -> Self {
        self.return_format = format;
        self
    }

    /// Check if `name` is one of the tracked properties. Standard property
    /// names match case-insensitively.
    pub fn tracks(&self, name: &str) -> bool {
        let name = normalize_property_name(name);
        self.properties.iter().any(|p| *p == name)
    }

    /// Normalise property names the way hosts report them, then drop blank
    /// and repeated names, keeping the first occurrence.
    pub(crate) fn normalize_properties(&mut self) {
        let mut seen: Vec<String> = Vec::with_capacity(self.properties.len());
        for name in self.properties.drain(..) {
            let name = normalize_property_name(&name);
            if !name.is_empty() && !seen.contains(&name) {
                seen.push(name);
            }
        }
        self.properties = seen;
    }
}

/// Standard property names are ASCII case-insensitive; custom properties
/// (`--*`) keep their case.
fn normalize_property_name(name: &str) -> String {
    let name = name.trim();
    if name.starts_with("--") {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    }
}
