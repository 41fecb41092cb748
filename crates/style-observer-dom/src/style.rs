//! Declared style and the resolution rules used for computed values.

/// Standard properties that inherit from the parent when not declared.
/// Custom properties always inherit.
const INHERITED_PROPERTIES: &[&str] = &[
    "color",
    "cursor",
    "direction",
    "font-family",
    "font-size",
    "font-style",
    "font-weight",
    "letter-spacing",
    "line-height",
    "text-align",
    "visibility",
    "white-space",
];

/// Initial values for the standard properties this host knows about.
const INITIAL_VALUES: &[(&str, &str)] = &[
    ("color", "rgb(0, 0, 0)"),
    ("display", "inline"),
    ("font-size", "16px"),
    ("height", "auto"),
    ("opacity", "1"),
    ("position", "static"),
    ("visibility", "visible"),
    ("width", "auto"),
];

/// Check if `name` is a custom property (`--*`).
pub fn is_custom_property(name: &str) -> bool {
    name.starts_with("--")
}

/// Check if `name` inherits by default.
pub fn is_inherited(name: &str) -> bool {
    is_custom_property(name) || INHERITED_PROPERTIES.contains(&name)
}

/// Initial value of `name`, empty if unknown. Custom properties start
/// with no value.
pub fn initial_value(name: &str) -> &'static str {
    INITIAL_VALUES
        .iter()
        .find(|(property, _)| *property == name)
        .map_or("", |(_, value)| *value)
}

/// Normalise a property name: standard names are ASCII case-insensitive,
/// custom property names are case-sensitive.
pub fn normalize_name(name: &str) -> String {
    let name = name.trim();
    if is_custom_property(name) {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    }
}

/// An element's own declarations, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleDeclarations {
    entries: Vec<(String, String)>,
}

impl StyleDeclarations {
    /// Create an empty declaration block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an inline `style` string.
    pub fn parse(source: &str) -> Self {
        let mut declarations = Self::new();
        for (name, value) in parse_inline_declarations(source) {
            declarations.set(&name, &value);
        }
        declarations
    }

    /// Get the declared value of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set `name`, replacing any existing declaration in place.
    /// Returns the previous value.
    pub fn set(&mut self, name: &str, value: &str) -> Option<String> {
        match self.entries.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, value.to_string())),
            None => {
                self.entries.push((name.to_string(), value.to_string()));
                None
            }
        }
    }

    /// Remove `name`, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no declarations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over declarations in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Serialise back to `name: value; ...` form.
    pub fn to_css_text(&self) -> String {
        self.entries
            .iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Small, permissive inline declaration parser. Returns normalised property
/// names and trimmed raw values; entries without a name or value are skipped.
pub fn parse_inline_declarations(source: &str) -> Vec<(String, String)> {
    source
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = normalize_name(name);
            let value = value.trim().to_string();
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some((name, value))
        })
        .collect()
}
