//! Style observer configuration
//!
//! Loads observer, demo and logging settings from `style-observer.toml`,
//! with environment variables taking precedence.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE: &str = "style-observer.toml";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StyleObserverConfig {
    /// Observer construction settings
    pub observer: ObserverConfig,
    /// Demo scenario settings
    pub demo: DemoConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Observer construction settings.
///
/// Mode and format are kept as written; the observer falls back to its own
/// defaults for anything it does not recognise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// Properties to track, in reporting order
    pub properties: Vec<String>,
    /// `all` or `changed_only`
    pub notification_mode: Option<String>,
    /// `object` or `value_only`
    pub return_format: Option<String>,
}

/// Demo scenario configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Names of the demo elements to observe
    pub observe: Vec<String>,
    /// Mutations replayed against the demo document, in order
    pub steps: Vec<DemoStep>,
}

/// One scripted demo action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DemoStep {
    /// Declare `property: value` on an element.
    Set {
        element: String,
        property: String,
        value: String,
    },
    /// Remove a declaration from an element.
    Remove { element: String, property: String },
    /// Stop observing one element, or every element if none is named.
    Unobserve { element: Option<String> },
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// `env_logger` filter directive (e.g. `debug`, `style_observer_core=trace`)
    pub filter: Option<String>,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            properties: vec!["--state".to_string(), "display".to_string()],
            notification_mode: None,
            return_format: None,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        let set = |element: &str, property: &str, value: &str| DemoStep::Set {
            element: element.to_string(),
            property: property.to_string(),
            value: value.to_string(),
        };
        Self {
            observe: vec!["panel".to_string(), "badge".to_string()],
            steps: vec![
                set("panel", "--state", "busy"),
                set("badge", "display", "none"),
                set("badge", "display", "none"),
                DemoStep::Unobserve {
                    element: Some("badge".to_string()),
                },
                set("panel", "--state", "done"),
                DemoStep::Remove {
                    element: "panel".to_string(),
                    property: "--state".to_string(),
                },
                DemoStep::Unobserve { element: None },
            ],
        }
    }
}

impl StyleObserverConfig {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(StyleObserverConfig)` - Successfully loaded configuration
    /// * `Err(String)` - Error message if loading failed
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Load configuration from the default location (style-observer.toml in
    /// the current directory) or return default configuration if the file
    /// doesn't exist
    pub fn load_or_default() -> Self {
        Self::load_from_file(CONFIG_FILE).unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        if let Ok(val) = std::env::var("STYLE_OBSERVER_PROPERTIES") {
            let properties: Vec<String> = val
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
            if !properties.is_empty() {
                self.observer.properties = properties;
            }
        }
        if let Ok(mode) = std::env::var("STYLE_OBSERVER_NOTIFICATION_MODE") {
            self.observer.notification_mode = Some(mode);
        }
        if let Ok(format) = std::env::var("STYLE_OBSERVER_RETURN_FORMAT") {
            self.observer.return_format = Some(format);
        }
        if let Ok(filter) = std::env::var("STYLE_OBSERVER_LOG") {
            self.logging.filter = Some(filter);
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from style-observer.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}
