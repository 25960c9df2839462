//! Configuration for the processor and its named sources

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Default node discovery selector: any element carrying the lookup marker.
pub const DEFAULT_SELECTOR: &str = "[data-wikilookup]";

/// Event that starts a fetch on a bound node.
///
/// Unrecognized trigger names in configuration fall back to [`Trigger::Click`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    #[default]
    Click,
    MouseEnter,
}

impl Trigger {
    /// Parse a trigger name, falling back to the default for unknown values.
    pub fn from_name(name: &str) -> Self {
        match name {
            "mouseenter" => Trigger::MouseEnter,
            _ => Trigger::Click,
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Click => write!(f, "click"),
            Trigger::MouseEnter => write!(f, "mouseenter"),
        }
    }
}

impl<'de> Deserialize<'de> for Trigger {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Trigger::from_name(&name))
    }
}

/// Per-source configuration: where to fetch summaries from and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL template. `{{lang}}` and `{{pageName}}` tokens are
    /// substituted with URL-escaped values. None uses the mode's default
    /// wikipedia.org template.
    pub base_url: Option<String>,
    /// Default language when a node carries no language override
    pub lang: String,
    /// Use the REST summary endpoint instead of the action API
    pub use_restbase: bool,
    /// Branding logo URL (empty = presentational default)
    pub logo: String,
    /// Branding display name (empty = presentational default)
    pub name: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            lang: "en".to_string(),
            use_restbase: false,
            logo: String::new(),
            name: String::new(),
        }
    }
}

/// Processor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Node discovery selector
    pub selector: String,
    /// Event that starts a fetch
    pub trigger: Trigger,
    /// Eagerly fetch every discovered node at bind time
    pub prefetch: bool,
    /// Named source configurations. A `"default"` source always exists
    /// even when absent from this map.
    pub sources: HashMap<String, SourceConfig>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            selector: DEFAULT_SELECTOR.to_string(),
            trigger: Trigger::default(),
            prefetch: false,
            sources: HashMap::new(),
        }
    }
}

impl ProcessorConfig {
    /// Load configuration from a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }
}
