//! Named source registry
//!
//! Maps a source name to its configured [`SummarySource`]. A `"default"`
//! source always exists, synthesized from [`SourceConfig::default`] when
//! the caller supplies no configuration for it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::api::{SummarySource, Transport};
use crate::config::SourceConfig;

/// Name of the fallback source every registry carries.
pub const DEFAULT_SOURCE: &str = "default";

/// Registry of named [`SummarySource`] instances sharing one transport.
pub struct SourceRegistry {
    sources: HashMap<String, Arc<SummarySource>>,
}

impl SourceRegistry {
    /// Build one source per named configuration, synthesizing the
    /// `"default"` entry when absent.
    pub fn new(mut configs: HashMap<String, SourceConfig>, transport: Arc<dyn Transport>) -> Self {
        configs
            .entry(DEFAULT_SOURCE.to_string())
            .or_insert_with(SourceConfig::default);

        let sources = configs
            .into_iter()
            .map(|(name, config)| {
                let source = Arc::new(SummarySource::new(config, Arc::clone(&transport)));
                (name, source)
            })
            .collect();

        Self { sources }
    }

    /// Resolve a source by name. Unknown or omitted names fall back to the
    /// `"default"` source — the very same instance `get_source(Some("default"))`
    /// returns.
    pub fn get_source(&self, name: Option<&str>) -> Option<Arc<SummarySource>> {
        name.and_then(|n| self.sources.get(n))
            .or_else(|| self.sources.get(DEFAULT_SOURCE))
            .cloned()
    }
}
