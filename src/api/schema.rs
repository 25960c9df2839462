//! Raw upstream response shapes
//!
//! The two summary APIs return incompatible JSON. These types deserialize
//! only the fields the normalizer maps into [`PageSummary`]; everything
//! else in the payloads is ignored.
//!
//! [`PageSummary`]: crate::summary::PageSummary

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::summary::{TextDirection, Thumbnail};

/// REST summary `type` value that identifies a missing page.
pub const REST_NOT_FOUND_TYPE: &str = "https://mediawiki.org/wiki/HyperSwitch/errors/not_found";

/// Action-API response envelope: `{ "query": { "pages": { "<id>": {...} } } }`
#[derive(Debug, Clone, Deserialize)]
pub struct ActionApiResponse {
    #[serde(default)]
    pub query: Option<ActionApiQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionApiQuery {
    /// Keyed by numeric page id (as a string); a well-formed response for a
    /// single title carries exactly one entry.
    #[serde(default)]
    pub pages: Option<HashMap<String, ActionApiPage>>,
}

/// One page entry from the action API
#[derive(Debug, Clone, Deserialize)]
pub struct ActionApiPage {
    /// Present (with any value) when the title does not exist
    #[serde(default)]
    pub missing: Option<Value>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub extract: String,
    #[serde(default)]
    pub thumbnail: Option<Thumbnail>,
    #[serde(default, rename = "canonicalurl")]
    pub canonical_url: String,
    #[serde(default, rename = "fullurl")]
    pub full_url: String,
    #[serde(default, rename = "pagelanguagedir")]
    pub page_language_dir: Option<TextDirection>,
}

/// REST summary endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct RestSummary {
    /// Payload type identifier; equals [`REST_NOT_FOUND_TYPE`] for a
    /// missing page
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, rename = "displaytitle")]
    pub display_title: String,
    #[serde(default)]
    pub extract: String,
    #[serde(default)]
    pub thumbnail: Option<Thumbnail>,
    #[serde(default)]
    pub content_urls: Option<ContentUrls>,
    #[serde(default)]
    pub dir: Option<TextDirection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentUrls {
    #[serde(default)]
    pub desktop: Option<PlatformUrls>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformUrls {
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub revisions: String,
}
