//! Canonical page summary model
//!
//! Source-agnostic shape produced by response normalization. Every
//! successfully normalized response fully populates all fields (with
//! defaults applied), so consumers only branch on `thumbnail.source`.

use serde::{Deserialize, Serialize};

/// Article thumbnail. Absent fields mean the page has no image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    /// Image URL
    #[serde(default)]
    pub source: Option<String>,
    /// Image width in pixels
    #[serde(default)]
    pub width: Option<u32>,
    /// Image height in pixels
    #[serde(default)]
    pub height: Option<u32>,
}

/// Text direction of the article content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

/// Branding override attached to every summary from a source.
/// Empty strings mean the presentational layer uses its defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
    /// Logo image URL
    pub logo: String,
    /// Display name of the source
    pub title: String,
}

/// Canonical summary of one page, independent of which upstream API
/// shape it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    /// Page title
    pub title: String,
    /// Intro extract
    pub content: String,
    /// Thumbnail image, if any
    pub thumbnail: Thumbnail,
    /// Canonical article URL
    pub url: String,
    /// Revision-history URL
    pub history: String,
    /// Text direction (defaults to LTR when upstream omits it)
    pub dir: TextDirection,
    /// Whether the source's base URL is a *.wikipedia.org domain
    pub wikipedia: bool,
    /// Source branding
    pub source: Branding,
}
