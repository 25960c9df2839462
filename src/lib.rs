//! # wikilookup
//!
//! Scans a document for marked-up terms, fetches a short summary of each
//! term from a remote encyclopedia-style API, and drives a per-node widget
//! lifecycle (`pending -> ready | error`) for an external presentational
//! layer.
//!
//! **Architecture:**
//!
//! * **`dom`** — minimal element arena + selector the host populates.
//! * **`processor`** — scanner/binder and the per-node state machine.
//! * **`registry`** — named source lookup with a guaranteed `"default"`.
//! * **`api`** — per-source fetch, cache, request coalescing, and
//!   normalization of the two upstream response shapes.
//! * **`key`** — canonical cache keying.
//! * **`config`** / **`error`** — configuration and the crate error type.
//!
//! Two properties the fetch layer guarantees per source: at most one
//! in-flight request per cache key (concurrent callers share the single
//! outcome), and an append-only cache populated on success only, so
//! failed keys are retried while cached keys never touch the network
//! again.

pub mod api;
pub mod config;
pub mod dom;
pub mod error;
pub mod key;
pub mod processor;
pub mod registry;
pub mod summary;

pub use api::{HttpTransport, SummarySource, Transport, TransportError};
pub use config::{ProcessorConfig, SourceConfig, Trigger, DEFAULT_SELECTOR};
pub use dom::{Document, Element, NodeId, Selector};
pub use error::{Error, Result};
pub use processor::{
    NodeController, Processor, WidgetEvent, WidgetState, LANG_ATTR, LOOKUP_ATTR, SOURCE_ATTR,
    TITLE_ATTR,
};
pub use registry::{SourceRegistry, DEFAULT_SOURCE};
pub use summary::{Branding, PageSummary, TextDirection, Thumbnail};
