//! Upstream summary API layer
//!
//! * **`transport`** — the async HTTP GET seam and its reqwest implementation.
//! * **`schema`** — serde types for the two incompatible upstream shapes.
//! * **`source`** — [`SummarySource`]: per-source cache, in-flight request
//!   coalescing, request construction, and response normalization.

pub mod schema;
pub mod source;
pub mod transport;

pub use source::SummarySource;
pub use transport::{HttpTransport, Transport, TransportError};
