//! Scanner/binder and per-node widget state machine
//!
//! The processor scans a container for marked-up terms, owns one
//! [`NodeController`] per discovered node (arena-indexed by [`NodeId`]),
//! and orchestrates fetches when the host delivers a matching trigger
//! event. State transitions are broadcast so the presentational layer can
//! style itself.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use crate::api::{SummarySource, Transport};
use crate::config::{ProcessorConfig, Trigger};
use crate::dom::{Document, NodeId, Selector};
use crate::error::{Error, Result};
use crate::registry::SourceRegistry;
use crate::summary::PageSummary;

/// Marker attribute that makes an element discoverable by the default selector.
pub const LOOKUP_ATTR: &str = "data-wikilookup";
/// Explicit page-name override; written back at scan time with the trimmed name.
pub const TITLE_ATTR: &str = "data-wl-title";
/// Per-node source-name override, read at trigger time.
pub const SOURCE_ATTR: &str = "data-wl-source";
/// Per-node language override, read at trigger time.
pub const LANG_ATTR: &str = "data-wl-lang";

const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Lifecycle state of one widget node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    /// No successful fetch yet
    Pending,
    /// Summary fetched; terminal (repeated triggers are no-ops)
    Ready,
    /// Last fetch failed or the page is missing; retryable
    Error,
}

/// Broadcast on every state transition
#[derive(Debug, Clone)]
pub struct WidgetEvent {
    pub node: NodeId,
    pub state: WidgetState,
}

struct ControllerState {
    state: WidgetState,
    fetching: bool,
    summary: Option<PageSummary>,
}

/// Owned widget state for one discovered node.
///
/// `fetching` is true only between request dispatch and settlement; it
/// exists purely to prevent duplicate dispatch, not to support
/// cancellation. The inner lock is never held across an await.
pub struct NodeController {
    node: NodeId,
    inner: Mutex<ControllerState>,
}

impl NodeController {
    fn new(node: NodeId) -> Self {
        Self {
            node,
            inner: Mutex::new(ControllerState {
                state: WidgetState::Pending,
                fetching: false,
                summary: None,
            }),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn state(&self) -> WidgetState {
        self.inner.lock().unwrap().state
    }

    /// Last successfully fetched summary, if any.
    pub fn summary(&self) -> Option<PageSummary> {
        self.inner.lock().unwrap().summary.clone()
    }

    /// Attempt the pending/error -> fetching transition. Returns false when
    /// the trigger must be ignored (already ready, or a fetch is mid-flight).
    fn begin_fetch(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.fetching || inner.state == WidgetState::Ready {
            return false;
        }
        inner.fetching = true;
        true
    }

    /// Settle the fetch: store the outcome, clear `fetching` regardless of
    /// outcome, and return the new state.
    fn finish_fetch(&self, outcome: Result<PageSummary>) -> WidgetState {
        let mut inner = self.inner.lock().unwrap();
        inner.fetching = false;
        match outcome {
            Ok(summary) => {
                inner.summary = Some(summary);
                inner.state = WidgetState::Ready;
            }
            Err(_) => {
                inner.state = WidgetState::Error;
            }
        }
        inner.state
    }
}

/// Scans a container, binds triggers, and drives per-node fetches.
pub struct Processor {
    registry: SourceRegistry,
    trigger: Trigger,
    controllers: HashMap<NodeId, Arc<NodeController>>,
    bound: HashMap<NodeId, Trigger>,
    events: broadcast::Sender<WidgetEvent>,
}

impl Processor {
    /// Scan `doc` and bind every eligible node.
    ///
    /// A node is eligible when it matches the configured selector and,
    /// after trimming, has non-empty text content or an explicit
    /// page-name attribute; the trimmed page name is written back to the
    /// attribute so repeated scans are stable. An empty container is a
    /// fatal construction error. With `prefetch` set, every discovered
    /// node's fetch starts before this returns.
    pub async fn new(
        doc: &mut Document,
        config: ProcessorConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        if doc.is_empty() {
            return Err(Error::Construction(
                "container has no elements to scan".to_string(),
            ));
        }

        let selector = Selector::parse(&config.selector)?;
        let registry = SourceRegistry::new(config.sources, transport);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let mut controllers = HashMap::new();
        let mut bound = HashMap::new();
        for (id, element) in doc.iter_mut() {
            if !selector.matches(element) {
                continue;
            }
            let page = element
                .attr(TITLE_ATTR)
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| element.text().trim().to_string());
            if page.is_empty() {
                continue;
            }
            element.set_attr(TITLE_ATTR, page);
            controllers.insert(id, Arc::new(NodeController::new(id)));
            bound.insert(id, config.trigger);
        }
        tracing::debug!(nodes = controllers.len(), "scan complete");

        let processor = Self {
            registry,
            trigger: config.trigger,
            controllers,
            bound,
            events,
        };

        if config.prefetch {
            processor.prefetch(doc).await;
        }

        Ok(processor)
    }

    /// Deliver a host event to a node. Events that do not match the node's
    /// bound trigger (or hit an unbound node) are ignored.
    pub async fn handle_event(&self, doc: &Document, node: NodeId, trigger: Trigger) -> Result<()> {
        match self.bound.get(&node) {
            Some(bound) if *bound == trigger => self.trigger_node(doc, node).await,
            _ => Ok(()),
        }
    }

    /// Start (or ignore, per the state machine) a fetch for one node.
    ///
    /// Page name, source, and language overrides are read from the element
    /// at trigger time, so they may change between scan and trigger. Fetch
    /// failures land in the node's `Error` state rather than propagating;
    /// only an unresolvable source or unknown node returns `Err`, leaving
    /// the node untouched.
    pub async fn trigger_node(&self, doc: &Document, node: NodeId) -> Result<()> {
        let controller = self
            .controllers
            .get(&node)
            .ok_or(Error::NodeNotFound(node.index()))?;
        let element = doc.get(node).ok_or(Error::NodeNotFound(node.index()))?;

        let page = element
            .attr(TITLE_ATTR)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| element.text().trim().to_string());
        let source_name = element.attr(SOURCE_ATTR);
        let lang = element.attr(LANG_ATTR);

        let Some(source) = self.registry.get_source(source_name) else {
            tracing::error!(
                node = node.index(),
                source = source_name.unwrap_or("default"),
                "no source could be resolved; node left untouched"
            );
            return Err(Error::UnknownSource(
                source_name.unwrap_or("default").to_string(),
            ));
        };

        self.run_fetch(controller, source, &page, lang).await
    }

    async fn run_fetch(
        &self,
        controller: &Arc<NodeController>,
        source: Arc<SummarySource>,
        page: &str,
        lang: Option<&str>,
    ) -> Result<()> {
        if !controller.begin_fetch() {
            tracing::debug!(
                node = controller.node.index(),
                "trigger ignored (ready or mid-flight)"
            );
            return Ok(());
        }

        let outcome = source.get_page_info(page, lang).await;
        let state = controller.finish_fetch(outcome);
        let _ = self.events.send(WidgetEvent {
            node: controller.node,
            state,
        });
        Ok(())
    }

    /// Start a fetch for every discovered node.
    pub async fn prefetch(&self, doc: &Document) {
        let fetches = self
            .controllers
            .keys()
            .map(|&node| self.trigger_node(doc, node));
        for result in futures::future::join_all(fetches).await {
            if let Err(e) = result {
                tracing::warn!(error = %e, "prefetch failed");
            }
        }
    }

    /// Rebind every discovered node to a new trigger. Rebinding to the
    /// current trigger is a no-op.
    pub fn set_trigger(&mut self, trigger: Trigger) {
        if trigger == self.trigger {
            return;
        }
        tracing::debug!(from = %self.trigger, to = %trigger, "rebinding trigger");
        self.trigger = trigger;
        for bound in self.bound.values_mut() {
            *bound = trigger;
        }
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// Widget state of a discovered node.
    pub fn state(&self, node: NodeId) -> Option<WidgetState> {
        self.controllers.get(&node).map(|c| c.state())
    }

    /// Last fetched summary of a discovered node.
    pub fn summary(&self, node: NodeId) -> Option<PageSummary> {
        self.controllers.get(&node).and_then(|c| c.summary())
    }

    /// Identities of all discovered nodes.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.controllers.keys().copied()
    }

    /// Subscribe to state-transition events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<WidgetEvent> {
        self.events.subscribe()
    }
}
