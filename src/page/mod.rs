//! Host page seam.
//!
//! The loader engine never touches a real document directly. Everything it
//! needs from the hosting page goes through the [`Page`] trait: creating and
//! inserting resource nodes, resolving URLs against the document base,
//! inspecting the list of loaded stylesheets, probing a style node's parsed
//! rules, and observing load progress through a broadcast feed of
//! [`PageEvent`]s.
//!
//! ## Notes
//! - Embedders bind this trait to an actual document. The crate ships
//!   [`in_memory::InMemoryPage`] as the reference implementation, which is
//!   also what the test suites drive.
//! - Node creation and insertion are separate steps. The engine attaches its
//!   completion watchers between the two, so an implementation must not emit
//!   events for a node before it has been appended.
//! - `style_sheets` returns **resolved** URLs. The engine resolves the URLs
//!   it matches against through [`Page::resolve_url`], so both sides agree.

use tokio::sync::broadcast;
use uuid::Uuid;

pub mod in_memory;

/// Identifies one injected resource node within a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Element kind of an injected node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// External stylesheet reference.
    Link,
    /// Inline style element (carries the import probe body).
    Style,
    /// External script reference.
    Script,
}

/// Blueprint for a node the engine wants inserted.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub kind: NodeKind,
    /// Attributes, set verbatim in order.
    pub attrs: Vec<(String, String)>,
    /// Inline text content, if any.
    pub text: Option<String>,
}

/// Readiness values reported by legacy engines for script nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Uninitialized,
    Loading,
    Loaded,
    Interactive,
    Complete,
}

impl ReadyState {
    /// True for the values that mark a script as finished.
    pub fn is_settled(self) -> bool {
        matches!(self, ReadyState::Loaded | ReadyState::Complete)
    }
}

/// Outcome of probing a style node's parsed rule list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleProbe {
    /// Rules are accessible; the imported stylesheet has been applied.
    Ready,
    /// The stylesheet is still loading.
    NotReady,
    /// The page cannot answer for this node (node gone, no sheet object).
    Unavailable,
}

/// Load-progress notifications emitted by a page.
#[derive(Debug, Clone)]
pub enum PageEvent {
    /// The resource behind `node` finished loading.
    NodeLoaded { node: NodeId },
    /// The resource behind `node` failed to load.
    NodeFailed { node: NodeId },
    /// A legacy engine reported a readiness transition for `node`.
    ReadyState { node: NodeId, state: ReadyState },
}

/// A hosting document, as seen by the loader engine.
pub trait Page: Send + Sync {
    /// The page's user agent string.
    fn user_agent(&self) -> String;

    /// Feature test: do dynamically created script nodes honor the
    /// ordering-preserving flag that disables asynchronous execution?
    fn supports_ordered_async(&self) -> bool;

    /// Feature test: do dynamically inserted script nodes report progress
    /// through readiness transitions instead of load events?
    fn script_ready_state(&self) -> bool;

    /// Create a node from `spec` without inserting it.
    fn create_node(&self, spec: NodeSpec) -> NodeId;

    /// Append a previously created node to the document's resource-loading
    /// region.
    fn append_to_head(&self, node: NodeId);

    /// Resolve a possibly-relative URL against the document base.
    fn resolve_url(&self, url: &str) -> String;

    /// Resolved URLs of every stylesheet the document has loaded so far.
    fn style_sheets(&self) -> Vec<String>;

    /// Probe the parsed rule list of a style node.
    fn probe_rules(&self, node: NodeId) -> RuleProbe;

    /// Subscribe to load-progress events.
    fn subscribe(&self) -> broadcast::Receiver<PageEvent>;
}
