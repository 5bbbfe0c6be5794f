use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::broadcast;
use url::Url;

use super::{NodeId, NodeKind, NodeSpec, Page, PageEvent, ReadyState, RuleProbe};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// In-memory page (no real document). Used as the default host in tests and
/// as the reference for what a real document binding has to provide.
///
/// The page starts empty; test code drives it by completing or failing nodes,
/// registering loaded stylesheets, and flipping rule probes.
pub struct InMemoryPage {
    state: Mutex<PageState>,
    events: broadcast::Sender<PageEvent>,
    base: Url,
    user_agent: String,
    ordered_async: bool,
    ready_state_scripts: bool,
}

#[derive(Default)]
struct PageState {
    nodes: HashMap<NodeId, NodeSpec>,
    /// Insertion order of appended nodes.
    head: Vec<NodeId>,
    /// Resolved URLs of loaded stylesheets.
    sheets: Vec<String>,
    probes: HashMap<NodeId, RuleProbe>,
}

impl InMemoryPage {
    pub fn new(user_agent: &str) -> Self {
        let (events, _first_rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            state: Mutex::new(PageState::default()),
            events,
            base: Url::parse("http://localhost/").unwrap(),
            user_agent: user_agent.to_string(),
            ordered_async: false,
            ready_state_scripts: false,
        }
    }

    /// Set the base URL relative resource URLs resolve against.
    pub fn with_base(mut self, base: Url) -> Self {
        self.base = base;
        self
    }

    /// Report ordering-preserving async script support from the feature test.
    pub fn with_ordered_async(mut self, ordered: bool) -> Self {
        self.ordered_async = ordered;
        self
    }

    /// Report readiness transitions instead of load events for scripts.
    pub fn with_script_ready_state(mut self, ready_state: bool) -> Self {
        self.ready_state_scripts = ready_state;
        self
    }

    // ****************************************
    // ** Test drivers

    /// Mark the resource behind `node` as loaded.
    pub fn complete(&self, node: NodeId) {
        let _ = self.events.send(PageEvent::NodeLoaded { node });
    }

    /// Mark the resource behind `node` as failed.
    pub fn fail(&self, node: NodeId) {
        let _ = self.events.send(PageEvent::NodeFailed { node });
    }

    /// Report a readiness transition for `node`.
    pub fn set_ready_state(&self, node: NodeId, state: ReadyState) {
        let _ = self.events.send(PageEvent::ReadyState { node, state });
    }

    /// Register `href` (resolved against the base) as a loaded stylesheet.
    pub fn add_style_sheet(&self, href: &str) {
        let resolved = self.resolve_url(href);
        self.state.lock().unwrap().sheets.push(resolved);
    }

    /// Set the rule-probe answer for `node`.
    pub fn set_probe(&self, node: NodeId, probe: RuleProbe) {
        self.state.lock().unwrap().probes.insert(node, probe);
    }

    // ****************************************
    // ** Inspection

    /// Nodes appended to the head, in insertion order.
    pub fn inserted(&self) -> Vec<NodeId> {
        self.state.lock().unwrap().head.clone()
    }

    pub fn node_kind(&self, node: NodeId) -> Option<NodeKind> {
        self.state.lock().unwrap().nodes.get(&node).map(|n| n.kind)
    }

    /// Value of the first attribute named `name` on `node`.
    pub fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        let spec = state.nodes.get(&node)?;
        spec.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    /// Inline text content of `node`.
    pub fn text(&self, node: NodeId) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.nodes.get(&node)?.text.clone()
    }
}

impl Page for InMemoryPage {
    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }

    fn supports_ordered_async(&self) -> bool {
        self.ordered_async
    }

    fn script_ready_state(&self) -> bool {
        self.ready_state_scripts
    }

    fn create_node(&self, spec: NodeSpec) -> NodeId {
        let node = NodeId::new();
        self.state.lock().unwrap().nodes.insert(node, spec);
        node
    }

    fn append_to_head(&self, node: NodeId) {
        self.state.lock().unwrap().head.push(node);
    }

    fn resolve_url(&self, url: &str) -> String {
        self.base
            .join(url)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| url.to_string())
    }

    fn style_sheets(&self) -> Vec<String> {
        self.state.lock().unwrap().sheets.clone()
    }

    fn probe_rules(&self, node: NodeId) -> RuleProbe {
        let state = self.state.lock().unwrap();
        if !state.nodes.contains_key(&node) {
            return RuleProbe::Unavailable;
        }
        state
            .probes
            .get(&node)
            .copied()
            .unwrap_or(RuleProbe::NotReady)
    }

    fn subscribe(&self) -> broadcast::Receiver<PageEvent> {
        self.events.subscribe()
    }
}
