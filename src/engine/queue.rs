use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

/// Resource types the engine knows how to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Style,
    Script,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Style => write!(f, "style"),
            ResourceKind::Script => write!(f, "script"),
        }
    }
}

/// One stylesheet request: the URL to load plus the caller's identifier for
/// the injected node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleEntry {
    pub url: String,
    pub id: String,
}

/// Opaque caller payload handed back to the batch callback.
pub type Payload = Arc<dyn Any + Send + Sync>;

/// Completion callback for one batch. Fires exactly once, after every URL in
/// the batch has finished.
pub type BatchCallback = Box<dyn FnOnce(Option<Payload>) + Send>;

/// A group of same-kind URLs requested together, sharing one callback.
pub struct LoadBatch {
    pub kind: ResourceKind,
    /// Outstanding URLs; the front entry is removed as each resource
    /// completes.
    pub urls: VecDeque<String>,
    pub callback: Option<BatchCallback>,
    pub payload: Option<Payload>,
    /// url to sanitized identifier, styles only.
    pub ids: HashMap<String, String>,
}

impl LoadBatch {
    /// Single parallel batch for a group of stylesheets.
    pub fn styles(
        entries: &[StyleEntry],
        callback: Option<BatchCallback>,
        payload: Option<Payload>,
    ) -> Self {
        let mut urls = VecDeque::with_capacity(entries.len());
        let mut ids = HashMap::with_capacity(entries.len());

        for entry in entries {
            urls.push_back(entry.url.clone());
            ids.insert(entry.url.clone(), sanitize_id(&entry.id));
        }

        Self {
            kind: ResourceKind::Style,
            urls,
            callback,
            payload,
            ids,
        }
    }

    /// Batch of script URLs loaded together.
    pub fn scripts(
        urls: Vec<String>,
        callback: Option<BatchCallback>,
        payload: Option<Payload>,
    ) -> Self {
        Self {
            kind: ResourceKind::Script,
            urls: urls.into(),
            callback,
            payload,
            ids: HashMap::new(),
        }
    }
}

impl fmt::Debug for LoadBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadBatch")
            .field("kind", &self.kind)
            .field("urls", &self.urls)
            .field("callback", &self.callback.as_ref().map(|_| "<callback>"))
            .field("payload", &self.payload.as_ref().map(|_| "<payload>"))
            .field("ids", &self.ids)
            .finish()
    }
}

/// One value per [`ResourceKind`].
#[derive(Debug, Default)]
pub struct PerKind<T> {
    style: T,
    script: T,
}

impl<T> PerKind<T> {
    pub fn get(&self, kind: ResourceKind) -> &T {
        match kind {
            ResourceKind::Style => &self.style,
            ResourceKind::Script => &self.script,
        }
    }

    pub fn get_mut(&mut self, kind: ResourceKind) -> &mut T {
        match kind {
            ResourceKind::Style => &mut self.style,
            ResourceKind::Script => &mut self.script,
        }
    }
}

/// Collapse a caller-supplied identifier to its alphanumeric runs joined by
/// underscores, yielding a stable attribute-safe token.
pub fn sanitize_id(raw: &str) -> String {
    raw.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
