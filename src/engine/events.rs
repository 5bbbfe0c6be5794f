//! Loader command and event types.
//!
//! Commands flow from [`LoaderHandle`](crate::engine::handle::LoaderHandle)
//! and from detection watchers into the engine's command loop; events flow
//! out on a broadcast channel for anyone observing load progress.

use std::fmt;

use tokio::sync::oneshot;

use crate::engine::queue::{BatchCallback, Payload, ResourceKind, StyleEntry};
use crate::errors::LoaderError;

/// Commands accepted by the loader's command loop.
pub enum LoaderCommand {
    // ****************************************
    // ** Load requests
    /// Queue a group of stylesheets. Parallel on every engine family.
    LoadStyles {
        entries: Vec<StyleEntry>,
        callback: Option<BatchCallback>,
        payload: Option<Payload>,
    },
    /// Queue one or more scripts. Parallel only where execution order is
    /// preserved, otherwise fanned out into sequential single-URL batches.
    LoadScripts {
        urls: Vec<String>,
        callback: Option<BatchCallback>,
        payload: Option<Payload>,
    },

    // ****************************************
    // ** Completion signals (sent by detection watchers)
    /// One resource of the pending batch for `kind` has finished loading.
    Finish { kind: ResourceKind },
    /// A watcher gave up without a positive signal.
    Stalled { kind: ResourceKind, url: String },

    // ****************************************
    // ** Queries
    /// Is a batch of `kind` currently in flight?
    QueryPending {
        kind: ResourceKind,
        reply: oneshot::Sender<bool>,
    },

    // ****************************************
    // ** Lifecycle
    /// Stop the command loop.
    Shutdown {
        reply: oneshot::Sender<Result<(), LoaderError>>,
    },
}

impl fmt::Debug for LoaderCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderCommand::LoadStyles { entries, .. } => f
                .debug_struct("LoadStyles")
                .field("entries", entries)
                .finish_non_exhaustive(),
            LoaderCommand::LoadScripts { urls, .. } => f
                .debug_struct("LoadScripts")
                .field("urls", urls)
                .finish_non_exhaustive(),
            LoaderCommand::Finish { kind } => {
                f.debug_struct("Finish").field("kind", kind).finish()
            }
            LoaderCommand::Stalled { kind, url } => f
                .debug_struct("Stalled")
                .field("kind", kind)
                .field("url", url)
                .finish(),
            LoaderCommand::QueryPending { kind, .. } => f
                .debug_struct("QueryPending")
                .field("kind", kind)
                .finish_non_exhaustive(),
            LoaderCommand::Shutdown { .. } => {
                f.debug_struct("Shutdown").finish_non_exhaustive()
            }
        }
    }
}

/// Events emitted by the loader engine.
#[derive(Debug, Clone)]
pub enum LoaderEvent {
    // ****************************************
    // ** Engine lifecycle
    /// Engine command loop has started.
    EngineStarted,
    /// Engine command loop has stopped.
    EngineShutdown,

    // ****************************************
    // ** Queueing
    /// A load request was accepted and split into `batches` batches.
    LoadQueued { kind: ResourceKind, batches: usize },
    /// A batch was promoted to the pending slot and its nodes injected.
    LoadStarted { kind: ResourceKind, urls: Vec<String> },

    // ****************************************
    // ** Progress
    /// One resource of the pending batch finished. (@TODO: carry the finished
    /// URL once the pending slot tracks completion per URL rather than as a
    /// countdown.)
    ResourceFinished { kind: ResourceKind, remaining: usize },
    /// A polling watcher hit its ceiling, or the page could not answer for a
    /// node. The batch finishes anyway; this is a diagnostic, not an error.
    DetectionStalled { kind: ResourceKind, url: String },
    /// The pending batch emptied and its callback (if any) has run.
    BatchFinished { kind: ResourceKind },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_kind_display() {
        assert_eq!(ResourceKind::Style.to_string(), "style");
        assert_eq!(ResourceKind::Script.to_string(), "script");
    }

    #[test]
    fn command_debug_skips_callbacks() {
        let cmd = LoaderCommand::LoadScripts {
            urls: vec!["x.js".to_string()],
            callback: Some(Box::new(|_| {})),
            payload: None,
        };
        let dbg = format!("{cmd:?}");
        assert!(dbg.contains("LoadScripts"));
        assert!(dbg.contains("x.js"));
        assert!(!dbg.contains("callback"));
    }

    #[test]
    fn finish_command_debug() {
        let cmd = LoaderCommand::Finish {
            kind: ResourceKind::Style,
        };
        assert!(format!("{cmd:?}").contains("Finish"));
    }

    #[test]
    fn event_debug_variants() {
        let a = LoaderEvent::EngineStarted;
        let b = LoaderEvent::LoadStarted {
            kind: ResourceKind::Script,
            urls: vec!["x.js".to_string()],
        };
        let c = LoaderEvent::DetectionStalled {
            kind: ResourceKind::Style,
            url: "a.css".to_string(),
        };

        assert!(format!("{a:?}").contains("EngineStarted"));
        assert!(format!("{b:?}").contains("LoadStarted"));
        assert!(format!("{c:?}").contains("DetectionStalled"));
    }
}
