//! Completion detection.
//!
//! No two engine families agree on how to tell that an injected resource has
//! become usable. This module picks a detection strategy from the resource
//! kind and the capability profile, then runs it as an independent watcher
//! task. Every watcher satisfies the same contract: observe one node, send
//! exactly one [`LoaderCommand::Finish`] back to the engine, and never block
//! the queue, even when the only honest answer is "give up".

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::LoaderConfig;
use crate::engine::events::LoaderCommand;
use crate::engine::queue::ResourceKind;
use crate::env::{CapabilityProfile, EngineFamily};
use crate::page::{NodeId, Page};

pub mod import_probe;
pub mod native;
pub mod ready_state;
pub mod sheet_list;

/// How completion is detected for one batch's nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Wait for the node's load or error event.
    NativeEvent,
    /// Watch readiness transitions; `defer` inserts a short wait before
    /// finishing on the generation that reports `loaded` prematurely.
    ReadyStatePoll { defer: bool },
    /// Scan the document's stylesheet list for the resolved URL.
    SheetListPoll,
    /// Probe the parsed rule list of an `@import` style node.
    ImportProbePoll,
}

/// Pick the strategy for `kind` under `env`. Computed once per batch.
pub fn select(kind: ResourceKind, env: &CapabilityProfile) -> Strategy {
    match kind {
        ResourceKind::Script if env.ready_state_scripts => Strategy::ReadyStatePoll {
            defer: env.ie_version == Some(10),
        },
        ResourceKind::Script => Strategy::NativeEvent,
        ResourceKind::Style => match env.family {
            EngineFamily::Gecko => Strategy::ImportProbePoll,
            EngineFamily::Webkit => Strategy::SheetListPoll,
            _ => Strategy::NativeEvent,
        },
    }
}

/// Spawn the watcher task for one injected node.
///
/// Event-driven strategies subscribe here, before the caller appends the node,
/// so no load event can slip past them. `url` must already be resolved
/// against the document base or list matching will never succeed.
pub(crate) fn spawn_watcher(
    strategy: Strategy,
    page: &Arc<dyn Page>,
    node: NodeId,
    url: String,
    kind: ResourceKind,
    cmd_tx: mpsc::Sender<LoaderCommand>,
    config: &LoaderConfig,
) -> JoinHandle<()> {
    match strategy {
        Strategy::NativeEvent => {
            let events = page.subscribe();
            tokio::spawn(native::watch(events, node, kind, cmd_tx))
        }
        Strategy::ReadyStatePoll { defer } => {
            let events = page.subscribe();
            let delay = defer.then_some(config.ready_state_defer);
            tokio::spawn(ready_state::watch(events, node, kind, cmd_tx, delay))
        }
        Strategy::SheetListPoll => tokio::spawn(sheet_list::watch(
            page.clone(),
            url,
            kind,
            cmd_tx,
            config.poll_interval,
            config.poll_ceiling,
        )),
        Strategy::ImportProbePoll => tokio::spawn(import_probe::watch(
            page.clone(),
            node,
            url,
            kind,
            cmd_tx,
            config.poll_interval,
            config.poll_ceiling,
        )),
    }
}
