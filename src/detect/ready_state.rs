//! Readiness-transition detection for legacy script nodes.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::sync::mpsc;

use crate::engine::events::LoaderCommand;
use crate::engine::queue::ResourceKind;
use crate::page::{NodeId, PageEvent};

/// Wait for the node to reach a settled readiness value, then finish.
///
/// `delay`, when set, is slept through before finishing. One engine
/// generation reports `loaded` before the script has actually executed, and
/// a short wait is the documented workaround.
pub(crate) async fn watch(
    mut events: broadcast::Receiver<PageEvent>,
    node: NodeId,
    kind: ResourceKind,
    cmd_tx: mpsc::Sender<LoaderCommand>,
    delay: Option<Duration>,
) {
    loop {
        match events.recv().await {
            Ok(PageEvent::ReadyState { node: n, state }) if n == node && state.is_settled() => {
                break;
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let _ = cmd_tx.send(LoaderCommand::Finish { kind }).await;
}
