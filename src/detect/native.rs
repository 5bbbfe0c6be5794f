//! Native load/error detection.

use tokio::sync::broadcast;
use tokio::sync::mpsc;

use crate::engine::events::LoaderCommand;
use crate::engine::queue::ResourceKind;
use crate::page::{NodeId, PageEvent};

/// Wait for the node's load or error event, then finish.
///
/// A failed load finishes the same way as a successful one. This layer
/// guarantees forward progress, not success verification.
pub(crate) async fn watch(
    mut events: broadcast::Receiver<PageEvent>,
    node: NodeId,
    kind: ResourceKind,
    cmd_tx: mpsc::Sender<LoaderCommand>,
) {
    loop {
        match events.recv().await {
            Ok(PageEvent::NodeLoaded { node: n } | PageEvent::NodeFailed { node: n })
                if n == node =>
            {
                break;
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(_)) => {}
            // Page event feed is gone; finish so the queue keeps moving.
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }

    let _ = cmd_tx.send(LoaderCommand::Finish { kind }).await;
}
