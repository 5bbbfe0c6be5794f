//! Import-probe polling.
//!
//! For engines with no stylesheet list signal at all, the target URL is
//! injected as an `@import` inside a probe style node. The probe's parsed
//! rule list stays inaccessible until the import has loaded, so polling it
//! answers the completion question the engine never will.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::engine::events::LoaderCommand;
use crate::engine::queue::ResourceKind;
use crate::page::{NodeId, Page, RuleProbe};

/// Poll the probe node's rule list until it becomes readable or the attempt
/// ceiling is reached.
///
/// `NotReady` is the expected answer while the import is loading and is the
/// only one that reschedules. `Unavailable` means the page can never answer
/// for this node, so waiting out the ceiling would change nothing.
pub(crate) async fn watch(
    page: Arc<dyn Page>,
    node: NodeId,
    url: String,
    kind: ResourceKind,
    cmd_tx: mpsc::Sender<LoaderCommand>,
    interval: Duration,
    ceiling: u32,
) {
    let mut attempts: u32 = 0;

    let stalled = loop {
        match page.probe_rules(node) {
            RuleProbe::Ready => break false,
            RuleProbe::Unavailable => break true,
            RuleProbe::NotReady => {
                attempts += 1;
                if attempts >= ceiling {
                    break true;
                }
                tokio::time::sleep(interval).await;
            }
        }
    };

    if stalled {
        let _ = cmd_tx.send(LoaderCommand::Stalled { kind, url }).await;
    }
    let _ = cmd_tx.send(LoaderCommand::Finish { kind }).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::in_memory::InMemoryPage;
    use crate::page::{NodeKind, NodeSpec};

    const INTERVAL: Duration = Duration::from_millis(50);
    const CEILING: u32 = 200;

    fn probe_node(page: &InMemoryPage, url: &str) -> NodeId {
        page.create_node(NodeSpec {
            kind: NodeKind::Style,
            attrs: vec![],
            text: Some(format!("@import \"{url}\";")),
        })
    }

    fn spawn_watch(page: &Arc<InMemoryPage>, node: NodeId) -> mpsc::Receiver<LoaderCommand> {
        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(watch(
            page.clone() as Arc<dyn Page>,
            node,
            "a.css".to_string(),
            ResourceKind::Style,
            tx,
            INTERVAL,
            CEILING,
        ));
        rx
    }

    #[tokio::test(start_paused = true)]
    async fn finishes_once_rules_become_readable() {
        let page = Arc::new(InMemoryPage::new("TestAgent/1.0"));
        let node = probe_node(&page, "a.css");
        let mut rx = spawn_watch(&page, node);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(rx.try_recv().is_err());

        page.set_probe(node, RuleProbe::Ready);
        match rx.recv().await {
            Some(LoaderCommand::Finish { kind }) => assert_eq!(kind, ResourceKind::Style),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn force_finishes_at_the_ceiling() {
        let page = Arc::new(InMemoryPage::new("TestAgent/1.0"));
        let node = probe_node(&page, "never.css");
        let started = tokio::time::Instant::now();
        let mut rx = spawn_watch(&page, node);

        assert!(matches!(
            rx.recv().await,
            Some(LoaderCommand::Stalled { .. })
        ));
        assert!(matches!(
            rx.recv().await,
            Some(LoaderCommand::Finish { .. })
        ));
        assert!(started.elapsed() <= INTERVAL * CEILING);
    }

    #[tokio::test(start_paused = true)]
    async fn unavailable_probe_finishes_immediately() {
        let page = Arc::new(InMemoryPage::new("TestAgent/1.0"));
        let node = probe_node(&page, "a.css");
        page.set_probe(node, RuleProbe::Unavailable);

        let started = tokio::time::Instant::now();
        let mut rx = spawn_watch(&page, node);

        assert!(matches!(
            rx.recv().await,
            Some(LoaderCommand::Stalled { .. })
        ));
        assert!(matches!(
            rx.recv().await,
            Some(LoaderCommand::Finish { .. })
        ));
        // No polling rounds were spent waiting for an answer that cannot change.
        assert!(started.elapsed() < INTERVAL);
    }
}
