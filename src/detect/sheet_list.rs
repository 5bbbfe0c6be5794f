//! Stylesheet-list polling.
//!
//! Some engines expose no load signal at all for injected stylesheets but do
//! maintain a queryable list of the sheets they have loaded. Scanning that
//! list on a timer trades a small fixed latency for a completion signal those
//! engines otherwise never deliver.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::engine::events::LoaderCommand;
use crate::engine::queue::ResourceKind;
use crate::page::Page;

/// Scan the page's stylesheet list for `url` until it appears or the attempt
/// ceiling is reached.
///
/// Hitting the ceiling is stall prevention, not a success signal. It may also
/// mean the node was removed before it could load; the two cases are not
/// distinguishable from here, and the batch finishes either way.
pub(crate) async fn watch(
    page: Arc<dyn Page>,
    url: String,
    kind: ResourceKind,
    cmd_tx: mpsc::Sender<LoaderCommand>,
    interval: Duration,
    ceiling: u32,
) {
    let mut attempts: u32 = 0;

    let stalled = loop {
        if page.style_sheets().iter().any(|href| href == &url) {
            break false;
        }

        attempts += 1;
        if attempts >= ceiling {
            break true;
        }
        tokio::time::sleep(interval).await;
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

    const INTERVAL: Duration = Duration::from_millis(50);
    const CEILING: u32 = 200;

    fn spawn_watch(
        page: &Arc<InMemoryPage>,
        url: &str,
    ) -> mpsc::Receiver<LoaderCommand> {
        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(watch(
            page.clone() as Arc<dyn Page>,
            url.to_string(),
            ResourceKind::Style,
            tx,
            INTERVAL,
            CEILING,
        ));
        rx
    }

    #[tokio::test(start_paused = true)]
    async fn finishes_when_the_sheet_appears() {
        let page = Arc::new(InMemoryPage::new("TestAgent/1.0"));
        let mut rx = spawn_watch(&page, "http://localhost/a.css");

        // A few empty scans first.
        tokio::time::sleep(Duration::from_millis(120)).await;
        page.add_style_sheet("a.css");

        match rx.recv().await {
            Some(LoaderCommand::Finish { kind }) => assert_eq!(kind, ResourceKind::Style),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn only_resolved_urls_match() {
        let page = Arc::new(InMemoryPage::new("TestAgent/1.0"));
        let mut rx = spawn_watch(&page, "http://localhost/a.css");

        // An unrelated sheet does not end the watch.
        page.add_style_sheet("other.css");
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(rx.try_recv().is_err());

        page.add_style_sheet("a.css");
        assert!(matches!(
            rx.recv().await,
            Some(LoaderCommand::Finish { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn force_finishes_at_the_ceiling() {
        let page = Arc::new(InMemoryPage::new("TestAgent/1.0"));
        let started = tokio::time::Instant::now();
        let mut rx = spawn_watch(&page, "http://localhost/never.css");

        match rx.recv().await {
            Some(LoaderCommand::Stalled { url, .. }) => {
                assert_eq!(url, "http://localhost/never.css");
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(matches!(
            rx.recv().await,
            Some(LoaderCommand::Finish { .. })
        ));

        // Bounded by ceiling attempts at the poll interval.
        assert!(started.elapsed() <= INTERVAL * CEILING);
    }
}
