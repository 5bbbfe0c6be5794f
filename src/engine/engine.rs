use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::config::LoaderConfig;
use crate::detect;
use crate::engine::events::{LoaderCommand, LoaderEvent};
use crate::engine::handle::LoaderHandle;
use crate::engine::inject;
use crate::engine::queue::{BatchCallback, LoadBatch, Payload, PerKind, ResourceKind, StyleEntry};
use crate::engine::DEFAULT_CHANNEL_CAPACITY;
use crate::env::CapabilityProfile;
use crate::page::Page;

/// Resource loading engine for one hosting page.
///
/// Owns the per-kind request queues and pending slots and runs them from a
/// single command loop, so no external synchronization is needed. Callers
/// wanting isolation instantiate separate engines; all handles to one engine
/// share its per-kind FIFOs.
pub struct LoaderEngine {
    page: Arc<dyn Page>,
    config: LoaderConfig,
    /// Capability profile, detected on the first load command and cached for
    /// the engine's lifetime.
    env: Option<CapabilityProfile>,
    /// Queued batches per resource kind. FIFO.
    queue: PerKind<VecDeque<LoadBatch>>,
    /// At most one batch of each kind is in flight.
    pending: PerKind<Option<PendingBatch>>,
    /// Command sender (cloned into handles and detection watchers).
    cmd_tx: mpsc::Sender<LoaderCommand>,
    /// Command receiver (owned by the run loop).
    cmd_rx: mpsc::Receiver<LoaderCommand>,
    /// Event sender.
    event_tx: broadcast::Sender<LoaderEvent>,
}

/// A promoted batch plus the watcher tasks observing its nodes.
struct PendingBatch {
    batch: LoadBatch,
    /// Aborted when the batch completes.
    watchers: Vec<JoinHandle<()>>,
}

impl LoaderEngine {
    /// Create a new engine for `page`.
    ///
    /// If `config` is `None`, [`LoaderConfig::default`] is used.
    pub fn new(page: Arc<dyn Page>, config: Option<LoaderConfig>) -> Self {
        let config = config.unwrap_or_default();

        // Command channel shared by handles and detection watchers.
        let (cmd_tx, cmd_rx) = mpsc::channel::<LoaderCommand>(config.channel_capacity);

        // Broadcast event bus. Subscribe through a handle to observe progress.
        let (event_tx, _first_rx) =
            broadcast::channel::<LoaderEvent>(DEFAULT_CHANNEL_CAPACITY);

        Self {
            page,
            config,
            env: None,
            queue: PerKind::default(),
            pending: PerKind::default(),
            cmd_tx,
            cmd_rx,
            event_tx,
        }
    }

    /// Spawn the command loop, returning a handle and the join handle.
    pub fn start(self) -> (LoaderHandle, JoinHandle<()>) {
        let handle = LoaderHandle::new(self.cmd_tx.clone(), self.event_tx.clone());
        let join_handle = tokio::spawn(self.run());
        (handle, join_handle)
    }

    /// Run the engine's inbound command loop.
    ///
    /// Load requests, watcher completion signals and queries all interleave
    /// here; every queue mutation happens on this task. The loop ends on
    /// [`LoaderCommand::Shutdown`].
    pub async fn run(mut self) {
        let _ = self.event_tx.send(LoaderEvent::EngineStarted);

        while let Some(cmd) = self.cmd_rx.recv().await {
            match cmd {
                LoaderCommand::LoadStyles {
                    entries,
                    callback,
                    payload,
                } => self.enqueue_styles(entries, callback, payload),
                LoaderCommand::LoadScripts {
                    urls,
                    callback,
                    payload,
                } => self.enqueue_scripts(urls, callback, payload),
                LoaderCommand::Finish { kind } => self.finish(kind),
                LoaderCommand::Stalled { kind, url } => {
                    log::warn!("Loader[{kind}]: no completion signal for {url}; finishing anyway");
                    let _ = self
                        .event_tx
                        .send(LoaderEvent::DetectionStalled { kind, url });
                }
                LoaderCommand::QueryPending { kind, reply } => {
                    let _ = reply.send(self.pending.get(kind).is_some());
                }
                LoaderCommand::Shutdown { reply } => {
                    let _ = reply.send(Ok(()));
                    break;
                }
            }
        }

        let _ = self.event_tx.send(LoaderEvent::EngineShutdown);
    }

    /// The memoized capability profile, detecting it on first use.
    fn capabilities(&mut self) -> CapabilityProfile {
        match self.env {
            Some(profile) => profile,
            None => {
                let profile = CapabilityProfile::detect(self.page.as_ref());
                log::debug!("detected capabilities: {profile:?}");
                self.env = Some(profile);
                profile
            }
        }
    }

    fn enqueue_styles(
        &mut self,
        entries: Vec<StyleEntry>,
        mut callback: Option<BatchCallback>,
        payload: Option<Payload>,
    ) {
        let kind = ResourceKind::Style;

        if entries.is_empty() {
            // Nothing to wait for.
            if let Some(callback) = callback.take() {
                callback(payload);
            }
            return;
        }

        // Stylesheets always load in parallel. Rule precedence follows the
        // order of the inserted nodes, not the order the downloads finish.
        let batch = LoadBatch::styles(&entries, callback.take(), payload);
        self.queue.get_mut(kind).push_back(batch);
        let _ = self
            .event_tx
            .send(LoaderEvent::LoadQueued { kind, batches: 1 });
        self.dispatch(kind);
    }

    fn enqueue_scripts(
        &mut self,
        urls: Vec<String>,
        mut callback: Option<BatchCallback>,
        payload: Option<Payload>,
    ) {
        let kind = ResourceKind::Script;

        if urls.is_empty() {
            if let Some(callback) = callback.take() {
                callback(payload);
            }
            return;
        }

        let env = self.capabilities();
        let batches = if env.ordered_parallel_scripts() {
            vec![LoadBatch::scripts(urls, callback.take(), payload)]
        } else {
            // One single-URL batch per script, loaded strictly in turn. The
            // caller's callback rides on the last batch so the group still
            // reports completion once.
            let last = urls.len() - 1;
            urls.into_iter()
                .enumerate()
                .map(|(i, url)| {
                    let cb = if i == last { callback.take() } else { None };
                    LoadBatch::scripts(vec![url], cb, payload.clone())
                })
                .collect()
        };

        let queued = batches.len();
        for batch in batches {
            self.queue.get_mut(kind).push_back(batch);
        }
        let _ = self.event_tx.send(LoaderEvent::LoadQueued {
            kind,
            batches: queued,
        });
        self.dispatch(kind);
    }

    /// Promote the next queued batch of `kind`, if the pending slot is free.
    fn dispatch(&mut self, kind: ResourceKind) {
        if self.pending.get(kind).is_some() {
            // The in-flight batch re-dispatches when it finishes.
            return;
        }
        let env = self.capabilities();
        let Some(batch) = self.queue.get_mut(kind).pop_front() else {
            return;
        };

        let strategy = detect::select(kind, &env);
        let urls: Vec<String> = batch.urls.iter().cloned().collect();
        log::debug!(
            "Loader[{kind}]: dispatching {} resource(s) via {strategy:?}",
            urls.len()
        );

        let mut nodes = Vec::with_capacity(urls.len());
        let mut watchers = Vec::with_capacity(urls.len());

        for url in &urls {
            let css_id = batch.ids.get(url).map(String::as_str);
            let node = self
                .page
                .create_node(inject::node_for_url(kind, &env, url, css_id));

            // List matching works on resolved URLs only.
            let resolved = self.page.resolve_url(url);
            watchers.push(detect::spawn_watcher(
                strategy,
                &self.page,
                node,
                resolved,
                kind,
                self.cmd_tx.clone(),
                &self.config,
            ));
            nodes.push(node);
        }

        // Nodes are appended only after every watcher is attached, so no
        // completion can slip past its observer.
        for node in nodes {
            self.page.append_to_head(node);
        }

        *self.pending.get_mut(kind) = Some(PendingBatch { batch, watchers });
        let _ = self.event_tx.send(LoaderEvent::LoadStarted { kind, urls });
    }

    /// One resource of the pending batch for `kind` finished loading.
    fn finish(&mut self, kind: ResourceKind) {
        let slot = self.pending.get_mut(kind);
        let Some(pending) = slot.as_mut() else {
            // Late detection signals after completion are dropped.
            return;
        };

        pending.batch.urls.pop_front();
        let remaining = pending.batch.urls.len();
        let _ = self
            .event_tx
            .send(LoaderEvent::ResourceFinished { kind, remaining });

        if remaining > 0 {
            return;
        }

        if let Some(mut done) = slot.take() {
            // Stop any watchers still polling for this batch.
            for watcher in done.watchers.drain(..) {
                watcher.abort();
            }
            if let Some(callback) = done.batch.callback.take() {
                callback(done.batch.payload.take());
            }
        }

        let _ = self.event_tx.send(LoaderEvent::BatchFinished { kind });
        self.dispatch(kind);
    }
}
