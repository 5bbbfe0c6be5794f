use tokio::sync::{broadcast, mpsc, oneshot};

use crate::engine::events::{LoaderCommand, LoaderEvent};
use crate::engine::queue::{BatchCallback, Payload, ResourceKind, StyleEntry};
use crate::errors::LoaderError;

/// Cloneable front-end to a running [`LoaderEngine`](crate::LoaderEngine).
///
/// All operations are routed through the engine's command loop, so handles
/// can be shared freely; requests from every holder interleave in one FIFO
/// per resource kind.
#[derive(Clone)]
pub struct LoaderHandle {
    cmd_tx: mpsc::Sender<LoaderCommand>,
    event_tx: broadcast::Sender<LoaderEvent>,
}

impl std::fmt::Debug for LoaderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderHandle")
            .field("cmd_tx", &self.cmd_tx)
            .finish_non_exhaustive()
    }
}

impl LoaderHandle {
    pub(crate) fn new(
        cmd_tx: mpsc::Sender<LoaderCommand>,
        event_tx: broadcast::Sender<LoaderEvent>,
    ) -> Self {
        Self { cmd_tx, event_tx }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<LoaderEvent> {
        self.event_tx.subscribe()
    }

    async fn send(&self, cmd: LoaderCommand) -> Result<(), LoaderError> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| LoaderError::ChannelClosed)
    }

    /// Request a group of stylesheets. They load in parallel and `callback`
    /// runs once after all of them have finished, receiving `payload`.
    pub async fn load_styles(
        &self,
        entries: Vec<StyleEntry>,
        callback: Option<BatchCallback>,
        payload: Option<Payload>,
    ) -> Result<(), LoaderError> {
        self.send(LoaderCommand::LoadStyles {
            entries,
            callback,
            payload,
        })
        .await
    }

    /// Request a group of scripts. Where the environment preserves execution
    /// order they load in parallel; otherwise they are loaded one at a time,
    /// and `callback` runs after the last one.
    pub async fn load_scripts(
        &self,
        urls: Vec<String>,
        callback: Option<BatchCallback>,
        payload: Option<Payload>,
    ) -> Result<(), LoaderError> {
        self.send(LoaderCommand::LoadScripts {
            urls,
            callback,
            payload,
        })
        .await
    }

    /// Request a single script.
    pub async fn load_script(
        &self,
        url: &str,
        callback: Option<BatchCallback>,
        payload: Option<Payload>,
    ) -> Result<(), LoaderError> {
        self.load_scripts(vec![url.to_string()], callback, payload)
            .await
    }

    /// Is a batch of `kind` currently in flight?
    pub async fn pending(&self, kind: ResourceKind) -> Result<bool, LoaderError> {
        let (tx, rx) = oneshot::channel();
        self.send(LoaderCommand::QueryPending { kind, reply: tx })
            .await?;
        rx.await.map_err(|_| LoaderError::ReplyDropped)
    }

    /// Stop the engine's command loop.
    pub async fn shutdown(&self) -> Result<(), LoaderError> {
        let (tx, rx) = oneshot::channel();
        self.send(LoaderCommand::Shutdown { reply: tx }).await?;
        rx.await.map_err(|_| LoaderError::ReplyDropped)?
    }
}
