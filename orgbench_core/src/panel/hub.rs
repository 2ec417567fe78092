use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use tokio::sync::{broadcast, mpsc, Mutex};

use super::errors::PanelError;
use super::messages::{HostMessage, PageMessage};

/// What a handler wants the hub to do after a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Keep,
    Close,
}

/// Host-side behavior of one panel. The hub delivers page messages one at
/// a time and runs `detach` exactly once on every exit path, whether the
/// handler closed itself or the panel was disposed from outside.
#[async_trait]
pub trait PanelHandler: Send {
    async fn on_message(&mut self, message: PageMessage, sink: &UpdateSink) -> Control;

    /// Teardown hook. Default: nothing to release.
    async fn detach(&mut self) {}
}

/// Outbound side handed to handlers. Sending never fails from the
/// handler's point of view; a missing subscriber is the subscriber's loss.
pub struct UpdateSink {
    update_tx: broadcast::Sender<HostMessage>,
}

impl UpdateSink {
    pub(crate) fn new(update_tx: broadcast::Sender<HostMessage>) -> Self {
        Self { update_tx }
    }

    pub fn send(&self, message: HostMessage) {
        let _ = self.update_tx.send(message);
    }
}

enum PanelEvent {
    Message(PageMessage),
    Close,
}

/// Per-panel bookkeeping: the running task plus both channel ends the
/// public API needs.
struct PanelIoHandle {
    task: tokio::task::JoinHandle<()>,
    event_tx: mpsc::Sender<PanelEvent>,
    update_tx: broadcast::Sender<HostMessage>,
}

/// Manages open panels.
///
/// A panel is a long-lived exchange between a page side (whatever drives
/// `post`/`subscribe`) and a host-side [`PanelHandler`]. Each open panel
/// owns one task; page messages arrive on an mpsc inbox and host updates
/// fan out over a broadcast channel, so any number of subscribers can
/// watch one panel. Cloning the hub clones an `Arc`, nothing deeper.
#[derive(Clone)]
pub struct PanelHub {
    inner: Arc<Mutex<HashMap<String, PanelIoHandle>>>,
}

impl Default for PanelHub {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelHub {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Open a panel under `id`. If a panel with this id is already open it
    /// is left as is (the existing surface is simply revealed) and
    /// `Ok(false)` is returned; `handler` is dropped.
    pub async fn open(
        &self,
        id: impl Into<String>,
        mut handler: Box<dyn PanelHandler>,
    ) -> Result<bool, PanelError> {
        let id = id.into();
        let mut map = self.inner.lock().await;
        if map.contains_key(&id) {
            debug!("panel '{}' already open; revealing", id);
            return Ok(false);
        }

        // Host -> page fan-out.
        let (update_tx, _) = broadcast::channel::<HostMessage>(64);
        // Page -> host inbox.
        let (event_tx, mut event_rx) = mpsc::channel::<PanelEvent>(32);

        let id_clone = id.clone();
        let sink = UpdateSink::new(update_tx.clone());
        let task = tokio::spawn(async move {
            info!("panel '{}' opened", id_clone);
            while let Some(event) = event_rx.recv().await {
                match event {
                    PanelEvent::Message(message) => {
                        debug!("panel '{}' handling {:?}", id_clone, message_kind(&message));
                        if handler.on_message(message, &sink).await == Control::Close {
                            break;
                        }
                    }
                    PanelEvent::Close => break,
                }
            }
            handler.detach().await;
            sink.send(HostMessage::Closed);
            info!("panel '{}' closed", id_clone);
        });

        map.insert(
            id,
            PanelIoHandle {
                task,
                event_tx,
                update_tx,
            },
        );
        Ok(true)
    }

    /// Deliver a page message to a panel.
    pub async fn post(&self, id: &str, message: PageMessage) -> Result<(), PanelError> {
        let map = self.inner.lock().await;
        let handle = map
            .get(id)
            .ok_or_else(|| PanelError::NoSuchPanel(id.to_string()))?;
        handle
            .event_tx
            .send(PanelEvent::Message(message))
            .await
            .map_err(|_| PanelError::ChannelClosed(id.to_string()))
    }

    /// Subscribe to a panel's host messages.
    pub async fn subscribe(&self, id: &str) -> Option<broadcast::Receiver<HostMessage>> {
        let map = self.inner.lock().await;
        map.get(id).map(|h| h.update_tx.subscribe())
    }

    /// Tear a panel down: signal its task, wait for `detach` to finish,
    /// and forget every subscription. A second dispose is an error.
    pub async fn dispose(&self, id: &str) -> Result<(), PanelError> {
        let mut map = self.inner.lock().await;
        let handle = map
            .remove(id)
            .ok_or_else(|| PanelError::NoSuchPanel(id.to_string()))?;
        // The task may already be gone if the handler closed itself.
        let _ = handle.event_tx.send(PanelEvent::Close).await;
        let _ = handle.task.await;
        Ok(())
    }

    /// Ids of currently open panels.
    pub async fn open_panels(&self) -> Vec<String> {
        let map = self.inner.lock().await;
        map.keys().cloned().collect()
    }
}

fn message_kind(message: &PageMessage) -> &'static str {
    match message {
        PageMessage::Submit { .. } => "submit",
        PageMessage::Cancel => "cancel",
        PageMessage::RunQuery { .. } => "runQuery",
    }
}
