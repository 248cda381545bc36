use std::fmt::Display;
use std::sync::Arc;

use axum::extract::ws::Message;
use futures::{Sink, SinkExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::{AppError, AppResult, HandshakeError};

/// Identity of one live connection; member ids are not unique, connections are
pub type ConnectionId = Uuid;

/// The send side of a party member's transport
///
/// Reading is left to the session that owns the socket; the registry only ever
/// needs to push text out.
#[async_trait::async_trait]
pub trait PartyConnection: Send + Sync {
    fn id(&self) -> ConnectionId;

    /// Transport-level acceptance, run before the connection joins a party
    async fn accept(&self) -> Result<(), HandshakeError>;

    async fn send_text(&self, text: &str) -> AppResult<()>;

    fn is_closed(&self) -> bool;
}

/// Connection whose socket writes are performed by a dedicated writer task
///
/// Sends only enqueue, so broadcasting to a slow peer never stalls the sender.
pub struct ChannelConnection {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<Message>,
}

impl ChannelConnection {
    /// Spawns a writer task that drains queued messages into `sink`.
    ///
    /// The task ends once every handle to the connection is dropped or the sink
    /// rejects a write.
    pub fn spawn<S>(mut sink: S) -> (Arc<Self>, JoinHandle<()>)
    where
        S: Sink<Message> + Unpin + Send + 'static,
        S::Error: Display,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
        let id = Uuid::new_v4();

        let writer = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                if let Err(e) = sink.send(message).await {
                    tracing::debug!(connection = %id, error = %e, "Socket write failed, stopping writer");
                    break;
                }
            }
            let _ = sink.close().await;
        });

        (Arc::new(Self { id, tx }), writer)
    }
}

#[async_trait::async_trait]
impl PartyConnection for ChannelConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn accept(&self) -> Result<(), HandshakeError> {
        // The HTTP upgrade already completed; all that can still fail is a
        // writer that died before the join.
        if self.tx.is_closed() {
            return Err(HandshakeError::Closed);
        }
        Ok(())
    }

    async fn send_text(&self, text: &str) -> AppResult<()> {
        self.tx
            .send(Message::Text(text.to_string()))
            .map_err(|_| AppError::Internal(format!("connection {} is closed", self.id)))
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
