use crate::domain::{CommandSender, ControllerError};

use async_trait::async_trait;
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::{
    net::TcpStream,
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::timeout,
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, Message},
};
use town_protocol::{
    AreaSnapshot, ClientMessage, CommandEnvelope, CommandPayload, CommandResponse,
    InteractableCommand, JoinPayload, PlayerId, ServerMessage,
};
use tracing::{Instrument, debug, info, info_span, warn};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Waiters = Arc<Mutex<HashMap<u64, oneshot::Sender<CommandResponse>>>>;

const IDENTITY_TIMEOUT: Duration = Duration::from_secs(5);
const OUTGOING_CAPACITY: usize = 64;
const UPDATES_CAPACITY: usize = 256;

#[derive(Debug)]
pub enum ConnectionError {
    Ws(tungstenite::Error),
    Serialization(serde_json::Error),
    IdentityTimeout,
    ClosedBeforeIdentity,
    UnexpectedMessage(&'static str),
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::Ws(err) => write!(f, "websocket error: {err}"),
            ConnectionError::Serialization(err) => write!(f, "message encoding error: {err}"),
            ConnectionError::IdentityTimeout => write!(f, "server did not assign an identity"),
            ConnectionError::ClosedBeforeIdentity => {
                write!(f, "connection closed before an identity was assigned")
            }
            ConnectionError::UnexpectedMessage(kind) => {
                write!(f, "expected identity, got {kind}")
            }
        }
    }
}

impl std::error::Error for ConnectionError {}

/// Area state pushed by the server.
#[derive(Debug, Clone, PartialEq)]
pub enum TownUpdate {
    /// Every area; sent after joining and whenever the server resyncs us.
    Town(Vec<AreaSnapshot>),
    Area(AreaSnapshot),
}

impl TownUpdate {
    pub fn into_snapshots(self) -> Vec<AreaSnapshot> {
        match self {
            TownUpdate::Town(areas) => areas,
            TownUpdate::Area(area) => vec![area],
        }
    }
}

/// A joined websocket session with the town server.
///
/// Commands are correlated with their responses by id; area updates are
/// delivered on the receiver returned by [`TownConnection::connect`].
pub struct TownConnection {
    player_id: PlayerId,
    outgoing_tx: mpsc::Sender<ClientMessage>,
    waiters: Waiters,
    next_command_id: AtomicU64,
    command_timeout: Duration,
    reader: JoinHandle<()>,
}

impl TownConnection {
    pub async fn connect(
        url: &str,
        display_name: &str,
        command_timeout: Duration,
    ) -> Result<(Self, mpsc::Receiver<TownUpdate>), ConnectionError> {
        let (mut socket, _response) = connect_async(url).await.map_err(ConnectionError::Ws)?;

        let join = ClientMessage::Join(JoinPayload {
            display_name: display_name.to_string(),
        });
        send_message(&mut socket, &join).await?;

        let player_id = timeout(IDENTITY_TIMEOUT, read_identity(&mut socket))
            .await
            .map_err(|_| ConnectionError::IdentityTimeout)??;

        let (sink, stream) = socket.split();
        let (outgoing_tx, outgoing_rx) = mpsc::channel(OUTGOING_CAPACITY);
        let (updates_tx, updates_rx) = mpsc::channel(UPDATES_CAPACITY);
        let waiters: Waiters = Arc::new(Mutex::new(HashMap::new()));

        let span = info_span!("town_conn", player_id = %player_id);
        tokio::spawn(write_loop(sink, outgoing_rx).instrument(span.clone()));
        let reader = tokio::spawn(
            read_loop(stream, Arc::clone(&waiters), updates_tx).instrument(span),
        );

        info!(%url, %player_id, "joined town");

        Ok((
            Self {
                player_id,
                outgoing_tx,
                waiters,
                next_command_id: AtomicU64::new(1),
                command_timeout,
                reader,
            },
            updates_rx,
        ))
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub async fn enter_area(&self, area_id: &str) -> Result<(), ControllerError> {
        self.send(ClientMessage::EnterArea {
            area_id: area_id.to_string(),
        })
        .await
    }

    pub async fn exit_area(&self, area_id: &str) -> Result<(), ControllerError> {
        self.send(ClientMessage::ExitArea {
            area_id: area_id.to_string(),
        })
        .await
    }

    async fn send(&self, msg: ClientMessage) -> Result<(), ControllerError> {
        self.outgoing_tx
            .send(msg)
            .await
            .map_err(|_| ControllerError::Transport("connection closed".to_string()))
    }

    fn waiters(&self) -> MutexGuard<'_, HashMap<u64, oneshot::Sender<CommandResponse>>> {
        self.waiters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for TownConnection {
    fn drop(&mut self) {
        // The writer drains and closes once `outgoing_tx` is gone.
        self.reader.abort();
    }
}

#[async_trait]
impl CommandSender for TownConnection {
    async fn send_command(
        &self,
        area_id: &str,
        command: InteractableCommand,
    ) -> Result<Option<CommandPayload>, ControllerError> {
        let command_id = self.next_command_id.fetch_add(1, Ordering::Relaxed);
        let command_name = command.name();
        let (reply_tx, reply_rx) = oneshot::channel();
        self.waiters().insert(command_id, reply_tx);

        let envelope = CommandEnvelope {
            command_id,
            area_id: area_id.to_string(),
            command,
        };
        if let Err(err) = self.send(ClientMessage::Command(envelope)).await {
            self.waiters().remove(&command_id);
            return Err(err);
        }

        let response = match timeout(self.command_timeout, reply_rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => {
                return Err(ControllerError::Transport(
                    "connection closed before the reply".to_string(),
                ));
            }
            Err(_) => {
                self.waiters().remove(&command_id);
                warn!(command_id, %area_id, command = command_name, "command timed out");
                return Err(ControllerError::Timeout);
            }
        };

        match response.error {
            Some(message) => {
                debug!(command_id, %area_id, command = command_name, error = %message, "command rejected");
                Err(ControllerError::Remote(message))
            }
            None => Ok(response.payload),
        }
    }
}

async fn send_message(socket: &mut Socket, msg: &ClientMessage) -> Result<(), ConnectionError> {
    let txt = serde_json::to_string(msg).map_err(ConnectionError::Serialization)?;
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(ConnectionError::Ws)
}

async fn read_identity(socket: &mut Socket) -> Result<PlayerId, ConnectionError> {
    while let Some(frame) = socket.next().await {
        let text = match frame.map_err(ConnectionError::Ws)? {
            Message::Text(text) => text,
            Message::Close(_) => return Err(ConnectionError::ClosedBeforeIdentity),
            _ => continue,
        };
        return match serde_json::from_str::<ServerMessage>(&text)
            .map_err(ConnectionError::Serialization)?
        {
            ServerMessage::Identity { player_id } => Ok(player_id),
            ServerMessage::Town { .. } => Err(ConnectionError::UnexpectedMessage("Town")),
            ServerMessage::AreaUpdated(_) => Err(ConnectionError::UnexpectedMessage("AreaUpdated")),
            ServerMessage::CommandResponse(_) => {
                Err(ConnectionError::UnexpectedMessage("CommandResponse"))
            }
        };
    }
    Err(ConnectionError::ClosedBeforeIdentity)
}

async fn write_loop(mut sink: SplitSink<Socket, Message>, mut outgoing_rx: mpsc::Receiver<ClientMessage>) {
    while let Some(msg) = outgoing_rx.recv().await {
        let txt = match serde_json::to_string(&msg) {
            Ok(txt) => txt,
            Err(err) => {
                warn!(error = %err, "failed to encode client message");
                continue;
            }
        };
        if let Err(err) = sink.send(Message::Text(txt.into())).await {
            warn!(error = %err, "websocket write failed");
            return;
        }
    }
    if let Err(err) = sink.close().await {
        debug!(error = %err, "socket close error");
    }
}

async fn read_loop(
    mut stream: SplitStream<Socket>,
    waiters: Waiters,
    updates_tx: mpsc::Sender<TownUpdate>,
) {
    while let Some(frame) = stream.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(frame)) => {
                info!(?frame, "server closed connection");
                break;
            }
            Ok(_) => continue,
            Err(err) => {
                warn!(error = %err, "websocket read failed");
                break;
            }
        };

        let msg = match serde_json::from_str::<ServerMessage>(&text) {
            Ok(msg) => msg,
            Err(err) => {
                warn!(bytes = text.len(), error = %err, "failed to parse server message");
                continue;
            }
        };

        match msg {
            ServerMessage::CommandResponse(response) => {
                let waiter = waiters
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(&response.command_id);
                match waiter {
                    Some(reply_tx) => {
                        let _ = reply_tx.send(response);
                    }
                    None => debug!(command_id = response.command_id, "late or unknown command response"),
                }
            }
            // A dropped receiver only means nobody mirrors areas; responses still flow.
            ServerMessage::Town { areas } => {
                let _ = updates_tx.send(TownUpdate::Town(areas)).await;
            }
            ServerMessage::AreaUpdated(snapshot) => {
                let _ = updates_tx.send(TownUpdate::Area(snapshot)).await;
            }
            ServerMessage::Identity { .. } => debug!("duplicate identity ignored"),
        }
    }

    // Dropping the senders fails every in-flight command.
    waiters
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
}
