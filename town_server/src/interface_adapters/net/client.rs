use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::rng::rand_id;
use crate::use_cases::{DispatchError, TownRegistry};

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::broadcast;
use tokio::time::timeout;
use town_protocol::{
    AreaSnapshot, ClientMessage, CommandEnvelope, CommandResponse, PlayerId, ServerMessage,
};
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    TownUpdatesClosed,
    JoinRequired,
    JoinTimeout,
    ClosedBeforeJoin,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

enum LoopControl {
    Continue,
    Disconnect,
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;
const MAX_DISPLAY_NAME_LEN: usize = 32;
const JOIN_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Serializes every area change once and shares the bytes with all connections.
pub async fn town_update_serializer(
    mut snapshots_rx: broadcast::Receiver<AreaSnapshot>,
    town_bytes_tx: broadcast::Sender<Utf8Bytes>,
) {
    loop {
        match snapshots_rx.recv().await {
            Ok(snapshot) => {
                let msg = ServerMessage::AreaUpdated(snapshot);
                let txt = match serde_json::to_string(&msg) {
                    Ok(txt) => txt,
                    Err(e) => {
                        error!(error = ?e, "failed to serialize area update");
                        continue;
                    }
                };
                let _ = town_bytes_tx.send(Utf8Bytes::from(txt));
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                // Connections resync from full snapshots when they lag themselves.
                warn!(missed = n, "town serializer lagged; skipping ahead");
            }
            Err(broadcast::error::RecvError::Closed) => {
                warn!("town updates channel closed; serializer exiting");
                break;
            }
        }
    }
}

pub fn spawn_town_serializer(state: &AppState) {
    tokio::spawn(town_update_serializer(
        state.town.subscribe(),
        state.town_bytes_tx.clone(),
    ));
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        // Separate connection id for correlating logs before/after a player_id exists.
        let span = info_span!("conn", conn_id = rand_id(), player_id = tracing::field::Empty);
        handle_socket(socket, state).instrument(span)
    })
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let mut ctx = match bootstrap_connection(&mut socket, &state).await {
        Ok(ctx) => ctx,
        Err(NetError::ClosedBeforeJoin) => {
            info!("client disconnected before join handshake");
            return;
        }
        Err(e) => {
            error!(error = ?e, "failed to bootstrap connection");
            let _ = socket.close().await;
            return;
        }
    };

    tracing::Span::current().record("player_id", ctx.player_id.as_str());
    info!(display_name = %ctx.display_name, "client connected");

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }

    ctx.town.player_disconnected(&ctx.player_id).await;
    info!(
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        bytes_in = ctx.bytes_in,
        bytes_out = ctx.bytes_out,
        invalid_json = ctx.invalid_json,
        lag_recoveries = ctx.lag_recovery_count,
        "client disconnected"
    );
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

async fn send_close_with_reason(
    socket: &mut WebSocket,
    code: u16,
    reason: &'static str,
) -> Result<(), NetError> {
    socket
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
        .await
        .map_err(NetError::Ws)?;
    socket.close().await.map_err(NetError::Ws)
}

struct ConnCtx {
    player_id: PlayerId,
    display_name: String,
    town: Arc<TownRegistry>,
    town_bytes_rx: broadcast::Receiver<Utf8Bytes>,
    // Count lag recovery snapshots sent to this client.
    lag_recovery_count: u64,

    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,

    invalid_json: u32,

    last_town_lag_log: Instant,
    last_invalid_input_log: Instant,

    close_frame: Option<CloseFrame>,
}

impl ConnCtx {
    async fn send(&mut self, socket: &mut WebSocket, msg: &ServerMessage) -> LoopControl {
        match send_message(socket, msg).await {
            Ok(bytes) => {
                self.msgs_out += 1;
                self.bytes_out += bytes as u64;
                LoopControl::Continue
            }
            Err(err) => {
                warn!(error = ?err, "failed to send message");
                LoopControl::Disconnect
            }
        }
    }
}

async fn bootstrap_connection(
    socket: &mut WebSocket,
    state: &AppState,
) -> Result<ConnCtx, NetError> {
    // Subscribe before the handshake awaits so no area update is missed.
    let town_bytes_rx = state.town_bytes_tx.subscribe();

    let (display_name, bytes_in) =
        match timeout(JOIN_HANDSHAKE_TIMEOUT, read_join_handshake(socket)).await {
            Ok(result) => result?,
            Err(_) => {
                let _ = send_close_with_reason(socket, close_code::POLICY, "join timeout").await;
                return Err(NetError::JoinTimeout);
            }
        };

    let player = state.town.register_player(&display_name);

    let mut ctx = ConnCtx {
        player_id: player.id,
        display_name: player.display_name,
        town: state.town.clone(),
        town_bytes_rx,
        lag_recovery_count: 0,
        msgs_in: 1,
        msgs_out: 0,
        bytes_in,
        bytes_out: 0,
        invalid_json: 0,
        last_town_lag_log: Instant::now() - LOG_THROTTLE,
        last_invalid_input_log: Instant::now() - LOG_THROTTLE,
        close_frame: None,
    };

    // Tell the client who it is, then what the town looks like.
    let identity = ServerMessage::Identity {
        player_id: ctx.player_id.clone(),
    };
    let town = ServerMessage::Town {
        areas: state.town.snapshots().await,
    };
    for msg in [identity, town] {
        if let LoopControl::Disconnect = ctx.send(socket, &msg).await {
            state.town.player_disconnected(&ctx.player_id).await;
            return Err(NetError::ClosedBeforeJoin);
        }
    }

    Ok(ctx)
}

async fn read_join_handshake(socket: &mut WebSocket) -> Result<(String, u64), NetError> {
    loop {
        let Some(incoming) = socket.recv().await else {
            return Err(NetError::ClosedBeforeJoin);
        };

        match incoming.map_err(NetError::Ws)? {
            Message::Text(text) => {
                let payload = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Join(payload)) => payload,
                    Ok(_) => {
                        let _ = send_close_with_reason(socket, close_code::POLICY, "join required")
                            .await;
                        return Err(NetError::JoinRequired);
                    }
                    Err(_) => {
                        let _ = send_close_with_reason(
                            socket,
                            close_code::POLICY,
                            "invalid join payload",
                        )
                        .await;
                        return Err(NetError::JoinRequired);
                    }
                };

                let display_name = payload.display_name.trim();
                if display_name.is_empty() || display_name.chars().count() > MAX_DISPLAY_NAME_LEN {
                    let _ =
                        send_close_with_reason(socket, close_code::POLICY, "invalid display name")
                            .await;
                    return Err(NetError::JoinRequired);
                }
                return Ok((display_name.to_string(), text.len() as u64));
            }
            Message::Binary(_) => {
                let _ = send_close_with_reason(
                    socket,
                    close_code::UNSUPPORTED,
                    "binary messages not supported",
                )
                .await;
                return Err(NetError::JoinRequired);
            }
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(_) => return Err(NetError::ClosedBeforeJoin),
        }
    }
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let mut fatal: Option<NetError> = None;

    loop {
        let control = tokio::select! {
            incoming = socket.recv() => {
                match handle_incoming_ws(socket, incoming, ctx).await {
                    Ok(control) => control,
                    Err(e) => {
                        fatal = Some(e);
                        LoopControl::Disconnect
                    }
                }
            }

            town_msg = ctx.town_bytes_rx.recv() => {
                match town_msg {
                    Ok(bytes) => forward_town_bytes(bytes, socket, ctx).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        if should_log(&mut ctx.last_town_lag_log) {
                            warn!(missed = n, "town updates lagged; sending full snapshot");
                        }
                        // Resync strategy: send every area's latest snapshot.
                        ctx.lag_recovery_count += 1;
                        let msg = ServerMessage::Town {
                            areas: ctx.town.snapshots().await,
                        };
                        ctx.send(socket, &msg).await
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        fatal = Some(NetError::TownUpdatesClosed);
                        LoopControl::Disconnect
                    }
                }
            }
        };

        if let LoopControl::Disconnect = control {
            if let Some(frame) = ctx.close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

async fn handle_incoming_ws(
    socket: &mut WebSocket,
    incoming: Option<Result<Message, Error>>,
    ctx: &mut ConnCtx,
) -> Result<LoopControl, NetError> {
    let msg = match incoming {
        Some(Ok(msg)) => msg,
        Some(Err(e)) => {
            warn!(error = %e, "websocket recv error");
            return Ok(LoopControl::Disconnect);
        }
        None => {
            info!("websocket closed");
            return Ok(LoopControl::Disconnect);
        }
    };

    let text = match msg {
        Message::Text(text) => text,
        Message::Binary(_) => {
            ctx.close_frame = Some(CloseFrame {
                code: close_code::UNSUPPORTED,
                reason: "binary messages not supported".into(),
            });
            return Ok(LoopControl::Disconnect);
        }
        Message::Ping(_) | Message::Pong(_) => return Ok(LoopControl::Continue),
        Message::Close(_) => return Ok(LoopControl::Disconnect),
    };

    ctx.msgs_in += 1;
    ctx.bytes_in += text.len() as u64;

    let parsed = match serde_json::from_str::<ClientMessage>(&text) {
        Ok(parsed) => parsed,
        Err(parse_err) => {
            ctx.invalid_json += 1;
            if should_log(&mut ctx.last_invalid_input_log) {
                warn!(bytes = text.len(), error = %parse_err, "failed to parse client message");
            }
            if ctx.invalid_json > MAX_INVALID_JSON {
                ctx.close_frame = Some(CloseFrame {
                    code: close_code::POLICY,
                    reason: "too many invalid messages".into(),
                });
                return Ok(LoopControl::Disconnect);
            }
            return Ok(LoopControl::Continue);
        }
    };

    match parsed {
        ClientMessage::Join(_) => {
            // Repeated Join packets after bootstrap are ignored to keep the identity stable.
            if should_log(&mut ctx.last_invalid_input_log) {
                warn!("duplicate join ignored");
            }
            Ok(LoopControl::Continue)
        }
        ClientMessage::EnterArea { area_id } => {
            match ctx.town.get_area(&area_id).await {
                Some(area) => {
                    if let Err(err) = area.enter(&ctx.player_id).await {
                        warn!(area_id = %area_id, error = %err, "enter area failed");
                    }
                }
                None => debug!(area_id = %area_id, "enter for unknown area ignored"),
            }
            Ok(LoopControl::Continue)
        }
        ClientMessage::ExitArea { area_id } => {
            if let Some(area) = ctx.town.get_area(&area_id).await {
                if let Err(err) = area.exit(&ctx.player_id).await {
                    warn!(area_id = %area_id, error = %err, "exit area failed");
                }
            }
            Ok(LoopControl::Continue)
        }
        ClientMessage::Command(envelope) => {
            let response = dispatch_command(&ctx.town, &ctx.player_id, envelope).await;
            Ok(ctx
                .send(socket, &ServerMessage::CommandResponse(response))
                .await)
        }
    }
}

async fn dispatch_command(
    town: &TownRegistry,
    player_id: &str,
    envelope: CommandEnvelope,
) -> CommandResponse {
    let CommandEnvelope {
        command_id,
        area_id,
        command,
    } = envelope;
    let command_name = command.name();

    let result = match town.get_area(&area_id).await {
        Some(area) => area.command(player_id, command).await,
        None => Err(DispatchError::UnknownArea),
    };

    match result {
        Ok(payload) => CommandResponse {
            command_id,
            area_id,
            error: None,
            payload,
        },
        Err(err) => {
            debug!(command_id, area_id = %area_id, command = command_name, error = %err, "command failed");
            CommandResponse {
                command_id,
                area_id,
                error: Some(err.to_string()),
                payload: None,
            }
        }
    }
}

async fn forward_town_bytes(bytes: Utf8Bytes, socket: &mut WebSocket, ctx: &mut ConnCtx) -> LoopControl {
    let bytes_len = bytes.len();
    match socket.send(Message::Text(bytes)).await.map_err(NetError::Ws) {
        Ok(()) => {
            ctx.msgs_out += 1;
            ctx.bytes_out += bytes_len as u64;
            LoopControl::Continue
        }
        Err(err) => {
            warn!(error = ?err, "failed to send area update");
            LoopControl::Disconnect
        }
    }
}
