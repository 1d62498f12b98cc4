// Shared bootstrap that starts one town server per integration test binary.
#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use town_protocol::{ClientMessage, JoinPayload, ServerMessage};

pub type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

// Base URL published once the server thread has bound its port.
static SERVER_URL: OnceLock<String> = OnceLock::new();
static SERVER_READY: OnceLock<()> = OnceLock::new();

/// Ensures the test server is running and returns its base URL.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published_url = Arc::new(OnceLock::<String>::new());
        let published_url_thread = Arc::clone(&published_url);
        // A dedicated OS thread keeps the server alive across `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_url_thread.set(format!("http://{addr}"));
                town_server::run(listener).await.expect("server failed");
            });
        });
        wait_for_server_url_and_readiness(published_url);
    });

    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

fn wait_for_server_url_and_readiness(published_url: Arc<OnceLock<String>>) {
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };
    let _ = SERVER_URL.set(base_url.clone());

    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");
    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("server did not become ready in time");
}

/// Opens a websocket, joins under `display_name` and returns the socket plus the assigned id.
pub async fn connect_player(display_name: &str) -> (Socket, String) {
    let base_url = ensure_server();
    let ws_url = format!("{}/ws", base_url.replacen("http://", "ws://", 1));
    let (mut socket, _response) = connect_async(ws_url).await.expect("websocket connect");

    send(
        &mut socket,
        &ClientMessage::Join(JoinPayload {
            display_name: display_name.to_string(),
        }),
    )
    .await;

    let player_id = match next_message(&mut socket).await {
        ServerMessage::Identity { player_id } => player_id,
        other => panic!("expected identity, got {other:?}"),
    };
    (socket, player_id)
}

pub async fn send(socket: &mut Socket, msg: &ClientMessage) {
    let json = serde_json::to_string(msg).expect("serialize client message");
    socket
        .send(Message::Text(json.into()))
        .await
        .expect("send client message");
}

/// Next server message, skipping control frames.
pub async fn next_message(socket: &mut Socket) -> ServerMessage {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("server message within timeout")
            .expect("socket open")
            .expect("websocket frame");
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).expect("parse server message");
        }
    }
}

/// Reads messages until one satisfies `predicate`.
pub async fn read_until<F>(socket: &mut Socket, mut predicate: F) -> ServerMessage
where
    F: FnMut(&ServerMessage) -> bool,
{
    loop {
        let msg = next_message(socket).await;
        if predicate(&msg) {
            return msg;
        }
    }
}
