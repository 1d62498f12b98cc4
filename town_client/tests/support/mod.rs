// Boots one town server per test binary and joins controllers to it.
#![allow(dead_code)]

use std::{
    sync::{
        Arc, OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::sync::mpsc;
use town_client::{TownConnection, TownUpdate};

static SERVER_URL: OnceLock<String> = OnceLock::new();
static SERVER_READY: OnceLock<()> = OnceLock::new();

pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

/// Ensures the test server is running and returns its base URL.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published_url = Arc::new(OnceLock::<String>::new());
        let published_url_thread = Arc::clone(&published_url);
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

        let base_url = loop {
            if let Some(url) = published_url.get() {
                break url.clone();
            }
            std::thread::sleep(Duration::from_millis(10));
        };
        let addr = base_url
            .strip_prefix("http://")
            .expect("base url should use http://")
            .to_string();
        let _ = SERVER_URL.set(base_url);

        for _ in 0..100 {
            if std::net::TcpStream::connect(&addr).is_ok() {
                return;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        panic!("server did not become ready in time");
    });

    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

/// Creates a fresh area of `kind` ("Pong", "TargetShooter", ...) and returns its id.
pub async fn create_area(kind: &str) -> String {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    let base_url = ensure_server();
    let area_id = format!("{}-{}", kind.to_lowercase(), NEXT.fetch_add(1, Ordering::Relaxed));

    let res = reqwest::Client::new()
        .post(format!("{base_url}/areas"))
        .json(&serde_json::json!({ "area_id": area_id, "kind": kind }))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    area_id
}

pub async fn connect(display_name: &str) -> (Arc<TownConnection>, mpsc::Receiver<TownUpdate>) {
    let ws_url = format!("{}/ws", ensure_server().replacen("http://", "ws://", 1));
    let (connection, updates_rx) = TownConnection::connect(&ws_url, display_name, COMMAND_TIMEOUT)
        .await
        .expect("join town");
    (Arc::new(connection), updates_rx)
}
