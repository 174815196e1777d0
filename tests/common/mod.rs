//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use tictactoe_server::config::ServerConfig;
use tictactoe_server::http::response::{CreateRoomResponse, JoinRoomResponse};
use tictactoe_server::http::HttpServer;
use tictactoe_server::lifecycle::{startup, Shutdown};
use tictactoe_server::protocol::ServerEvent;
use tictactoe_server::rooms::RoomRegistry;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// A server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub registry: RoomRegistry,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub async fn start_server(mut config: ServerConfig) -> TestServer {
    config.listener.bind_address = "127.0.0.1:0".into();
    let listener = startup::bind_listener(&config).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config);
    let registry = server.registry().clone();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    TestServer {
        addr,
        shutdown,
        registry,
        handle,
    }
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub async fn create_room(client: &reqwest::Client, server: &TestServer) -> String {
    let res: CreateRoomResponse = client
        .post(server.url("/rooms/create"))
        .send()
        .await
        .expect("server unreachable")
        .json()
        .await
        .unwrap();
    assert!(res.success);
    res.room_id
}

pub async fn join(
    client: &reqwest::Client,
    server: &TestServer,
    room_id: &str,
    player_name: &str,
) -> JoinRoomResponse {
    let res = client
        .post(server.url("/rooms/join"))
        .json(&json!({ "room_id": room_id, "player_name": player_name }))
        .send()
        .await
        .expect("server unreachable");
    assert_eq!(res.status(), 200, "join as {} failed", player_name);
    res.json().await.unwrap()
}

pub async fn connect_ws(server: &TestServer, joined: &JoinRoomResponse) -> WsStream {
    let url = format!(
        "ws://{}{}?token={}",
        server.addr, joined.websocket_redirect, joined.token
    );
    let (ws, _) = tokio_tungstenite::connect_async(url).await.expect("websocket connect");
    ws
}

/// Next JSON event, skipping control frames.
pub async fn recv_event(ws: &mut WsStream) -> ServerEvent {
    loop {
        let msg = tokio::time::timeout(EVENT_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("socket closed")
            .expect("socket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("malformed server event");
        }
    }
}

/// Read events until one matches.
pub async fn recv_until<F>(ws: &mut WsStream, matches: F) -> ServerEvent
where
    F: Fn(&ServerEvent) -> bool,
{
    loop {
        let event = recv_event(ws).await;
        if matches(&event) {
            return event;
        }
    }
}

pub async fn send_move(ws: &mut WsStream, player: &str, position: u8) {
    let frame = json!({
        "type_": "move",
        "data": { "move": { "position": position, "player_name": player } }
    });
    ws.send(Message::text(frame.to_string())).await.unwrap();
}

pub async fn send_raw(ws: &mut WsStream, frame: serde_json::Value) {
    ws.send(Message::text(frame.to_string())).await.unwrap();
}

/// True once the server closes the socket.
pub async fn wait_closed(ws: &mut WsStream) -> bool {
    let closed = async {
        loop {
            match ws.next().await {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => return,
                Some(Ok(_)) => continue,
            }
        }
    };
    tokio::time::timeout(EVENT_TIMEOUT, closed).await.is_ok()
}
