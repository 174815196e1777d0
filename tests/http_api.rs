//! REST endpoint tests.

use std::time::Duration;

use serde_json::{json, Value};
use tictactoe_server::config::ServerConfig;

mod common;

#[tokio::test]
async fn test_home_returns_greeting() {
    let server = common::start_server(ServerConfig::default()).await;
    let client = common::http_client();

    let res = client.get(server.url("/")).send().await.expect("server unreachable");
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), "Hey there!");

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_create_join_and_status() {
    let server = common::start_server(ServerConfig::default()).await;
    let client = common::http_client();

    let room_id = common::create_room(&client, &server).await;
    assert_eq!(room_id.len(), 6);
    assert!(room_id.chars().all(|c| c.is_ascii_alphanumeric()));

    let alice = common::join(&client, &server, &room_id, "alice").await;
    assert!(alice.success);
    assert_eq!(alice.websocket_redirect, format!("/ws/{}", room_id));
    assert_eq!(alice.token.len(), 43);

    let status: Value = client
        .get(server.url(&format!("/rooms/{}", room_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["status"], "waiting");
    assert_eq!(status["players"], json!(["alice"]));

    let bob = common::join(&client, &server, &room_id, "bob").await;
    assert_ne!(alice.token, bob.token);

    let status: Value = client
        .get(server.url(&format!("/rooms/{}", room_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["success"], true);
    assert_eq!(status["status"], "playing");
    assert_eq!(status["current_turn"], "alice");
    assert_eq!(status["winner"], "");

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_join_failures() {
    let server = common::start_server(ServerConfig::default()).await;
    let client = common::http_client();
    let room_id = common::create_room(&client, &server).await;

    let cases = [
        ("nope42", "alice", 404u16),
        (room_id.as_str(), "al,ice", 400),
        (room_id.as_str(), "", 400),
    ];
    for (room, name, expected) in cases {
        let res = client
            .post(server.url("/rooms/join"))
            .json(&json!({ "room_id": room, "player_name": name }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), expected, "joining {} as {:?}", room, name);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
    }

    common::join(&client, &server, &room_id, "alice").await;
    let dup = client
        .post(server.url("/rooms/join"))
        .json(&json!({ "room_id": room_id, "player_name": "alice" }))
        .send()
        .await
        .unwrap();
    assert_eq!(dup.status(), 409);

    common::join(&client, &server, &room_id, "bob").await;
    let full = client
        .post(server.url("/rooms/join"))
        .json(&json!({ "room_id": room_id, "player_name": "carol" }))
        .send()
        .await
        .unwrap();
    assert_eq!(full.status(), 409);
    let body: Value = full.json().await.unwrap();
    assert_eq!(body["message"], "this room is already full");

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_join_rejects_malformed_body() {
    let server = common::start_server(ServerConfig::default()).await;
    let client = common::http_client();
    let room_id = common::create_room(&client, &server).await;

    let bodies = [
        json!({ "room_id": room_id }),
        json!({ "room_id": room_id, "player_name": 5 }),
    ];
    for body in bodies {
        let res = client
            .post(server.url("/rooms/join"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400, "body {}", body);
        let reply: Value = res.json().await.unwrap();
        assert_eq!(reply["success"], false);
        assert!(reply["message"].as_str().is_some_and(|m| !m.is_empty()));
    }

    let res = client
        .post(server.url("/rooms/join"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    // Unknown room wins over a bad name.
    let res = client
        .post(server.url("/rooms/join"))
        .json(&json!({ "room_id": "nope42", "player_name": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_rematch_vote_rejections() {
    let server = common::start_server(ServerConfig::default()).await;
    let client = common::http_client();
    let room_id = common::create_room(&client, &server).await;
    let alice = common::join(&client, &server, &room_id, "alice").await;
    let url = server.url(&format!("/rooms/{}/rematch", room_id));

    let res = client
        .post(&url)
        .json(&json!({ "token": "bogus", "vote": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);

    // No game has finished yet.
    let res = client
        .post(&url)
        .json(&json!({ "token": alice.token, "vote": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 409);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);

    let res = client
        .post(server.url("/rooms/nope42/rematch"))
        .json(&json!({ "token": alice.token, "vote": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_unknown_room_status_is_404() {
    let server = common::start_server(ServerConfig::default()).await;
    let client = common::http_client();

    let res = client.get(server.url("/rooms/zzzzzz")).send().await.unwrap();
    assert_eq!(res.status(), 404);

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_expired_rooms_are_swept() {
    let mut config = ServerConfig::default();
    config.rooms.room_ttl_secs = 1;
    config.rooms.sweep_interval_secs = 1;
    let server = common::start_server(config).await;
    let client = common::http_client();

    let room_id = common::create_room(&client, &server).await;
    assert_eq!(server.registry.len(), 1);

    tokio::time::sleep(Duration::from_millis(2500)).await;

    let res = client
        .get(server.url(&format!("/rooms/{}", room_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    assert!(server.registry.is_empty());

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_shutdown_stops_server() {
    let server = common::start_server(ServerConfig::default()).await;
    let client = common::http_client();
    let res = client.get(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    drop(client);

    server.shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server should stop after shutdown")
        .unwrap();
    assert!(result.is_ok());
}
