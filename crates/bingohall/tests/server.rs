//! Integration tests for the Bingohall server: registration, game flow,
//! and disconnect handling over real WebSocket connections.

use std::sync::Arc;
use std::time::Duration;

use bingohall::BingohallServer;
use bingohall_game::{GameResult, HistoryEntry, MatchHistory};
use bingohall_protocol::{ClientEvent, PlayerId, RoomCode, ServerEvent};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port and returns the address.
async fn start_server() -> String {
    let (addr, _history) = start_server_with_history().await;
    addr
}

/// Like [`start_server`], but also returns the match history handle.
async fn start_server_with_history() -> (String, Arc<Mutex<MatchHistory>>) {
    let server = BingohallServer::builder()
        .bind("127.0.0.1:0")
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();
    let history = server.history();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    (addr, history)
}

/// Polls the history log until an entry shows up. The recorder runs off
/// the room event stream, so the entry lands shortly after `game-over`.
async fn wait_for_history_entry(history: &Arc<Mutex<MatchHistory>>) -> HistoryEntry {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if let Some(entry) = history.lock().await.entries().next().cloned() {
            return entry;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "history entry never recorded"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, event: &ClientEvent) {
    let text = serde_json::to_string(event).expect("encode");
    ws.send(Message::Text(text.into())).await.expect("send");
}

/// Receives the next server event, failing the test after a timeout.
async fn recv(ws: &mut ClientWs) -> ServerEvent {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("connection closed")
            .expect("websocket error");
        match msg {
            Message::Text(text) => {
                return serde_json::from_str(&text).expect("decode");
            }
            Message::Binary(data) => {
                return serde_json::from_slice(&data).expect("decode");
            }
            _ => continue,
        }
    }
}

/// Receives events until one matches `pred`.
async fn recv_until(
    ws: &mut ClientWs,
    pred: impl Fn(&ServerEvent) -> bool,
) -> ServerEvent {
    loop {
        let event = recv(ws).await;
        if pred(&event) {
            return event;
        }
    }
}

/// Registers as host (server-generated code) and returns the room code.
async fn register_host(ws: &mut ClientWs) -> RoomCode {
    send(ws, &ClientEvent::RegisterHost { room_code: None }).await;
    match recv(ws).await {
        ServerEvent::HostRegistered { room_code } => room_code,
        other => panic!("expected host registration, got {other:?}"),
    }
}

/// Registers as player and returns the assigned id.
async fn register_player(ws: &mut ClientWs, room_code: &RoomCode) -> PlayerId {
    send(
        ws,
        &ClientEvent::RegisterPlayer {
            room_code: room_code.clone(),
        },
    )
    .await;
    match recv(ws).await {
        ServerEvent::Registered { player_id, .. } => player_id,
        other => panic!("expected player registration, got {other:?}"),
    }
}

// =========================================================================
// Registration
// =========================================================================

#[tokio::test]
async fn test_host_registration_returns_generated_code() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let room_code = register_host(&mut ws).await;
    let code: String = room_code.into();
    assert_eq!(code.len(), 4);
    assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
}

#[tokio::test]
async fn test_host_can_request_a_specific_code() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let requested: RoomCode = "GAME".parse().unwrap();
    send(
        &mut ws,
        &ClientEvent::RegisterHost {
            room_code: Some(requested.clone()),
        },
    )
    .await;

    match recv(&mut ws).await {
        ServerEvent::HostRegistered { room_code } => assert_eq!(room_code, requested),
        other => panic!("expected host registration, got {other:?}"),
    }
}

#[tokio::test]
async fn test_second_host_for_same_code_gets_error() {
    let addr = start_server().await;

    let mut ws1 = connect(&addr).await;
    let requested: RoomCode = "AB12".parse().unwrap();
    send(
        &mut ws1,
        &ClientEvent::RegisterHost {
            room_code: Some(requested.clone()),
        },
    )
    .await;
    assert!(matches!(recv(&mut ws1).await, ServerEvent::HostRegistered { .. }));

    let mut ws2 = connect(&addr).await;
    send(
        &mut ws2,
        &ClientEvent::RegisterHost {
            room_code: Some(requested),
        },
    )
    .await;
    match recv(&mut ws2).await {
        ServerEvent::Error { message } => assert!(message.contains("host")),
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_join_unknown_room_gets_error() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(
        &mut ws,
        &ClientEvent::RegisterPlayer {
            room_code: "ZZZZ".parse().unwrap(),
        },
    )
    .await;

    match recv(&mut ws).await {
        ServerEvent::Error { message } => assert!(message.contains("not found")),
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_first_event_must_be_registration() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(&mut ws, &ClientEvent::StartGame).await;

    match recv(&mut ws).await {
        ServerEvent::Error { message } => {
            assert!(message.contains("register"));
        }
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_host_sees_player_counts() {
    let addr = start_server().await;

    let mut host = connect(&addr).await;
    let room_code = register_host(&mut host).await;

    let mut p1 = connect(&addr).await;
    let mut p2 = connect(&addr).await;
    let id1 = register_player(&mut p1, &room_code).await;
    let id2 = register_player(&mut p2, &room_code).await;
    assert_eq!(id1, PlayerId(1));
    assert_eq!(id2, PlayerId(2));

    assert!(matches!(recv(&mut host).await, ServerEvent::PlayerJoined { count: 1 }));
    assert!(matches!(recv(&mut host).await, ServerEvent::PlayerJoined { count: 2 }));
}

// =========================================================================
// Game flow
// =========================================================================

#[tokio::test]
async fn test_full_game_flow_with_winning_claim() {
    let addr = start_server().await;

    let mut host = connect(&addr).await;
    let room_code = register_host(&mut host).await;

    let mut player = connect(&addr).await;
    let player_id = register_player(&mut player, &room_code).await;

    send(&mut host, &ClientEvent::StartGame).await;
    assert!(matches!(
        recv_until(&mut host, |e| matches!(e, ServerEvent::GameStarted)).await,
        ServerEvent::GameStarted
    ));
    assert!(matches!(recv(&mut player).await, ServerEvent::GameStarted));

    // Host draws; both sides see the same number.
    send(&mut host, &ClientEvent::CallNumber).await;
    let host_call =
        recv_until(&mut host, |e| matches!(e, ServerEvent::CallNumber { .. })).await;
    let player_call =
        recv_until(&mut player, |e| matches!(e, ServerEvent::CallNumber { .. })).await;
    match (host_call, player_call) {
        (
            ServerEvent::CallNumber { number: h, .. },
            ServerEvent::CallNumber { number: p, .. },
        ) => {
            assert!((1..=75).contains(&h));
            assert_eq!(h, p);
        }
        other => panic!("expected call events, got {other:?}"),
    }

    send(
        &mut player,
        &ClientEvent::PlayerWin {
            room_code: room_code.clone(),
        },
    )
    .await;

    let host_over =
        recv_until(&mut host, |e| matches!(e, ServerEvent::GameOver { .. })).await;
    let player_over =
        recv_until(&mut player, |e| matches!(e, ServerEvent::GameOver { .. })).await;
    for over in [host_over, player_over] {
        match over {
            ServerEvent::GameOver { winner } => assert_eq!(winner, Some(player_id)),
            other => panic!("expected game over, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_player_cannot_start_or_draw() {
    let addr = start_server().await;

    let mut host = connect(&addr).await;
    let room_code = register_host(&mut host).await;

    let mut player = connect(&addr).await;
    register_player(&mut player, &room_code).await;

    send(&mut player, &ClientEvent::StartGame).await;
    match recv(&mut player).await {
        ServerEvent::Error { message } => assert!(message.contains("host")),
        other => panic!("expected error, got {other:?}"),
    }

    send(&mut player, &ClientEvent::CallNumber).await;
    assert!(matches!(recv(&mut player).await, ServerEvent::Error { .. }));
}

#[tokio::test]
async fn test_draw_before_start_is_rejected() {
    let addr = start_server().await;

    let mut host = connect(&addr).await;
    register_host(&mut host).await;

    send(&mut host, &ClientEvent::CallNumber).await;
    match recv(&mut host).await {
        ServerEvent::Error { message } => assert!(message.contains("invalid transition")),
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_claim_with_mismatched_room_code_is_rejected() {
    let addr = start_server().await;

    let mut host = connect(&addr).await;
    let room_code = register_host(&mut host).await;

    let mut player = connect(&addr).await;
    register_player(&mut player, &room_code).await;

    send(&mut host, &ClientEvent::StartGame).await;
    assert!(matches!(recv(&mut player).await, ServerEvent::GameStarted));

    send(
        &mut player,
        &ClientEvent::PlayerWin {
            room_code: "XXXX".parse().unwrap(),
        },
    )
    .await;

    assert!(matches!(recv(&mut player).await, ServerEvent::Error { .. }));
}

#[tokio::test]
async fn test_late_joiner_receives_called_history() {
    let addr = start_server().await;

    let mut host = connect(&addr).await;
    let room_code = register_host(&mut host).await;

    let mut p1 = connect(&addr).await;
    register_player(&mut p1, &room_code).await;

    send(&mut host, &ClientEvent::StartGame).await;
    let mut called = Vec::new();
    for _ in 0..3 {
        send(&mut host, &ClientEvent::CallNumber).await;
        match recv_until(&mut host, |e| matches!(e, ServerEvent::CallNumber { .. })).await
        {
            ServerEvent::CallNumber { number, .. } => called.push(number),
            _ => unreachable!(),
        }
    }

    let mut p2 = connect(&addr).await;
    register_player(&mut p2, &room_code).await;

    match recv(&mut p2).await {
        ServerEvent::CalledHistory { numbers } => assert_eq!(numbers, called),
        other => panic!("expected called history, got {other:?}"),
    }
}

// =========================================================================
// Disconnects
// =========================================================================

#[tokio::test]
async fn test_host_disconnect_closes_the_room() {
    let addr = start_server().await;

    let mut host = connect(&addr).await;
    let room_code = register_host(&mut host).await;

    let mut player = connect(&addr).await;
    register_player(&mut player, &room_code).await;

    drop(host);

    let closed = recv_until(&mut player, |e| matches!(e, ServerEvent::RoomClosed)).await;
    assert!(matches!(closed, ServerEvent::RoomClosed));

    // The code is free again: a new host can take it.
    let mut host2 = connect(&addr).await;
    send(
        &mut host2,
        &ClientEvent::RegisterHost {
            room_code: Some(room_code),
        },
    )
    .await;
    assert!(matches!(
        recv(&mut host2).await,
        ServerEvent::HostRegistered { .. }
    ));
}

#[tokio::test]
async fn test_player_disconnect_updates_host_count() {
    let addr = start_server().await;

    let mut host = connect(&addr).await;
    let room_code = register_host(&mut host).await;

    let player = connect(&addr).await;
    let mut player = player;
    register_player(&mut player, &room_code).await;
    assert!(matches!(recv(&mut host).await, ServerEvent::PlayerJoined { count: 1 }));

    drop(player);

    assert!(matches!(
        recv_until(&mut host, |e| matches!(e, ServerEvent::PlayerJoined { count: 0 }))
            .await,
        ServerEvent::PlayerJoined { count: 0 }
    ));
}

// =========================================================================
// Match history
// =========================================================================

#[tokio::test]
async fn test_won_game_is_recorded_in_history() {
    let (addr, history) = start_server_with_history().await;

    let mut host = connect(&addr).await;
    let room_code = register_host(&mut host).await;

    let mut player = connect(&addr).await;
    let player_id = register_player(&mut player, &room_code).await;

    send(&mut host, &ClientEvent::StartGame).await;
    send(&mut host, &ClientEvent::CallNumber).await;
    recv_until(&mut player, |e| matches!(e, ServerEvent::CallNumber { .. })).await;

    send(
        &mut player,
        &ClientEvent::PlayerWin {
            room_code: room_code.clone(),
        },
    )
    .await;
    recv_until(&mut player, |e| matches!(e, ServerEvent::GameOver { .. })).await;

    let entry = wait_for_history_entry(&history).await;
    assert_eq!(entry.room_code, room_code.to_string());
    assert_eq!(entry.winner, Some(player_id.0));
    assert_eq!(entry.numbers_called, 1);
    assert_eq!(entry.result, GameResult::Won);
}

#[tokio::test]
async fn test_abandoned_game_is_recorded_in_history() {
    let (addr, history) = start_server_with_history().await;

    let mut host = connect(&addr).await;
    let room_code = register_host(&mut host).await;

    let mut player = connect(&addr).await;
    register_player(&mut player, &room_code).await;

    send(&mut host, &ClientEvent::StartGame).await;
    assert!(matches!(recv(&mut player).await, ServerEvent::GameStarted));

    drop(host);
    recv_until(&mut player, |e| matches!(e, ServerEvent::RoomClosed)).await;

    let entry = wait_for_history_entry(&history).await;
    assert_eq!(entry.room_code, room_code.to_string());
    assert_eq!(entry.winner, None);
    assert_eq!(entry.numbers_called, 0);
    assert_eq!(entry.result, GameResult::Abandoned);
}

#[tokio::test]
async fn test_invalid_json_reports_error_and_keeps_connection() {
    let addr = start_server().await;

    let mut host = connect(&addr).await;
    register_host(&mut host).await;

    host.send(Message::Text("not json".into())).await.expect("send");
    assert!(matches!(recv(&mut host).await, ServerEvent::Error { .. }));

    // The connection still works.
    send(&mut host, &ClientEvent::StartGame).await;
    assert!(matches!(recv(&mut host).await, ServerEvent::Error { .. }));
}
