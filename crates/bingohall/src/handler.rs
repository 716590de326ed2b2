//! Per-connection handler: registration and event routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive the first event → register as host or player
//!   2. Spawn a writer pump forwarding room events to the socket
//!   3. Loop: receive events → dispatch to the room actor
//!
//! On disconnect, a drop guard runs the role's cleanup: a leaving host
//! tears the room down, a leaving player is removed from the roster.

use std::sync::Arc;
use std::time::Duration;

use bingohall_protocol::{ClientEvent, Codec, PlayerId, ProtocolError, RoomCode, ServerEvent};
use bingohall_room::{RoomHandle, RoomError};
use bingohall_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::BingoError;
use crate::server::ServerState;

/// How long a fresh connection gets to send its registration event.
const REGISTRATION_TIMEOUT: Duration = Duration::from_secs(10);

/// What this connection is to its room.
#[derive(Clone)]
enum Role {
    Host {
        room_code: RoomCode,
    },
    Player {
        room_code: RoomCode,
        player_id: PlayerId,
    },
}

/// Drop guard that runs role cleanup when the handler exits.
///
/// This ensures cleanup happens even if the handler errors out early.
/// Since `Drop` is synchronous, we spawn a fire-and-forget task for the
/// async registry work.
struct RoleGuard {
    role: Option<Role>,
    state: Arc<ServerState>,
}

impl Drop for RoleGuard {
    fn drop(&mut self) {
        let Some(role) = self.role.take() else { return };
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            match role {
                Role::Host { room_code } => {
                    state.registry.lock().await.close_room(&room_code).await;
                }
                Role::Player {
                    room_code,
                    player_id,
                } => {
                    // The room may already be gone if the host left first.
                    let handle = state.registry.lock().await.get(&room_code);
                    if let Ok(handle) = handle {
                        let _ = handle.leave(player_id).await;
                    }
                }
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), BingoError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, peer = %conn.peer_addr(), "handling new connection");

    let first = recv_registration(&conn, &state).await?;

    // The room delivers events through this channel; the pump task
    // drains it into the socket.
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

    let (role, handle) = match first {
        ClientEvent::RegisterHost { room_code } => {
            let created = state
                .registry
                .lock()
                .await
                .create_room(room_code, outbound_tx.clone());
            let handle = match created {
                Ok(handle) => handle,
                Err(e) => {
                    send_event(&conn, &state, &error_event(&e)).await?;
                    return Err(e.into());
                }
            };
            let room_code = handle.room_code().clone();
            send_event(
                &conn,
                &state,
                &ServerEvent::HostRegistered {
                    room_code: room_code.clone(),
                },
            )
            .await?;
            tracing::info!(%conn_id, %room_code, "host registered");
            (Role::Host { room_code }, handle)
        }

        ClientEvent::RegisterPlayer { room_code } => {
            let lookup = state.registry.lock().await.get(&room_code);
            let joined = match lookup {
                Ok(handle) => match handle.join(outbound_tx.clone()).await {
                    Ok(player_id) => Ok((handle, player_id)),
                    Err(e) => Err(e),
                },
                Err(e) => Err(e),
            };
            let (handle, player_id) = match joined {
                Ok(pair) => pair,
                Err(e) => {
                    send_event(&conn, &state, &error_event(&e)).await?;
                    return Err(e.into());
                }
            };
            // Sent directly so it precedes anything queued by the join
            // (the called-number history for mid-game joiners).
            send_event(
                &conn,
                &state,
                &ServerEvent::Registered {
                    room_code: room_code.clone(),
                    player_id,
                },
            )
            .await?;
            tracing::info!(%conn_id, %room_code, %player_id, "player registered");
            (
                Role::Player {
                    room_code,
                    player_id,
                },
                handle,
            )
        }

        _ => {
            let message = "first event must be register-host or register-player";
            let _ = send_event(
                &conn,
                &state,
                &ServerEvent::Error {
                    message: message.to_string(),
                },
            )
            .await;
            return Err(ProtocolError::InvalidMessage(message.to_string()).into());
        }
    };

    let _guard = RoleGuard {
        role: Some(role.clone()),
        state: Arc::clone(&state),
    };
    tokio::spawn(pump_events(conn.clone(), Arc::clone(&state), outbound_rx));

    // --- Event loop ---
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let event: ClientEvent = match state.codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode event");
                let _ = outbound_tx.send(ServerEvent::Error {
                    message: "invalid message".to_string(),
                });
                continue;
            }
        };

        // Rejected operations are reported to this client only; they
        // never affect the room.
        if let Err(e) = dispatch(&role, &handle, event).await {
            let _ = outbound_tx.send(error_event(&e));
        }
    }

    // _guard drops here → role cleanup fires.
    Ok(())
}

/// Routes one client event according to the connection's role.
async fn dispatch(
    role: &Role,
    handle: &RoomHandle,
    event: ClientEvent,
) -> Result<(), BingoError> {
    match (role, event) {
        (Role::Host { .. }, ClientEvent::StartGame) => {
            handle.start().await?;
            Ok(())
        }

        // The draw is fanned out to everyone (host included) by the
        // room actor, so there is no direct reply here.
        (Role::Host { .. }, ClientEvent::CallNumber) => {
            handle.call_number().await?;
            Ok(())
        }

        (Role::Host { .. }, ClientEvent::PlayerWin { .. }) => Err(invalid(
            "the host cannot claim a win",
        )),

        (Role::Player { .. }, ClientEvent::StartGame | ClientEvent::CallNumber) => {
            Err(invalid("only the host can run the game"))
        }

        (
            Role::Player {
                room_code,
                player_id,
            },
            ClientEvent::PlayerWin { room_code: claimed },
        ) => {
            // Identity comes from the connection, never from the payload;
            // the claimed code just has to match the joined room.
            if claimed != *room_code {
                return Err(RoomError::NotInRoom(*player_id, claimed).into());
            }
            handle.claim_win(*player_id).await?;
            Ok(())
        }

        (_, ClientEvent::RegisterHost { .. } | ClientEvent::RegisterPlayer { .. }) => {
            Err(invalid("already registered"))
        }
    }
}

/// Forwards room events from the outbound channel to the socket.
///
/// Ends when every sender is gone (room closed and handler exited) or
/// the socket dies. A room-closed event also closes the socket: the
/// room will never speak again.
async fn pump_events(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
    mut outbound: mpsc::UnboundedReceiver<ServerEvent>,
) {
    while let Some(event) = outbound.recv().await {
        let closing = matches!(event, ServerEvent::RoomClosed);
        match state.codec.encode(&event) {
            Ok(bytes) => {
                if conn.send(&bytes).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to encode event");
            }
        }
        if closing {
            let _ = conn.close().await;
            break;
        }
    }
}

/// Receives and decodes the registration event, with a deadline.
async fn recv_registration(
    conn: &WebSocketConnection,
    state: &Arc<ServerState>,
) -> Result<ClientEvent, BingoError> {
    let data = match tokio::time::timeout(REGISTRATION_TIMEOUT, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(ProtocolError::InvalidMessage(
                "connection closed before registration".into(),
            )
            .into());
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            return Err(
                ProtocolError::InvalidMessage("registration timed out".into()).into(),
            );
        }
    };
    Ok(state.codec.decode(&data)?)
}

/// Encodes and sends one event directly on the connection.
async fn send_event(
    conn: &WebSocketConnection,
    state: &Arc<ServerState>,
    event: &ServerEvent,
) -> Result<(), BingoError> {
    let bytes = state.codec.encode(event)?;
    conn.send(&bytes).await?;
    Ok(())
}

fn error_event(e: &impl std::fmt::Display) -> ServerEvent {
    ServerEvent::Error {
        message: e.to_string(),
    }
}

fn invalid(message: &str) -> BingoError {
    ProtocolError::InvalidMessage(message.to_string()).into()
}
