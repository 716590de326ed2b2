//! `BingohallServer` builder and accept loop.
//!
//! This is the entry point for running a bingo server. It ties together
//! all the layers: transport → protocol → room, plus the history
//! recorder that observes finished sessions.

use std::sync::Arc;

use bingohall_game::{HistoryEntry, MatchHistory};
use bingohall_protocol::JsonCodec;
use bingohall_room::{RoomEvent, RoomRegistry};
use bingohall_transport::{Transport, WebSocketTransport};
use tokio::sync::{Mutex, mpsc};

use crate::BingoError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The locks
/// guard only the map and log operations; game work happens inside the
/// room actors.
pub(crate) struct ServerState {
    pub(crate) registry: Mutex<RoomRegistry>,
    pub(crate) history: Arc<Mutex<MatchHistory>>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a Bingohall server.
pub struct BingohallServerBuilder {
    bind_addr: String,
}

impl BingohallServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Builds the server: binds the WebSocket transport and spawns the
    /// history recorder.
    pub async fn build(self) -> Result<BingohallServer, BingoError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let (registry, events) = RoomRegistry::new();
        let history = Arc::new(Mutex::new(MatchHistory::new()));
        tokio::spawn(record_history(events, Arc::clone(&history)));

        let state = Arc::new(ServerState {
            registry: Mutex::new(registry),
            history,
            codec: JsonCodec,
        });

        Ok(BingohallServer { transport, state })
    }
}

impl Default for BingohallServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Bingohall server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct BingohallServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl BingohallServer {
    /// Creates a new builder.
    pub fn builder() -> BingohallServerBuilder {
        BingohallServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, BingoError> {
        Ok(self.transport.local_addr()?)
    }

    /// Returns a handle to the match history log.
    pub fn history(&self) -> Arc<Mutex<MatchHistory>> {
        Arc::clone(&self.state.history)
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), BingoError> {
        tracing::info!("Bingohall server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Observer task: turns finished-session events into history entries.
async fn record_history(
    mut events: mpsc::UnboundedReceiver<RoomEvent>,
    history: Arc<Mutex<MatchHistory>>,
) {
    while let Some(event) = events.recv().await {
        let RoomEvent::Finished {
            room_code,
            winner,
            numbers_called,
            result,
        } = event;

        tracing::info!(
            %room_code,
            winner = winner.map(|w| w.0),
            numbers_called,
            ?result,
            "recording finished game"
        );

        history.lock().await.record(HistoryEntry {
            timestamp: chrono::Utc::now(),
            room_code: room_code.to_string(),
            winner: winner.map(|w| w.0),
            numbers_called,
            result,
        });
    }
}
