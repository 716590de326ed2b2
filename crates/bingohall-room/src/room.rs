//! Room actor: an isolated Tokio task that owns one bingo session.
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. The command loop processes one operation at
//! a time, which makes it the serialization point the session needs:
//! two win claims arriving together are adjudicated strictly in order,
//! and only the first can flip the session to Finished.

use bingohall_game::{GameResult, MAX_NUMBER, draw_next};
use bingohall_protocol::{PlayerId, RoomCode, ServerEvent};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};

use crate::{RoomError, SessionState};

/// Channel sender for delivering outbound events to one connection.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// A terminal event on the core event stream, consumed by observers
/// (the history recorder) rather than by state-mutating logic.
#[derive(Debug, Clone)]
pub enum RoomEvent {
    /// A session reached its terminal state.
    Finished {
        room_code: RoomCode,
        winner: Option<PlayerId>,
        numbers_called: usize,
        result: GameResult,
    },
}

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    /// Add a player; the reply carries the assigned identity.
    Join {
        sender: EventSender,
        reply: oneshot::Sender<Result<PlayerId, RoomError>>,
    },

    /// Remove a player (fire-and-forget, used on disconnect).
    Leave { player: PlayerId },

    /// Move the session from Lobby to InProgress.
    Start {
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Draw the next number and fan it out.
    CallNumber {
        reply: oneshot::Sender<Result<u8, RoomError>>,
    },

    /// Adjudicate a win claim.
    ClaimWin {
        player: PlayerId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Request a metadata snapshot.
    Info { reply: oneshot::Sender<RoomInfo> },

    /// Tear the room down (host left).
    Close,
}

/// A snapshot of room metadata.
#[derive(Debug, Clone)]
pub struct RoomInfo {
    /// The room's code.
    pub room_code: RoomCode,
    /// Current session state.
    pub state: SessionState,
    /// Number of players currently in the room.
    pub player_count: usize,
    /// How many numbers have been called.
    pub numbers_called: usize,
    /// The recorded winner, once the session finished with one.
    pub winner: Option<PlayerId>,
}

/// Handle to a running room actor.
///
/// Cheap to clone — just an `mpsc::Sender` wrapper. The registry holds
/// one per room; connection handlers clone it on registration.
#[derive(Clone)]
pub struct RoomHandle {
    room_code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's code.
    pub fn room_code(&self) -> &RoomCode {
        &self.room_code
    }

    /// Joins the room as a player, returning the assigned identity.
    pub async fn join(&self, sender: EventSender) -> Result<PlayerId, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code.clone()))?
    }

    /// Removes a player from the room.
    pub async fn leave(&self, player: PlayerId) -> Result<(), RoomError> {
        self.send(RoomCommand::Leave { player }).await
    }

    /// Starts the session.
    pub async fn start(&self) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Start { reply: reply_tx }).await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code.clone()))?
    }

    /// Draws and broadcasts the next number.
    pub async fn call_number(&self) -> Result<u8, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::CallNumber { reply: reply_tx })
            .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code.clone()))?
    }

    /// Submits a win claim on behalf of `player`.
    pub async fn claim_win(&self, player: PlayerId) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::ClaimWin {
            player,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code.clone()))?
    }

    /// Requests the current room info.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Info { reply: reply_tx }).await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code.clone()))
    }

    /// Tells the room to shut down.
    pub async fn close(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Close).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code.clone()))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_code: RoomCode,
    session: SessionState,
    host: EventSender,
    /// Players in join order; ids are assigned from `next_player_id`.
    players: Vec<(PlayerId, EventSender)>,
    next_player_id: u64,
    called: Vec<u8>,
    winner: Option<PlayerId>,
    rng: StdRng,
    events: mpsc::UnboundedSender<RoomEvent>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room_code = %self.room_code, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join { sender, reply } => {
                    let result = self.handle_join(sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { player } => {
                    self.handle_leave(player);
                }
                RoomCommand::Start { reply } => {
                    let _ = reply.send(self.handle_start());
                }
                RoomCommand::CallNumber { reply } => {
                    let _ = reply.send(self.handle_call_number());
                }
                RoomCommand::ClaimWin { player, reply } => {
                    let _ = reply.send(self.handle_claim(player));
                }
                RoomCommand::Info { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Close => {
                    self.handle_close();
                    break;
                }
            }
        }

        tracing::info!(room_code = %self.room_code, "room actor stopped");
    }

    fn handle_join(&mut self, sender: EventSender) -> Result<PlayerId, RoomError> {
        if self.session.is_finished() {
            return Err(RoomError::InvalidTransition(format!(
                "cannot join room {} after the game finished",
                self.room_code
            )));
        }

        let player = PlayerId(self.next_player_id);
        self.next_player_id += 1;

        // A late joiner needs the draws they missed.
        if self.session.is_in_progress() {
            let _ = sender.send(ServerEvent::CalledHistory {
                numbers: self.called.clone(),
            });
        }

        self.players.push((player, sender));
        tracing::info!(
            room_code = %self.room_code,
            %player,
            players = self.players.len(),
            "player joined"
        );

        self.notify_host_count();
        Ok(player)
    }

    fn handle_leave(&mut self, player: PlayerId) {
        let before = self.players.len();
        self.players.retain(|(id, _)| *id != player);
        if self.players.len() == before {
            tracing::debug!(
                room_code = %self.room_code,
                %player,
                "leave for unknown player, ignoring"
            );
            return;
        }

        tracing::info!(
            room_code = %self.room_code,
            %player,
            players = self.players.len(),
            "player left"
        );
        self.notify_host_count();
    }

    fn handle_start(&mut self) -> Result<(), RoomError> {
        if !self.session.can_transition_to(SessionState::InProgress) {
            return Err(RoomError::InvalidTransition(format!(
                "cannot start a session in state {}",
                self.session
            )));
        }
        if self.players.is_empty() {
            return Err(RoomError::InvalidTransition(
                "cannot start with no players".to_string(),
            ));
        }

        self.session = SessionState::InProgress;
        tracing::info!(
            room_code = %self.room_code,
            players = self.players.len(),
            "game started"
        );
        self.broadcast_all(ServerEvent::GameStarted);
        Ok(())
    }

    fn handle_call_number(&mut self) -> Result<u8, RoomError> {
        if !self.session.is_in_progress() {
            return Err(RoomError::InvalidTransition(format!(
                "cannot draw in state {}",
                self.session
            )));
        }

        let number = draw_next(&mut self.rng, &self.called)?;
        self.called.push(number);
        tracing::debug!(
            room_code = %self.room_code,
            number,
            total = self.called.len(),
            "number called"
        );

        self.broadcast_all(ServerEvent::CallNumber {
            number,
            room_code: self.room_code.clone(),
        });

        // Pool exhausted: finish with no winner, after the draw has
        // been fanned out.
        if self.called.len() == MAX_NUMBER as usize {
            self.finish(None, GameResult::Exhausted);
        }

        Ok(number)
    }

    fn handle_claim(&mut self, player: PlayerId) -> Result<(), RoomError> {
        if !self.session.is_in_progress() {
            // First-claim-wins: anything after the transition is late.
            return Err(RoomError::InvalidTransition(format!(
                "claim rejected, session is {}",
                self.session
            )));
        }
        if !self.players.iter().any(|(id, _)| *id == player) {
            return Err(RoomError::NotInRoom(player, self.room_code.clone()));
        }

        tracing::info!(room_code = %self.room_code, %player, "win claim accepted");
        self.finish(Some(player), GameResult::Won);
        Ok(())
    }

    fn handle_close(&mut self) {
        tracing::info!(room_code = %self.room_code, "room closing");

        // An in-flight session is abandoned, not won. A lobby that never
        // started has no in-progress step to pass through; teardown is
        // not a lifecycle transition.
        if self.session.is_in_progress() {
            self.finish(None, GameResult::Abandoned);
        } else {
            self.session = SessionState::Finished;
        }

        for (_, sender) in &self.players {
            let _ = sender.send(ServerEvent::RoomClosed);
        }
    }

    /// The single place the session reaches Finished.
    fn finish(&mut self, winner: Option<PlayerId>, result: GameResult) {
        self.session = SessionState::Finished;
        self.winner = winner;

        if result != GameResult::Abandoned {
            self.broadcast_all(ServerEvent::GameOver { winner });
        }

        tracing::info!(
            room_code = %self.room_code,
            winner = winner.map(|w| w.0),
            numbers_called = self.called.len(),
            ?result,
            "session finished"
        );

        let _ = self.events.send(RoomEvent::Finished {
            room_code: self.room_code.clone(),
            winner,
            numbers_called: self.called.len(),
            result,
        });
    }

    fn notify_host_count(&self) {
        let _ = self.host.send(ServerEvent::PlayerJoined {
            count: self.players.len(),
        });
    }

    /// Sends an event to the host and every player. Dead receivers are
    /// silently skipped (connection already gone).
    fn broadcast_all(&self, event: ServerEvent) {
        let _ = self.host.send(event.clone());
        for (_, sender) in &self.players {
            let _ = sender.send(event.clone());
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_code: self.room_code.clone(),
            state: self.session,
            player_count: self.players.len(),
            numbers_called: self.called.len(),
            winner: self.winner,
        }
    }
}

/// Spawns a new room actor task and returns a handle to it.
///
/// The host's event sender is attached at creation — a room never exists
/// without exactly one host.
pub(crate) fn spawn_room(
    room_code: RoomCode,
    host: EventSender,
    events: mpsc::UnboundedSender<RoomEvent>,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        room_code: room_code.clone(),
        session: SessionState::Lobby,
        host,
        players: Vec::new(),
        next_player_id: 1,
        called: Vec::new(),
        winner: None,
        rng: StdRng::from_os_rng(),
        events,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_code,
        sender: tx,
    }
}
