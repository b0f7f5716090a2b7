//! Game actor: an isolated Tokio task that owns one game's state.
//!
//! Each live game runs in its own task, communicating with the outside
//! world through an mpsc command channel. Commands carry oneshot reply
//! channels; the actor processes them strictly in order, which is what
//! makes vote submission, turn advancement, and vote resolution safe
//! against racing clients without any locks.

use rand::rngs::StdRng;
use tokio::sync::{broadcast, mpsc, oneshot};
use undercover_engine::{GameError, GameState, Resolution};
use undercover_protocol::{
    Ballot, GameEvent, GameId, GameSession, PlayerId, RoomCode, Seat,
    WordPack,
};

use crate::SessionError;

/// Capacity of the change-feed broadcast channel. Slow subscribers that
/// lag past this many events miss some and must re-fetch the snapshot,
/// which the at-least-once contract already requires of them.
const EVENT_CHANNEL_SIZE: usize = 64;

/// A snapshot of a game's authoritative state.
///
/// This is what polling clients fetch; reading it has no side effects,
/// so retries and redundant fetches are harmless.
#[derive(Debug, Clone)]
pub struct GameView {
    /// The session record.
    pub session: GameSession,
    /// All membership records, kicked included.
    pub seats: Vec<Seat>,
    /// Number of votes recorded in the current round.
    pub votes_cast: usize,
}

/// Commands sent to a game actor through its channel.
pub(crate) enum GameCommand {
    Join {
        player: PlayerId,
        reply: oneshot::Sender<Result<GameView, GameError>>,
    },
    Leave {
        player: PlayerId,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    Kick {
        actor: PlayerId,
        target: PlayerId,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    Start {
        actor: PlayerId,
        reply: oneshot::Sender<Result<GameView, GameError>>,
    },
    AdvanceTurn {
        speaker: PlayerId,
        reply: oneshot::Sender<Result<GameView, GameError>>,
    },
    CastVote {
        voter: PlayerId,
        ballot: Ballot,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    Resolve {
        expected_round: u32,
        reply: oneshot::Sender<Result<(Resolution, GameView), GameError>>,
    },
    Snapshot {
        reply: oneshot::Sender<GameView>,
    },
    Shutdown,
}

/// Handle to a running game actor. Cheap to clone.
#[derive(Clone, Debug)]
pub struct GameHandle {
    game_id: GameId,
    room_code: RoomCode,
    sender: mpsc::Sender<GameCommand>,
    events: broadcast::Sender<GameEvent>,
}

impl GameHandle {
    /// The game's unique id.
    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    /// The room code this game is addressed by.
    pub fn room_code(&self) -> &RoomCode {
        &self.room_code
    }

    /// Subscribes to the game's change feed.
    ///
    /// Events are delivered at-least-effort; a lagging receiver should
    /// treat the gap as a cue to call [`snapshot`](Self::snapshot).
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    /// Adds a participant and returns the post-join snapshot.
    pub async fn join(
        &self,
        player: PlayerId,
    ) -> Result<GameView, SessionError> {
        self.request(|reply| GameCommand::Join { player, reply })
            .await?
            .map_err(Into::into)
    }

    /// Removes a participant's membership entirely.
    pub async fn leave(&self, player: PlayerId) -> Result<(), SessionError> {
        self.request(|reply| GameCommand::Leave { player, reply })
            .await?
            .map_err(Into::into)
    }

    /// Marks a player kicked. Host-only.
    pub async fn kick(
        &self,
        actor: PlayerId,
        target: PlayerId,
    ) -> Result<(), SessionError> {
        self.request(|reply| GameCommand::Kick {
            actor,
            target,
            reply,
        })
        .await?
        .map_err(Into::into)
    }

    /// Starts the game. Host-only.
    pub async fn start(
        &self,
        actor: PlayerId,
    ) -> Result<GameView, SessionError> {
        self.request(|reply| GameCommand::Start { actor, reply })
            .await?
            .map_err(Into::into)
    }

    /// Hands the turn to the next speaker, guarded by the caller's view
    /// of who currently holds it.
    pub async fn advance_turn(
        &self,
        speaker: PlayerId,
    ) -> Result<GameView, SessionError> {
        self.request(|reply| GameCommand::AdvanceTurn { speaker, reply })
            .await?
            .map_err(Into::into)
    }

    /// Records a vote. At most one per (game, round, voter).
    pub async fn cast_vote(
        &self,
        voter: PlayerId,
        ballot: Ballot,
    ) -> Result<(), SessionError> {
        self.request(|reply| GameCommand::CastVote {
            voter,
            ballot,
            reply,
        })
        .await?
        .map_err(Into::into)
    }

    /// Resolves the vote for `expected_round` once quorum is reached.
    ///
    /// Safe to call redundantly: racing callers past the first get
    /// [`Resolution::AlreadyResolved`] with the settled snapshot.
    pub async fn resolve(
        &self,
        expected_round: u32,
    ) -> Result<(Resolution, GameView), SessionError> {
        self.request(|reply| GameCommand::Resolve {
            expected_round,
            reply,
        })
        .await?
        .map_err(Into::into)
    }

    /// Fetches the authoritative snapshot. Idempotent read; this is the
    /// polling fallback when the change feed is unavailable.
    pub async fn snapshot(&self) -> Result<GameView, SessionError> {
        self.request(|reply| GameCommand::Snapshot { reply }).await
    }

    /// Tells the game actor to shut down.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.sender
            .send(GameCommand::Shutdown)
            .await
            .map_err(|_| SessionError::Unavailable(self.room_code.clone()))
    }

    /// Sends a command built around a fresh reply channel and awaits
    /// the response.
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> GameCommand,
    ) -> Result<T, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| SessionError::Unavailable(self.room_code.clone()))?;
        reply_rx
            .await
            .map_err(|_| SessionError::Unavailable(self.room_code.clone()))
    }
}

/// The actor itself. Runs inside a Tokio task.
struct GameActor {
    state: GameState,
    rng: StdRng,
    receiver: mpsc::Receiver<GameCommand>,
    events: broadcast::Sender<GameEvent>,
}

impl GameActor {
    async fn run(mut self) {
        let game_id = self.state.session().id;
        tracing::info!(%game_id, "game actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                GameCommand::Join { player, reply } => {
                    let result =
                        self.state.join(player).map(|()| self.view());
                    if result.is_ok() {
                        self.emit(GameEvent::RosterChanged);
                    }
                    let _ = reply.send(result);
                }
                GameCommand::Leave { player, reply } => {
                    let before = self.session_fingerprint();
                    let result = self.state.leave(player);
                    if result.is_ok() {
                        self.emit(GameEvent::RosterChanged);
                        self.emit_session_if_changed(before);
                    }
                    let _ = reply.send(result);
                }
                GameCommand::Kick {
                    actor,
                    target,
                    reply,
                } => {
                    let result = self.state.kick(actor, target);
                    if result.is_ok() {
                        self.emit(GameEvent::RosterChanged);
                    }
                    let _ = reply.send(result);
                }
                GameCommand::Start { actor, reply } => {
                    let result = self
                        .state
                        .start_round(actor, &mut self.rng)
                        .map(|()| self.view());
                    if result.is_ok() {
                        self.emit(self.session_event());
                    }
                    let _ = reply.send(result);
                }
                GameCommand::AdvanceTurn { speaker, reply } => {
                    let result = self
                        .state
                        .advance_turn(speaker)
                        .map(|()| self.view());
                    if result.is_ok() {
                        self.emit(self.session_event());
                    }
                    let _ = reply.send(result);
                }
                GameCommand::CastVote {
                    voter,
                    ballot,
                    reply,
                } => {
                    let round = self.state.session().round;
                    let result = self.state.submit_vote(voter, ballot);
                    if result.is_ok() {
                        self.emit(GameEvent::VoteRecorded { round, voter });
                    }
                    let _ = reply.send(result);
                }
                GameCommand::Resolve {
                    expected_round,
                    reply,
                } => {
                    let result = self
                        .state
                        .resolve(expected_round)
                        .map(|resolution| (resolution, self.view()));
                    if let Ok((resolution, _)) = &result {
                        match resolution {
                            Resolution::Pending
                            | Resolution::AlreadyResolved => {}
                            Resolution::PlayerEjected { .. } => {
                                self.emit(GameEvent::RosterChanged);
                                self.emit(self.session_event());
                            }
                            Resolution::NewRound { .. }
                            | Resolution::Finished { .. } => {
                                self.emit(self.session_event());
                            }
                        }
                    }
                    let _ = reply.send(result);
                }
                GameCommand::Snapshot { reply } => {
                    let _ = reply.send(self.view());
                }
                GameCommand::Shutdown => {
                    tracing::info!(%game_id, "game shutting down");
                    break;
                }
            }
        }

        tracing::info!(%game_id, "game actor stopped");
    }

    fn view(&self) -> GameView {
        let session = self.state.session().clone();
        let round = session.round;
        GameView {
            session,
            seats: self.state.seats().to_vec(),
            votes_cast: self
                .state
                .votes()
                .iter()
                .filter(|v| v.round == round)
                .count(),
        }
    }

    fn session_event(&self) -> GameEvent {
        let s = self.state.session();
        GameEvent::SessionUpdated {
            status: s.status,
            round: s.round,
            current_turn: s.current_turn,
        }
    }

    fn session_fingerprint(
        &self,
    ) -> (undercover_protocol::GameStatus, u32, Option<PlayerId>) {
        let s = self.state.session();
        (s.status, s.round, s.current_turn)
    }

    fn emit_session_if_changed(
        &self,
        before: (undercover_protocol::GameStatus, u32, Option<PlayerId>),
    ) {
        if self.session_fingerprint() != before {
            self.emit(self.session_event());
        }
    }

    /// Broadcasts an event. A send error only means there are no
    /// subscribers right now, which is fine.
    fn emit(&self, event: GameEvent) {
        let _ = self.events.send(event);
    }
}

/// Spawns a new game actor and returns a handle to it.
pub(crate) fn spawn_game(
    id: GameId,
    host: PlayerId,
    pack: &WordPack,
    room_code: RoomCode,
    created_at_ms: u64,
    rng: StdRng,
    channel_size: usize,
) -> Result<GameHandle, GameError> {
    let state = GameState::new(id, host, pack, room_code.clone(), created_at_ms)?;
    let (tx, rx) = mpsc::channel(channel_size);
    let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);

    let actor = GameActor {
        state,
        rng,
        receiver: rx,
        events: event_tx.clone(),
    };
    tokio::spawn(actor.run());

    Ok(GameHandle {
        game_id: id,
        room_code,
        sender: tx,
        events: event_tx,
    })
}
