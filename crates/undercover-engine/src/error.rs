//! Error types for the rules engine.
//!
//! All of these are terminal and user-visible. The engine never retries;
//! the calling layer decides whether to retry or surface the message.
//! No operation leaves partial mutation behind on failure.

use undercover_protocol::{GameId, PlayerId, RoomCode};

/// Errors that can occur while applying game rules.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// No live session matches the room code.
    #[error("no game matches room code {0}")]
    SessionNotFound(RoomCode),

    /// The game has left the waiting state and the participant is not
    /// already a member.
    #[error("game {0} has already started")]
    SessionAlreadyStarted(GameId),

    /// The game is at capacity.
    #[error("game {0} is full")]
    SessionFull(GameId),

    /// Not enough players to start a round.
    #[error("need at least {min} players to start, have {have}")]
    NotEnoughPlayers { have: usize, min: usize },

    /// The participant has no active game for this operation.
    #[error("player {0} has no active game")]
    NoActiveSession(PlayerId),

    /// The word pack is missing or has no word pairs.
    #[error("word pack has no word pairs")]
    NoWordPack,

    /// A non-host attempted a host-only action.
    #[error("player {0} is not the host")]
    NotAuthorized(PlayerId),

    /// A second vote for the same (session, round, voter).
    #[error("player {voter} already voted in round {round}")]
    AlreadyVoted { voter: PlayerId, round: u32 },

    /// The caller's view of status/round/turn no longer matches the
    /// session. The stale action is rejected, never silently applied.
    #[error("stale transition: {0}")]
    StaleTransition(String),
}
