//! Error types for the session layer.

use undercover_engine::GameError;
use undercover_protocol::RoomCode;

/// Errors surfaced by game handles and the directory.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A rule was violated. See [`GameError`] for the kinds.
    #[error(transparent)]
    Game(#[from] GameError),

    /// The game's actor task is gone (shut down or crashed); its
    /// command channel no longer accepts messages.
    #[error("game {0} is unavailable")]
    Unavailable(RoomCode),
}
