//! Shared types for the Undercover game core.
//!
//! This crate defines the data that every other layer speaks:
//!
//! - **Identity** ([`PlayerId`], [`GameId`], [`PackId`], [`RoomCode`]) —
//!   newtype ids and the human-enterable room code.
//! - **Model** ([`GameSession`], [`Seat`], [`Vote`], [`WordPack`], etc.) —
//!   the records the rules engine operates on.
//! - **Events** ([`GameEvent`]) — the change-feed contract an external
//!   transport relays to connected clients.
//!
//! Pure data plus serde. No async, no game rules — those live in
//! `undercover-engine`.

mod code;
mod error;
mod event;
mod model;
mod types;

pub use code::{ROOM_CODE_ALPHABET, ROOM_CODE_LEN, RoomCode};
pub use error::ProtocolError;
pub use event::GameEvent;
pub use model::{
    Ballot, GameOutcome, GameSession, GameStatus, Seat, Vote, WordPack,
    WordPair,
};
pub use types::{GameId, PackId, PlayerId};
