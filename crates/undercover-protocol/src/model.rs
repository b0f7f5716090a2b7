//! The game data model: sessions, seats, votes, and word packs.
//!
//! These are plain records. The rules governing how they may change live
//! in `undercover-engine`; persistence and querying are external
//! collaborators that only need these shapes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{GameId, PackId, PlayerId, RoomCode};

// ---------------------------------------------------------------------------
// GameStatus
// ---------------------------------------------------------------------------

/// The lifecycle state of a game session.
///
/// The transition graph is small and strict:
///
/// ```text
/// Waiting → Playing → Voting → Playing (new round)
///                        └───→ Finished (terminal)
/// ```
///
/// Every other edge is forbidden. The session state machine is the sole
/// writer of status and rejects transitions outside this graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Session exists, accepting joins, round not started.
    Waiting,
    /// Players are taking turns describing their word.
    Playing,
    /// Every active player has spoken; votes are being collected.
    Voting,
    /// Game over. Terminal.
    Finished,
}

impl GameStatus {
    /// Returns `true` if new players may join.
    pub fn is_joinable(self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` if this is the terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Returns `true` if transitioning to `target` is a valid edge.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Waiting, Self::Playing)
                | (Self::Playing, Self::Voting)
                | (Self::Voting, Self::Playing)
                | (Self::Voting, Self::Finished)
        )
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Playing => write!(f, "playing"),
            Self::Voting => write!(f, "voting"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// GameOutcome
// ---------------------------------------------------------------------------

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    /// The impostor was voted out. Defenders win.
    ImpostorCaught,
    /// Too few accusers remain. The impostor escapes.
    ImpostorWins,
    /// The impostor left mid-game. Defenders win by forfeit.
    ImpostorFled,
}

// ---------------------------------------------------------------------------
// GameSession
// ---------------------------------------------------------------------------

/// The authoritative record of one game session.
///
/// Status, round, and current-turn are the only mutable shared state in
/// the system and are written exclusively by the session state machine.
/// The round number is monotonically non-decreasing and only increments
/// on round-advance transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    /// The session's unique id.
    pub id: GameId,
    /// The participant hosting the game (kick rights, start rights).
    pub host: PlayerId,
    /// The word pack this session was created with.
    pub pack_id: PackId,
    /// The short code participants use to join.
    pub room_code: RoomCode,
    /// Current lifecycle state.
    pub status: GameStatus,
    /// Current round number, starting at 1.
    pub round: u32,
    /// Index of the active word pair within the pack snapshot.
    /// Set once, at round start.
    pub word_index: Option<usize>,
    /// The player whose turn it currently is. `None` until play starts.
    pub current_turn: Option<PlayerId>,
    /// Set when the session reaches `Finished`.
    pub outcome: Option<GameOutcome>,
    /// Creation time, milliseconds since the Unix epoch.
    pub created_at_ms: u64,
}

// ---------------------------------------------------------------------------
// Seat
// ---------------------------------------------------------------------------

/// One participant's membership record in a session.
///
/// The impostor flag and secret word are assigned once at round start
/// and never change for the session's lifetime. Turn order is a dense
/// `0..N-1` permutation over active (non-kicked) seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    /// Who sits here.
    pub player: PlayerId,
    /// The secret word shown to this player. `None` until round start.
    pub word: Option<String>,
    /// Whether this player is the impostor.
    pub is_impostor: bool,
    /// Kicked players stay on record but are skipped for turns and quorum.
    pub is_kicked: bool,
    /// Position in the speaking order. `None` until round start.
    pub turn_order: Option<usize>,
}

impl Seat {
    /// Creates a fresh seat with no word or turn order assigned.
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            word: None,
            is_impostor: false,
            is_kicked: false,
            turn_order: None,
        }
    }

    /// Returns `true` if this seat still participates in turns and votes.
    pub fn is_active(&self) -> bool {
        !self.is_kicked
    }
}

// ---------------------------------------------------------------------------
// Votes
// ---------------------------------------------------------------------------

/// What a vote is cast for: a specific player, or a skip.
///
/// Modelled as an enum so "target XOR skip" holds by construction —
/// there is no way to represent a vote that is both or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ballot {
    /// Vote to eject nobody this round.
    Skip,
    /// Vote to eject the named player.
    Player(PlayerId),
}

/// A single submitted vote.
///
/// Created on submission and never mutated. Votes are scoped to their
/// round: tallies filter by round number rather than deleting stale
/// votes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// The round this vote belongs to.
    pub round: u32,
    /// Who cast it. At most one vote per (session, round, voter).
    pub voter: PlayerId,
    /// Who it targets.
    pub ballot: Ballot,
}

// ---------------------------------------------------------------------------
// Word packs
// ---------------------------------------------------------------------------

/// One word pair: the term most players receive and the impostor's
/// near-miss variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPair {
    /// The term given to every regular player.
    pub main: String,
    /// The divergent term given to the impostor.
    pub impostor: String,
}

impl WordPair {
    /// Convenience constructor for literals.
    pub fn new(main: impl Into<String>, impostor: impl Into<String>) -> Self {
        Self {
            main: main.into(),
            impostor: impostor.into(),
        }
    }
}

/// An ordered collection of word pairs.
///
/// Selecting a pack for a session snapshots its pairs into the session,
/// so later edits to the pack never affect a running game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPack {
    /// The pack's unique id.
    pub id: PackId,
    /// Display name.
    pub name: String,
    /// The participant who created it; `None` for built-in packs.
    pub creator: Option<PlayerId>,
    /// Whether the pack is listed for everyone.
    pub is_public: bool,
    /// Whether this is one of the shipped default packs.
    pub is_default: bool,
    /// The word pairs, in order.
    pub words: Vec<WordPair>,
}

impl WordPack {
    /// Returns `true` if `viewer` should see this pack in listings:
    /// default packs, public packs, and the viewer's own.
    pub fn is_visible_to(&self, viewer: PlayerId) -> bool {
        self.is_default || self.is_public || self.creator == Some(viewer)
    }
}
