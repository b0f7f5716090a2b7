//! Game rules for Undercover.
//!
//! Everything in this crate is synchronous and deterministic: operations
//! take explicit session/seat/vote records, mutate them under the rules,
//! and return errors when a precondition does not hold. Randomness comes
//! in through a caller-supplied [`rand::Rng`], so tests can drive the
//! engine with a seeded generator.
//!
//! # Layout
//!
//! - [`roster`] — membership: join, kick, leave, capacity, active set
//! - [`round`] — word/impostor assignment and turn rotation
//! - [`tally`] — vote counting, quorum, and the winner rule
//! - [`GameState`] — the session state machine that orchestrates the
//!   above and is the sole writer of status/round/turn
//!
//! Concurrency is out of scope here: `undercover-session` serializes
//! access by running each [`GameState`] inside its own actor task.

mod error;
pub mod roster;
pub mod round;
mod state;
pub mod tally;

pub use error::GameError;
pub use round::TurnAdvance;
pub use state::{GameState, Resolution};
pub use tally::{TallyEntry, VoteOutcome};
