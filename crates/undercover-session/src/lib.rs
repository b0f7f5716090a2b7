//! The concurrency shell around the Undercover rules engine.
//!
//! Multiple independent clients (one per participant) issue concurrent
//! requests against the same game with no client-side locking. This
//! crate provides the serialization the rules require:
//!
//! - [`GameHandle`] / the game actor — each live game runs as an
//!   isolated Tokio task owning its `GameState`. All mutation flows
//!   through the actor's command channel, so status/round/turn writes
//!   are atomic from any observer's perspective.
//! - [`GameDirectory`] — creates games, maps room codes to running
//!   actors, and tracks which game each participant is in.
//! - [`PackProvider`] / [`HostGate`] — the word-pack and entitlement
//!   collaborators the core depends on but does not implement.
//!
//! Clients learn of changes through each game's broadcast change feed
//! ([`GameHandle::subscribe`]) and re-fetch the authoritative snapshot
//! ([`GameHandle::snapshot`]), which is an idempotent read and doubles
//! as the polling fallback.

mod actor;
mod directory;
mod error;
mod packs;

pub use actor::{GameHandle, GameView};
pub use directory::GameDirectory;
pub use error::SessionError;
pub use packs::{HostGate, OpenGate, PackProvider, StaticPacks};
