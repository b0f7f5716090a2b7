//! The change-feed contract.
//!
//! The core emits these logical events whenever shared state changes;
//! an external transport relays them to connected clients. Delivery is
//! at-least-once and eventual — consumers re-fetch the authoritative
//! snapshot rather than trusting event payloads alone, so a lagging or
//! lossy feed degrades to the polling fallback.

use serde::{Deserialize, Serialize};

use crate::{GameStatus, PlayerId};

/// A logical state-change notification for one game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// Status, round, or current-turn changed.
    SessionUpdated {
        status: GameStatus,
        round: u32,
        current_turn: Option<PlayerId>,
    },
    /// A player joined, left, or was kicked.
    RosterChanged,
    /// A vote was recorded. The ballot itself is not broadcast.
    VoteRecorded { round: u32, voter: PlayerId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_updated_json_format() {
        let event = GameEvent::SessionUpdated {
            status: GameStatus::Voting,
            round: 2,
            current_turn: Some(PlayerId(3)),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SessionUpdated");
        assert_eq!(json["status"], "voting");
        assert_eq!(json["round"], 2);
        assert_eq!(json["current_turn"], 3);
    }

    #[test]
    fn test_roster_changed_json_format() {
        let json: serde_json::Value =
            serde_json::to_value(GameEvent::RosterChanged).unwrap();
        assert_eq!(json["type"], "RosterChanged");
    }

    #[test]
    fn test_vote_recorded_round_trip() {
        let event = GameEvent::VoteRecorded {
            round: 1,
            voter: PlayerId(8),
        };
        let bytes = serde_json::to_vec(&event).unwrap();
        let decoded: GameEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(event, decoded);
    }
}
