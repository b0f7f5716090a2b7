//! Room codes: short human-enterable session addresses.
//!
//! A code is six characters from `A-Z0-9` — easy to read out loud or
//! type on a phone. Uniqueness among live sessions is the directory's
//! job; this module only generates and validates the format.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Fixed length of every room code.
pub const ROOM_CODE_LEN: usize = 6;

/// Characters a room code may contain.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A validated room code.
///
/// Construct via [`RoomCode::generate`] or by parsing user input with
/// `str::parse`, which normalizes to uppercase and rejects anything
/// outside the fixed length/alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Generates a uniformly random code.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..ROOM_CODE_LEN)
            .map(|_| {
                let i = rng.random_range(0..ROOM_CODE_ALPHABET.len());
                ROOM_CODE_ALPHABET[i] as char
            })
            .collect();
        Self(code)
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RoomCode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        if normalized.len() != ROOM_CODE_LEN {
            return Err(ProtocolError::InvalidRoomCode(s.to_string()));
        }
        if !normalized
            .bytes()
            .all(|b| ROOM_CODE_ALPHABET.contains(&b))
        {
            return Err(ProtocolError::InvalidRoomCode(s.to_string()));
        }
        Ok(Self(normalized))
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
