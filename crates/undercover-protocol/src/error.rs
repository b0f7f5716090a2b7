//! Error types for the protocol layer.

/// Errors that can occur when validating protocol-level data.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The string is not a well-formed room code.
    #[error("invalid room code: {0:?}")]
    InvalidRoomCode(String),
}
