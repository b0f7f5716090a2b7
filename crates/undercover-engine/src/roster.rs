//! Roster management: who is in the game.
//!
//! Operations here own membership and nothing else — they never touch
//! status, round, or turn fields. Kicked players stay on record (their
//! votes and seats are filtered by the active set); leaving removes the
//! record entirely.

use undercover_protocol::{GameSession, PlayerId, Seat};

use crate::GameError;

/// Minimum active players required to start a round.
pub const MIN_PLAYERS: usize = 3;

/// Maximum players a session will admit.
pub const MAX_PLAYERS: usize = 10;

/// Adds `player` to the roster, returning the index of their seat.
///
/// Re-joining is idempotent: an existing member gets their current seat
/// back regardless of status, so a client that retries after a timeout
/// (or rejoins mid-game) does not error.
///
/// # Errors
/// - [`GameError::SessionAlreadyStarted`] — status is past waiting and
///   `player` is not already a member
/// - [`GameError::SessionFull`] — active count is at capacity
pub fn join(
    session: &GameSession,
    seats: &mut Vec<Seat>,
    player: PlayerId,
) -> Result<usize, GameError> {
    if let Some(idx) = seats.iter().position(|s| s.player == player) {
        return Ok(idx);
    }
    if !session.status.is_joinable() {
        return Err(GameError::SessionAlreadyStarted(session.id));
    }
    if active_count(seats) >= MAX_PLAYERS {
        return Err(GameError::SessionFull(session.id));
    }
    seats.push(Seat::new(player));
    tracing::info!(
        game_id = %session.id,
        %player,
        players = seats.len(),
        "player joined"
    );
    Ok(seats.len() - 1)
}

/// Marks `target` as kicked. Host-only.
///
/// Turn order is not reassigned here; the round engine skips kicked
/// seats when rotating, and the tally excludes them from quorum.
///
/// # Errors
/// - [`GameError::NotAuthorized`] — `actor` is not the host
/// - [`GameError::NoActiveSession`] — `target` is not a member
pub fn kick(
    session: &GameSession,
    seats: &mut [Seat],
    actor: PlayerId,
    target: PlayerId,
) -> Result<(), GameError> {
    if actor != session.host {
        return Err(GameError::NotAuthorized(actor));
    }
    let seat = seats
        .iter_mut()
        .find(|s| s.player == target)
        .ok_or(GameError::NoActiveSession(target))?;
    seat.is_kicked = true;
    tracing::info!(game_id = %session.id, player = %target, "player kicked");
    Ok(())
}

/// Removes `player`'s seat entirely, returning it.
///
/// Returns `None` if the player was not a member. Recovery rules for
/// mid-game departures (speaker, impostor) are applied by the session
/// state machine, not here.
pub fn leave(seats: &mut Vec<Seat>, player: PlayerId) -> Option<Seat> {
    let idx = seats.iter().position(|s| s.player == player)?;
    Some(seats.remove(idx))
}

/// Iterates the active (non-kicked) seats.
pub fn active(seats: &[Seat]) -> impl Iterator<Item = &Seat> {
    seats.iter().filter(|s| s.is_active())
}

/// Number of active seats.
pub fn active_count(seats: &[Seat]) -> usize {
    active(seats).count()
}

/// The active seats sorted by turn order ascending.
///
/// Seats without an assigned order sort last; before round start the
/// order is meaningless and callers should not rely on it.
pub fn active_in_turn_order(seats: &[Seat]) -> Vec<&Seat> {
    let mut ordered: Vec<&Seat> = active(seats).collect();
    ordered.sort_by_key(|s| s.turn_order.unwrap_or(usize::MAX));
    ordered
}
