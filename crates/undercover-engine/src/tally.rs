//! Vote counting: ranking, the winner rule, and quorum.
//!
//! The tally only reads votes and seats; every consequence (kicking,
//! round increment, finishing) is applied by the session state machine.

use std::collections::HashSet;

use undercover_protocol::{Ballot, PlayerId, Seat, Vote};

use crate::roster;

/// One row of a ranked tally. `target == None` is the synthetic "skip"
/// entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TallyEntry {
    /// The player this row counts votes against, or `None` for skip.
    pub target: Option<PlayerId>,
    /// Number of votes received.
    pub votes: usize,
}

/// The computed result of a voting round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Quorum not reached yet; check again later. Re-checking has no
    /// side effects.
    Waiting,
    /// Two or more entries share the top count. Nobody is ejected.
    Tie,
    /// The skip entry won outright. Nobody is ejected.
    SkipWins,
    /// The top scorer is the impostor.
    ImpostorCaught(PlayerId),
    /// The top scorer is an innocent player.
    WrongVote(PlayerId),
}

/// Counts this round's votes against each active seat plus a synthetic
/// skip entry, ranked descending by count.
///
/// Votes from other rounds are excluded by round-number filtering, and
/// votes targeting players who are no longer active are dropped rather
/// than counted.
pub fn tally(votes: &[Vote], round: u32, seats: &[Seat]) -> Vec<TallyEntry> {
    let in_round: Vec<&Vote> =
        votes.iter().filter(|v| v.round == round).collect();

    let mut entries = vec![TallyEntry {
        target: None,
        votes: in_round
            .iter()
            .filter(|v| v.ballot == Ballot::Skip)
            .count(),
    }];

    for seat in roster::active(seats) {
        let count = in_round
            .iter()
            .filter(|v| v.ballot == Ballot::Player(seat.player))
            .count();
        entries.push(TallyEntry {
            target: Some(seat.player),
            votes: count,
        });
    }

    entries.sort_by(|a, b| b.votes.cmp(&a.votes));
    entries
}

/// Applies the winner rule to a ranked tally.
///
/// The top entry wins only if its count is strictly greater than every
/// other entry's; a shared maximum means no winner.
pub fn winner(entries: &[TallyEntry]) -> Option<TallyEntry> {
    let first = entries.first()?;
    let tied = entries.iter().filter(|e| e.votes == first.votes).count();
    if tied > 1 { None } else { Some(*first) }
}

/// Computes the outcome of `round`, or [`VoteOutcome::Waiting`] if the
/// number of distinct voters has not reached the active-player count.
pub fn outcome(votes: &[Vote], round: u32, seats: &[Seat]) -> VoteOutcome {
    let voters: HashSet<PlayerId> = votes
        .iter()
        .filter(|v| v.round == round)
        .map(|v| v.voter)
        .collect();
    if voters.len() < roster::active_count(seats) {
        return VoteOutcome::Waiting;
    }

    let entries = tally(votes, round, seats);
    match winner(&entries) {
        None => VoteOutcome::Tie,
        Some(TallyEntry { target: None, .. }) => VoteOutcome::SkipWins,
        Some(TallyEntry {
            target: Some(player),
            ..
        }) => {
            let is_impostor = seats
                .iter()
                .any(|s| s.player == player && s.is_impostor);
            if is_impostor {
                VoteOutcome::ImpostorCaught(player)
            } else {
                VoteOutcome::WrongVote(player)
            }
        }
    }
}
