//! The round engine: secret-word assignment and turn rotation.
//!
//! Functions here compute what should happen; the session state machine
//! ([`crate::GameState`]) applies the results to the session record, so
//! status/round/turn writes stay in one place.

use rand::Rng;
use rand::seq::SliceRandom;
use undercover_protocol::{PlayerId, Seat, WordPair};

use crate::GameError;
use crate::roster::{self, MIN_PLAYERS};

/// The result of a round assignment: which word pair was drawn and who
/// speaks first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSetup {
    /// Index of the drawn pair within the session's word snapshot.
    pub word_index: usize,
    /// The player at turn-order 0.
    pub first_speaker: PlayerId,
}

/// What `next_speaker` decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnAdvance {
    /// Hand the turn to this player.
    Next(PlayerId),
    /// Every active player has spoken; voting should begin.
    RoundComplete,
}

/// Assigns words, the impostor, and the speaking order for a new game.
///
/// One word pair is drawn uniformly at random; the entire active roster
/// is shuffled into a uniform random speaking order; the impostor is
/// drawn uniformly from that order. Every active seat receives either
/// the main or the impostor term. This is a one-shot assignment — the
/// impostor flag and words never change for the session's lifetime.
///
/// # Errors
/// - [`GameError::NotEnoughPlayers`] — fewer than three active players
/// - [`GameError::NoWordPack`] — the word snapshot is empty
pub fn assign_round<R: Rng + ?Sized>(
    seats: &mut [Seat],
    words: &[WordPair],
    rng: &mut R,
) -> Result<RoundSetup, GameError> {
    let have = roster::active_count(seats);
    if have < MIN_PLAYERS {
        return Err(GameError::NotEnoughPlayers {
            have,
            min: MIN_PLAYERS,
        });
    }
    if words.is_empty() {
        return Err(GameError::NoWordPack);
    }

    let word_index = rng.random_range(0..words.len());
    let pair = &words[word_index];

    // Shuffle the whole speaking order, not just impostor placement.
    let mut order: Vec<usize> = seats
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_active())
        .map(|(i, _)| i)
        .collect();
    order.shuffle(rng);
    let impostor_pos = rng.random_range(0..order.len());

    for (pos, &idx) in order.iter().enumerate() {
        let is_impostor = pos == impostor_pos;
        let seat = &mut seats[idx];
        seat.turn_order = Some(pos);
        seat.is_impostor = is_impostor;
        seat.word = Some(if is_impostor {
            pair.impostor.clone()
        } else {
            pair.main.clone()
        });
    }

    Ok(RoundSetup {
        word_index,
        first_speaker: seats[order[0]].player,
    })
}

/// Computes who speaks after `current`, cyclically over the active
/// roster in turn order.
///
/// Returns [`TurnAdvance::RoundComplete`] when advancing would wrap back
/// to the first active speaker — every active player has had exactly one
/// turn — or when `current` is no longer among the active seats (kicked
/// mid-turn). Both cases hand control to the voting phase instead of
/// stalling the rotation.
pub fn next_speaker(seats: &[Seat], current: PlayerId) -> TurnAdvance {
    let ordered = roster::active_in_turn_order(seats);
    if ordered.is_empty() {
        return TurnAdvance::RoundComplete;
    }
    let Some(pos) = ordered.iter().position(|s| s.player == current) else {
        // Current speaker was kicked mid-turn: treat as end-of-round.
        return TurnAdvance::RoundComplete;
    };
    let next = (pos + 1) % ordered.len();
    if next == 0 {
        TurnAdvance::RoundComplete
    } else {
        TurnAdvance::Next(ordered[next].player)
    }
}

/// The first active speaker in turn order, if any. Used when a new
/// round resets the turn.
pub fn first_speaker(seats: &[Seat]) -> Option<PlayerId> {
    roster::active_in_turn_order(seats)
        .first()
        .map(|s| s.player)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn seats(n: u64) -> Vec<Seat> {
        (1..=n).map(|i| Seat::new(PlayerId(i))).collect()
    }

    fn pairs() -> Vec<WordPair> {
        vec![
            WordPair::new("coffee", "espresso"),
            WordPair::new("pizza", "flatbread"),
            WordPair::new("sushi", "sashimi"),
        ]
    }

    #[test]
    fn test_assign_round_turn_order_is_dense_permutation() {
        let mut seats = seats(5);
        let mut rng = StdRng::seed_from_u64(1);
        assign_round(&mut seats, &pairs(), &mut rng).unwrap();

        let mut orders: Vec<usize> =
            seats.iter().map(|s| s.turn_order.unwrap()).collect();
        orders.sort_unstable();
        assert_eq!(orders, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_assign_round_exactly_one_impostor() {
        for seed in 0..20 {
            let mut seats = seats(4);
            let mut rng = StdRng::seed_from_u64(seed);
            assign_round(&mut seats, &pairs(), &mut rng).unwrap();
            assert_eq!(seats.iter().filter(|s| s.is_impostor).count(), 1);
        }
    }

    #[test]
    fn test_assign_round_words_match_roles() {
        let mut seats = seats(4);
        let mut rng = StdRng::seed_from_u64(3);
        let setup = assign_round(&mut seats, &pairs(), &mut rng).unwrap();
        let pair = &pairs()[setup.word_index];

        for seat in &seats {
            let expected = if seat.is_impostor {
                &pair.impostor
            } else {
                &pair.main
            };
            assert_eq!(seat.word.as_deref(), Some(expected.as_str()));
        }
    }

    #[test]
    fn test_assign_round_first_speaker_has_order_zero() {
        let mut seats = seats(6);
        let mut rng = StdRng::seed_from_u64(9);
        let setup = assign_round(&mut seats, &pairs(), &mut rng).unwrap();
        let first = seats
            .iter()
            .find(|s| s.turn_order == Some(0))
            .unwrap();
        assert_eq!(first.player, setup.first_speaker);
    }

    #[test]
    fn test_assign_round_is_deterministic_for_a_seed() {
        let mut a = seats(5);
        let mut b = seats(5);
        assign_round(&mut a, &pairs(), &mut StdRng::seed_from_u64(11)).unwrap();
        assign_round(&mut b, &pairs(), &mut StdRng::seed_from_u64(11)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_assign_round_too_few_players() {
        let mut seats = seats(2);
        let mut rng = StdRng::seed_from_u64(0);
        let err = assign_round(&mut seats, &pairs(), &mut rng).unwrap_err();
        assert!(matches!(
            err,
            GameError::NotEnoughPlayers { have: 2, min: 3 }
        ));
    }

    #[test]
    fn test_assign_round_kicked_players_do_not_count() {
        let mut seats = seats(3);
        seats[0].is_kicked = true;
        let mut rng = StdRng::seed_from_u64(0);
        let err = assign_round(&mut seats, &pairs(), &mut rng).unwrap_err();
        assert!(matches!(err, GameError::NotEnoughPlayers { .. }));
    }

    #[test]
    fn test_assign_round_empty_pack() {
        let mut seats = seats(4);
        let mut rng = StdRng::seed_from_u64(0);
        let err = assign_round(&mut seats, &[], &mut rng).unwrap_err();
        assert!(matches!(err, GameError::NoWordPack));
    }

    #[test]
    fn test_next_speaker_walks_turn_order() {
        let mut s = seats(3);
        s[0].turn_order = Some(1);
        s[1].turn_order = Some(0);
        s[2].turn_order = Some(2);

        // Order: P2, P1, P3.
        assert_eq!(
            next_speaker(&s, PlayerId(2)),
            TurnAdvance::Next(PlayerId(1))
        );
        assert_eq!(
            next_speaker(&s, PlayerId(1)),
            TurnAdvance::Next(PlayerId(3))
        );
    }

    #[test]
    fn test_next_speaker_last_in_order_completes_round() {
        let mut s = seats(3);
        s[0].turn_order = Some(0);
        s[1].turn_order = Some(1);
        s[2].turn_order = Some(2);
        assert_eq!(next_speaker(&s, PlayerId(3)), TurnAdvance::RoundComplete);
    }

    #[test]
    fn test_next_speaker_skips_kicked() {
        let mut s = seats(3);
        s[0].turn_order = Some(0);
        s[1].turn_order = Some(1);
        s[2].turn_order = Some(2);
        s[1].is_kicked = true;
        assert_eq!(
            next_speaker(&s, PlayerId(1)),
            TurnAdvance::Next(PlayerId(3))
        );
    }

    #[test]
    fn test_next_speaker_kicked_current_completes_round() {
        let mut s = seats(3);
        s[0].turn_order = Some(0);
        s[1].turn_order = Some(1);
        s[2].turn_order = Some(2);
        s[1].is_kicked = true;
        // P2 was mid-turn when kicked; rotation must not stall.
        assert_eq!(next_speaker(&s, PlayerId(2)), TurnAdvance::RoundComplete);
    }
}
