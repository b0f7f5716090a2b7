//! End-to-end rules tests: whole games driven through `GameState`.

use rand::SeedableRng;
use rand::rngs::StdRng;
use undercover_engine::{GameError, GameState, Resolution, roster};
use undercover_protocol::{
    Ballot, GameId, GameOutcome, GameStatus, PackId, PlayerId, WordPack,
    WordPair,
};

fn pack() -> WordPack {
    WordPack {
        id: PackId(1),
        name: "places".into(),
        creator: None,
        is_public: true,
        is_default: true,
        words: vec![
            WordPair::new("beach", "pool"),
            WordPair::new("airport", "train station"),
            WordPair::new("mountain", "hill"),
        ],
    }
}

fn game_with(players: u64, seed: u64) -> GameState {
    let mut game = GameState::new(
        GameId(1),
        PlayerId(1),
        &pack(),
        "GAMES1".parse().unwrap(),
        0,
    )
    .unwrap();
    for i in 2..=players {
        game.join(PlayerId(i)).unwrap();
    }
    game.start_round(PlayerId(1), &mut StdRng::seed_from_u64(seed))
        .unwrap();
    game
}

/// Walks every active player through one turn; ends in voting.
fn speak_round(game: &mut GameState) {
    while game.session().status == GameStatus::Playing {
        let speaker = game.session().current_turn.unwrap();
        game.advance_turn(speaker).unwrap();
    }
}

fn active_ids(game: &GameState) -> Vec<PlayerId> {
    roster::active(game.seats()).map(|s| s.player).collect()
}

/// Turn-order indices among active players are exactly {0..n-1}.
fn assert_dense_turn_order(game: &GameState) {
    let mut orders: Vec<usize> = roster::active(game.seats())
        .map(|s| s.turn_order.expect("assigned after round start"))
        .collect();
    orders.sort_unstable();
    let expected: Vec<usize> = (0..orders.len()).collect();
    assert_eq!(orders, expected, "turn order must be a dense permutation");
}

#[test]
fn test_defenders_win_after_two_rounds() {
    let mut game = game_with(5, 3);
    let impostor = game.impostor().unwrap();
    assert_dense_turn_order(&game);

    // Round 1: everyone skips, so nothing happens but a new round.
    speak_round(&mut game);
    for p in active_ids(&game) {
        game.submit_vote(p, Ballot::Skip).unwrap();
    }
    assert_eq!(game.resolve(1).unwrap(), Resolution::NewRound { round: 2 });
    assert_dense_turn_order(&game);

    // Round 2: the table converges on the impostor.
    speak_round(&mut game);
    for p in active_ids(&game) {
        game.submit_vote(p, Ballot::Player(impostor)).unwrap();
    }
    assert_eq!(
        game.resolve(2).unwrap(),
        Resolution::Finished { outcome: GameOutcome::ImpostorCaught }
    );
    assert_eq!(game.session().status, GameStatus::Finished);
    assert_eq!(game.session().round, 2);
}

#[test]
fn test_impostor_survives_to_the_end() {
    // 4 players: two wrong ejections leave 2 actives, impostor wins.
    let mut game = game_with(4, 5);
    let impostor = game.impostor().unwrap();

    speak_round(&mut game);
    let victim1 = active_ids(&game)
        .into_iter()
        .find(|p| *p != impostor)
        .unwrap();
    for p in active_ids(&game) {
        game.submit_vote(p, Ballot::Player(victim1)).unwrap();
    }
    assert_eq!(
        game.resolve(1).unwrap(),
        Resolution::PlayerEjected { player: victim1, round: 2 }
    );
    assert_dense_turn_order(&game);
    assert_eq!(roster::active_count(game.seats()), 3);

    speak_round(&mut game);
    let victim2 = active_ids(&game)
        .into_iter()
        .find(|p| *p != impostor)
        .unwrap();
    for p in active_ids(&game) {
        game.submit_vote(p, Ballot::Player(victim2)).unwrap();
    }
    assert_eq!(
        game.resolve(2).unwrap(),
        Resolution::Finished { outcome: GameOutcome::ImpostorWins }
    );
}

#[test]
fn test_round_number_never_decreases() {
    let mut game = game_with(4, 11);
    let mut last = game.session().round;
    for expected in 1..=3 {
        speak_round(&mut game);
        for p in active_ids(&game) {
            game.submit_vote(p, Ballot::Skip).unwrap();
        }
        game.resolve(expected).unwrap();
        assert!(game.session().round >= last);
        last = game.session().round;
    }
    assert_eq!(last, 4);
}

#[test]
fn test_votes_from_previous_rounds_are_ignored() {
    let mut game = game_with(4, 2);
    let impostor = game.impostor().unwrap();

    // Round 1 votes all target the impostor... except they tie with skip.
    speak_round(&mut game);
    let mut actives = active_ids(&game);
    actives.sort_by_key(|p| p.0);
    game.submit_vote(actives[0], Ballot::Player(impostor)).unwrap();
    game.submit_vote(actives[1], Ballot::Player(impostor)).unwrap();
    game.submit_vote(actives[2], Ballot::Skip).unwrap();
    game.submit_vote(actives[3], Ballot::Skip).unwrap();
    assert_eq!(game.resolve(1).unwrap(), Resolution::NewRound { round: 2 });

    // Round 2: everyone skips. The two round-1 impostor votes must not
    // leak into this tally, so skip wins and a third round begins.
    speak_round(&mut game);
    for p in active_ids(&game) {
        game.submit_vote(p, Ballot::Skip).unwrap();
    }
    assert_eq!(game.resolve(2).unwrap(), Resolution::NewRound { round: 3 });
    assert_eq!(game.session().status, GameStatus::Playing);
}

#[test]
fn test_kick_mid_turn_recovers_into_voting() {
    let mut game = game_with(5, 9);
    let speaker = game.session().current_turn.unwrap();
    game.kick(PlayerId(1), speaker).unwrap();

    // The rotation does not stall: advancing on behalf of the kicked
    // speaker lands in voting.
    game.advance_turn(speaker).unwrap();
    assert_eq!(game.session().status, GameStatus::Voting);
}

#[test]
fn test_newcomer_cannot_join_after_start() {
    let mut game = game_with(4, 1);
    let err = game.join(PlayerId(42)).unwrap_err();
    assert!(matches!(err, GameError::SessionAlreadyStarted(_)));
    // Existing members can re-join (client reconnect) without error.
    game.join(PlayerId(2)).unwrap();
    assert_eq!(game.seats().len(), 4);
}

#[test]
fn test_same_seed_same_game() {
    let a = game_with(6, 77);
    let b = game_with(6, 77);
    assert_eq!(a.session().word_index, b.session().word_index);
    assert_eq!(a.session().current_turn, b.session().current_turn);
    assert_eq!(a.impostor(), b.impostor());
    assert_eq!(a.seats(), b.seats());
}
