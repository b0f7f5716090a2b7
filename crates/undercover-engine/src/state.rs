//! The session state machine.
//!
//! [`GameState`] owns one session's records — the session row, the
//! seats, the votes, and the word-pair snapshot — and is the sole
//! writer of status, round, and current-turn. Every operation checks
//! its precondition against the current status (and, where relevant,
//! the caller's expected round or speaker) and fails with
//! [`GameError::StaleTransition`] instead of applying a stale action.
//!
//! `GameState` is not thread-safe and does not need to be: the session
//! layer runs each instance inside its own actor task, so all mutation
//! is serialized and observers only ever see states between operations.

use rand::Rng;
use undercover_protocol::{
    Ballot, GameId, GameOutcome, GameSession, GameStatus, PlayerId,
    RoomCode, Seat, Vote, WordPack, WordPair,
};

use crate::roster::{self, MIN_PLAYERS};
use crate::round::{self, TurnAdvance};
use crate::tally::{self, VoteOutcome};
use crate::GameError;

/// What a call to [`GameState::resolve`] actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Quorum not reached; nothing changed.
    Pending,
    /// Tie or skip: a new round began.
    NewRound { round: u32 },
    /// An innocent player was voted out and the game continues.
    PlayerEjected { player: PlayerId, round: u32 },
    /// The game ended.
    Finished { outcome: GameOutcome },
    /// A racing caller already resolved this round; nothing changed.
    AlreadyResolved,
}

/// One session's full state and the rules that govern it.
#[derive(Debug)]
pub struct GameState {
    session: GameSession,
    seats: Vec<Seat>,
    votes: Vec<Vote>,
    /// Word pairs snapshotted from the pack at creation. Later edits to
    /// the pack never affect a running game.
    words: Vec<WordPair>,
}

impl GameState {
    /// Creates a session in the waiting state with the host seated.
    ///
    /// # Errors
    /// [`GameError::NoWordPack`] if the pack has no word pairs.
    pub fn new(
        id: GameId,
        host: PlayerId,
        pack: &WordPack,
        room_code: RoomCode,
        created_at_ms: u64,
    ) -> Result<Self, GameError> {
        if pack.words.is_empty() {
            return Err(GameError::NoWordPack);
        }
        let session = GameSession {
            id,
            host,
            pack_id: pack.id,
            room_code,
            status: GameStatus::Waiting,
            round: 1,
            word_index: None,
            current_turn: None,
            outcome: None,
            created_at_ms,
        };
        tracing::info!(game_id = %id, %host, code = %session.room_code, "game created");
        Ok(Self {
            session,
            seats: vec![Seat::new(host)],
            votes: Vec::new(),
            words: pack.words.clone(),
        })
    }

    // -- Accessors ---------------------------------------------------------

    /// The authoritative session record.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// All membership records, kicked included.
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    /// All votes across all rounds of this session.
    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    /// The secret word assigned to `player`, once a round has started.
    pub fn word_for(&self, player: PlayerId) -> Option<&str> {
        self.seats
            .iter()
            .find(|s| s.player == player)
            .and_then(|s| s.word.as_deref())
    }

    /// The active impostor, once a round has started.
    pub fn impostor(&self) -> Option<PlayerId> {
        roster::active(&self.seats)
            .find(|s| s.is_impostor)
            .map(|s| s.player)
    }

    /// The word pair in play, once a round has started.
    pub fn current_pair(&self) -> Option<&WordPair> {
        self.session.word_index.and_then(|i| self.words.get(i))
    }

    /// Whether `voter` has a recorded vote in `round`.
    pub fn has_voted(&self, round: u32, voter: PlayerId) -> bool {
        self.votes
            .iter()
            .any(|v| v.round == round && v.voter == voter)
    }

    // -- Roster ------------------------------------------------------------

    /// Adds a participant. See [`roster::join`] for the rules.
    pub fn join(&mut self, player: PlayerId) -> Result<(), GameError> {
        roster::join(&self.session, &mut self.seats, player)?;
        Ok(())
    }

    /// Marks a player kicked. Host-only; see [`roster::kick`].
    ///
    /// If the kicked player was mid-turn, the rotation recovers at the
    /// next `advance_turn` call (treated as end-of-round).
    pub fn kick(
        &mut self,
        actor: PlayerId,
        target: PlayerId,
    ) -> Result<(), GameError> {
        roster::kick(&self.session, &mut self.seats, actor, target)
    }

    /// Removes a participant's membership entirely.
    ///
    /// Mid-game departures apply the recovery rules:
    /// - the impostor leaving finishes the game ([`GameOutcome::ImpostorFled`]);
    /// - dropping below the minimum roster finishes the game
    ///   ([`GameOutcome::ImpostorWins`], too few accusers remain);
    /// - the current speaker leaving moves the session to voting, the
    ///   same as the kicked-mid-turn rule.
    ///
    /// # Errors
    /// [`GameError::NoActiveSession`] if `player` is not a member.
    pub fn leave(&mut self, player: PlayerId) -> Result<(), GameError> {
        let seat = roster::leave(&mut self.seats, player)
            .ok_or(GameError::NoActiveSession(player))?;
        tracing::info!(
            game_id = %self.session.id,
            %player,
            players = self.seats.len(),
            "player left"
        );

        let mid_game = matches!(
            self.session.status,
            GameStatus::Playing | GameStatus::Voting
        );
        if !mid_game {
            return Ok(());
        }
        if seat.is_impostor && seat.is_active() {
            return self.finish(GameOutcome::ImpostorFled);
        }
        if roster::active_count(&self.seats) < MIN_PLAYERS {
            return self.finish(GameOutcome::ImpostorWins);
        }
        if self.session.status == GameStatus::Playing
            && self.session.current_turn == Some(player)
        {
            return self.begin_voting();
        }
        Ok(())
    }

    // -- Round lifecycle ---------------------------------------------------

    /// Starts the game: draws the word pair, shuffles the speaking
    /// order, seats the impostor, and moves to playing. Host-only.
    ///
    /// One-shot: words and the impostor flag are immutable afterwards.
    ///
    /// # Errors
    /// - [`GameError::NotAuthorized`] — `actor` is not the host
    /// - [`GameError::StaleTransition`] — status is not waiting
    /// - [`GameError::NotEnoughPlayers`] / [`GameError::NoWordPack`]
    pub fn start_round<R: Rng + ?Sized>(
        &mut self,
        actor: PlayerId,
        rng: &mut R,
    ) -> Result<(), GameError> {
        if actor != self.session.host {
            return Err(GameError::NotAuthorized(actor));
        }
        if self.session.status != GameStatus::Waiting {
            return Err(GameError::StaleTransition(format!(
                "cannot start a game that is {}",
                self.session.status
            )));
        }

        let setup = round::assign_round(&mut self.seats, &self.words, rng)?;
        self.transition(GameStatus::Playing)?;
        self.session.word_index = Some(setup.word_index);
        self.session.current_turn = Some(setup.first_speaker);
        tracing::info!(
            game_id = %self.session.id,
            players = roster::active_count(&self.seats),
            first_speaker = %setup.first_speaker,
            "round started"
        );
        Ok(())
    }

    /// Hands the turn to the next active player, or begins voting when
    /// the round is complete.
    ///
    /// Guarded by the caller's view of the current speaker: if
    /// `expected_speaker` no longer holds the turn, the call fails with
    /// [`GameError::StaleTransition`] instead of double-advancing (a
    /// client retrying after a timeout races the first attempt).
    pub fn advance_turn(
        &mut self,
        expected_speaker: PlayerId,
    ) -> Result<(), GameError> {
        if self.session.status != GameStatus::Playing {
            return Err(GameError::StaleTransition(format!(
                "cannot advance turn while {}",
                self.session.status
            )));
        }
        if self.session.current_turn != Some(expected_speaker) {
            return Err(GameError::StaleTransition(format!(
                "turn already moved past {expected_speaker}"
            )));
        }

        match round::next_speaker(&self.seats, expected_speaker) {
            TurnAdvance::Next(next) => {
                self.session.current_turn = Some(next);
                tracing::debug!(
                    game_id = %self.session.id,
                    speaker = %next,
                    "turn advanced"
                );
                Ok(())
            }
            TurnAdvance::RoundComplete => self.begin_voting(),
        }
    }

    // -- Voting ------------------------------------------------------------

    /// Records a vote for the current round. Atomic: either the vote is
    /// appended or nothing changes.
    ///
    /// # Errors
    /// - [`GameError::StaleTransition`] — status is not voting
    /// - [`GameError::NoActiveSession`] — voter is not an active member
    /// - [`GameError::AlreadyVoted`] — second vote in the same round
    pub fn submit_vote(
        &mut self,
        voter: PlayerId,
        ballot: Ballot,
    ) -> Result<(), GameError> {
        if self.session.status != GameStatus::Voting {
            return Err(GameError::StaleTransition(format!(
                "cannot vote while {}",
                self.session.status
            )));
        }
        let is_active = self
            .seats
            .iter()
            .any(|s| s.player == voter && s.is_active());
        if !is_active {
            return Err(GameError::NoActiveSession(voter));
        }
        let round = self.session.round;
        if self.has_voted(round, voter) {
            return Err(GameError::AlreadyVoted { voter, round });
        }
        self.votes.push(Vote {
            round,
            voter,
            ballot,
        });
        tracing::debug!(game_id = %self.session.id, %voter, round, "vote recorded");
        Ok(())
    }

    /// Resolves the vote for `expected_round` once quorum is reached.
    ///
    /// Effectively idempotent: the round number acts as the guard, so
    /// redundant calls racing to detect quorum cannot double-increment
    /// the round or double-kick a player. The first effective caller
    /// applies the consequence; later callers with the now-stale round
    /// get [`Resolution::AlreadyResolved`] and change nothing. Below
    /// quorum the result is [`Resolution::Pending`], also side-effect
    /// free.
    pub fn resolve(
        &mut self,
        expected_round: u32,
    ) -> Result<Resolution, GameError> {
        let current = self.session.round;
        match self.session.status {
            GameStatus::Voting if current == expected_round => {}
            GameStatus::Finished => return Ok(Resolution::AlreadyResolved),
            _ if current > expected_round => {
                return Ok(Resolution::AlreadyResolved);
            }
            status => {
                return Err(GameError::StaleTransition(format!(
                    "cannot resolve round {expected_round} while {status} in round {current}"
                )));
            }
        }

        match tally::outcome(&self.votes, current, &self.seats) {
            VoteOutcome::Waiting => Ok(Resolution::Pending),
            VoteOutcome::Tie | VoteOutcome::SkipWins => {
                self.new_round()?;
                tracing::info!(
                    game_id = %self.session.id,
                    round = self.session.round,
                    "no winner, new round"
                );
                Ok(Resolution::NewRound {
                    round: self.session.round,
                })
            }
            VoteOutcome::ImpostorCaught(player) => {
                tracing::info!(
                    game_id = %self.session.id,
                    impostor = %player,
                    "impostor caught"
                );
                self.finish(GameOutcome::ImpostorCaught)?;
                Ok(Resolution::Finished {
                    outcome: GameOutcome::ImpostorCaught,
                })
            }
            VoteOutcome::WrongVote(player) => {
                if let Some(seat) =
                    self.seats.iter_mut().find(|s| s.player == player)
                {
                    seat.is_kicked = true;
                }
                tracing::info!(
                    game_id = %self.session.id,
                    ejected = %player,
                    "innocent player voted out"
                );
                if roster::active_count(&self.seats) <= 2 {
                    // Too few accusers remain; the impostor escapes.
                    self.finish(GameOutcome::ImpostorWins)?;
                    Ok(Resolution::Finished {
                        outcome: GameOutcome::ImpostorWins,
                    })
                } else {
                    self.new_round()?;
                    Ok(Resolution::PlayerEjected {
                        player,
                        round: self.session.round,
                    })
                }
            }
        }
    }

    // -- Internal transitions ----------------------------------------------

    /// Applies one edge of the status graph, rejecting anything else.
    fn transition(&mut self, to: GameStatus) -> Result<(), GameError> {
        let from = self.session.status;
        if !from.can_transition_to(to) {
            return Err(GameError::StaleTransition(format!(
                "no transition {from} -> {to}"
            )));
        }
        self.session.status = to;
        tracing::info!(game_id = %self.session.id, %from, %to, "status changed");
        Ok(())
    }

    fn begin_voting(&mut self) -> Result<(), GameError> {
        self.transition(GameStatus::Voting)
    }

    /// Increments the round and returns to playing with the turn reset
    /// to the first remaining active player.
    ///
    /// Turn orders are renumbered densely over the active seats
    /// (preserving relative order), closing any gap an eject left.
    fn new_round(&mut self) -> Result<(), GameError> {
        self.transition(GameStatus::Playing)?;
        self.session.round += 1;

        let mut active: Vec<usize> = self
            .seats
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_active())
            .map(|(i, _)| i)
            .collect();
        active.sort_by_key(|&i| self.seats[i].turn_order.unwrap_or(usize::MAX));
        for (pos, &i) in active.iter().enumerate() {
            self.seats[i].turn_order = Some(pos);
        }

        self.session.current_turn = round::first_speaker(&self.seats);
        Ok(())
    }

    /// Terminates the session. Forced finishes from the playing state
    /// (mid-game departures) pass through voting so every status change
    /// stays on the transition graph; callers observe only the final
    /// state because the session layer serializes operations.
    fn finish(&mut self, outcome: GameOutcome) -> Result<(), GameError> {
        if self.session.status == GameStatus::Playing {
            self.transition(GameStatus::Voting)?;
        }
        self.transition(GameStatus::Finished)?;
        self.session.outcome = Some(outcome);
        tracing::info!(game_id = %self.session.id, ?outcome, "game finished");
        Ok(())
    }
}
