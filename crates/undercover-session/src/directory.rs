//! Game directory: creates games, resolves room codes, routes players.
//!
//! This is the entry point for higher layers (an API handler, a bot, a
//! test harness). It owns the map from room codes to running game
//! actors and tracks which game each participant is currently in — a
//! participant can be in at most one game at a time.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand::rngs::StdRng;
use undercover_engine::GameError;
use undercover_protocol::{GameId, PackId, PlayerId, RoomCode};

use crate::actor::spawn_game;
use crate::{GameHandle, GameView, HostGate, PackProvider, SessionError};

/// Counter for generating unique game ids.
static NEXT_GAME_ID: AtomicU64 = AtomicU64::new(1);

/// Default command channel size for game actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Manages all live games.
pub struct GameDirectory<P, E> {
    /// Live games, keyed by room code.
    games: HashMap<RoomCode, GameHandle>,
    /// Which game each participant is in. At most one per player.
    player_games: HashMap<PlayerId, RoomCode>,
    packs: P,
    gate: E,
}

impl<P: PackProvider, E: HostGate> GameDirectory<P, E> {
    /// Creates an empty directory over the given collaborators.
    pub fn new(packs: P, gate: E) -> Self {
        Self {
            games: HashMap::new(),
            player_games: HashMap::new(),
            packs,
            gate,
        }
    }

    /// Creates a game hosted by `host` using the pack `pack_id`, and
    /// seats the host. Returns the handle; its room code addresses the
    /// game for everyone else.
    ///
    /// # Errors
    /// - [`GameError::NotAuthorized`] — the entitlement gate refused
    /// - [`GameError::SessionAlreadyStarted`] — the host is already in
    ///   a live game. Carries that game's id; note this fires even when
    ///   that game is still waiting, since what it reports is "you have
    ///   a game already", not that game's phase.
    /// - [`GameError::NoWordPack`] — unknown pack or empty pair list
    pub fn create_game(
        &mut self,
        host: PlayerId,
        pack_id: PackId,
    ) -> Result<GameHandle, SessionError> {
        if !self.gate.may_host(host) {
            return Err(GameError::NotAuthorized(host).into());
        }
        if let Some(code) = self.player_games.get(&host).cloned() {
            if let Some(existing) = self.games.get(&code) {
                return Err(GameError::SessionAlreadyStarted(
                    existing.game_id(),
                )
                .into());
            }
            // Stale mapping; the game is already gone.
            self.player_games.remove(&host);
        }

        let pack = self.packs.fetch(pack_id)?;
        let game_id = GameId(NEXT_GAME_ID.fetch_add(1, Ordering::Relaxed));

        // Collisions among live games are rare (36^6 codes) but cheap
        // to dodge here.
        let mut rng = StdRng::from_os_rng();
        let mut code = RoomCode::generate(&mut rng);
        while self.games.contains_key(&code) {
            code = RoomCode::generate(&mut rng);
        }

        let handle = spawn_game(
            game_id,
            host,
            &pack,
            code.clone(),
            now_ms(),
            rng,
            DEFAULT_CHANNEL_SIZE,
        )?;
        self.games.insert(code.clone(), handle.clone());
        self.player_games.insert(host, code.clone());
        tracing::info!(%game_id, %code, %host, "game registered");
        Ok(handle)
    }

    /// Joins `player` to the game addressed by `code`.
    ///
    /// A participant can be in at most one game at a time: joining a
    /// second game is rejected until they leave the first, so the first
    /// game's capacity and vote quorum never count an abandoned seat.
    /// Re-joining the game the player is already in passes through (the
    /// roster treats it as an idempotent reconnect).
    ///
    /// # Errors
    /// - [`GameError::SessionNotFound`] — no live game has this code
    /// - [`GameError::SessionAlreadyStarted`] — the player is in a
    ///   different live game (carries that game's id)
    /// - plus whatever the roster rules reject (started, full)
    pub async fn join_game(
        &mut self,
        player: PlayerId,
        code: &RoomCode,
    ) -> Result<(GameHandle, GameView), SessionError> {
        if let Some(current) = self.player_games.get(&player).cloned() {
            if current != *code {
                if let Some(existing) = self.games.get(&current) {
                    return Err(GameError::SessionAlreadyStarted(
                        existing.game_id(),
                    )
                    .into());
                }
                // Stale mapping; the game is already gone.
                self.player_games.remove(&player);
            }
        }

        let handle = self
            .games
            .get(code)
            .cloned()
            .ok_or_else(|| GameError::SessionNotFound(code.clone()))?;
        let view = handle.join(player).await?;
        self.player_games.insert(player, code.clone());
        Ok((handle, view))
    }

    /// Removes `player` from their current game.
    ///
    /// # Errors
    /// [`GameError::NoActiveSession`] if the player is in no game.
    pub async fn leave_game(
        &mut self,
        player: PlayerId,
    ) -> Result<(), SessionError> {
        let code = self
            .player_games
            .get(&player)
            .cloned()
            .ok_or(GameError::NoActiveSession(player))?;

        if let Some(handle) = self.games.get(&code) {
            handle.leave(player).await?;
        }
        self.player_games.remove(&player);
        Ok(())
    }

    /// Returns the handle for a live game, if any.
    pub fn find(&self, code: &RoomCode) -> Option<GameHandle> {
        self.games.get(code).cloned()
    }

    /// Returns the game a player is currently in, if any.
    pub fn player_game(&self, player: &PlayerId) -> Option<&RoomCode> {
        self.player_games.get(player)
    }

    /// Shuts a game down and forgets everyone who was in it.
    pub async fn remove_game(
        &mut self,
        code: &RoomCode,
    ) -> Result<(), SessionError> {
        let handle = self
            .games
            .remove(code)
            .ok_or_else(|| GameError::SessionNotFound(code.clone()))?;
        let _ = handle.shutdown().await;
        self.player_games.retain(|_, c| c != code);
        tracing::info!(%code, "game removed");
        Ok(())
    }

    /// Drops directory entries for games that have finished or whose
    /// actors are gone. Returns how many were pruned.
    pub async fn prune_finished(&mut self) -> usize {
        let mut dead = Vec::new();
        for (code, handle) in &self.games {
            match handle.snapshot().await {
                Ok(view) if !view.session.status.is_terminal() => {}
                _ => dead.push(code.clone()),
            }
        }
        for code in &dead {
            if let Some(handle) = self.games.remove(code) {
                let _ = handle.shutdown().await;
            }
            self.player_games.retain(|_, c| c != code);
            tracing::info!(code = %code, "finished game pruned");
        }
        dead.len()
    }

    /// Lists the packs `viewer` may create a game from.
    pub fn visible_packs(
        &self,
        viewer: PlayerId,
    ) -> Vec<undercover_protocol::WordPack> {
        self.packs.list_visible(viewer)
    }

    /// Number of live games.
    pub fn game_count(&self) -> usize {
        self.games.len()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
