//! Live connections per game.

use std::sync::Arc;

use dashmap::DashMap;

use super::connection::{Connection, ConnectionId};
use crate::protocol::ServerMessage;
use crate::types::{GameId, Username};

type GameConnections = DashMap<Username, Arc<dyn Connection>>;

/// Maps each game to the connections of the users currently watching it.
///
/// Both levels are sharded maps: operations on one game only touch that
/// game's entry, and no send happens while a map guard is held. A connection
/// that is found closed, or that fails a send, is dropped from the registry.
#[derive(Default)]
pub struct SessionRegistry {
    games: DashMap<GameId, Arc<GameConnections>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `conn` as `user`'s connection to `game_id`, replacing any
    /// previous one.
    pub fn add(&self, game_id: GameId, user: Username, conn: Arc<dyn Connection>) {
        // Insert under the outer entry guard so a concurrent empty-game sweep
        // cannot drop the map between lookup and insert.
        let game = self.games.entry(game_id).or_default();
        if let Some(previous) = game.insert(user.clone(), conn) {
            tracing::debug!(%game_id, %user, conn = %previous.id(), "replaced connection");
        }
    }

    /// Remove `user` from `game_id`, if present.
    pub fn remove(&self, game_id: GameId, user: &Username) {
        if let Some(game) = self.game(game_id) {
            game.remove(user);
        }
        self.sweep(game_id);
    }

    /// Send to `user`'s connection in whichever game it is found first.
    ///
    /// Returns whether the event was delivered.
    pub fn unicast(&self, user: &Username, message: &ServerMessage) -> bool {
        let found = self.games.iter().find_map(|entry| {
            entry
                .value()
                .get(user)
                .map(|conn| (*entry.key(), Arc::clone(conn.value())))
        });
        match found {
            Some((game_id, conn)) => self.deliver(game_id, user, &conn, message),
            None => false,
        }
    }

    /// Send to `user`'s connection in `game_id`. Returns whether it was delivered.
    pub fn send_to(&self, game_id: GameId, user: &Username, message: &ServerMessage) -> bool {
        let conn = self
            .game(game_id)
            .and_then(|game| game.get(user).map(|c| Arc::clone(c.value())));
        match conn {
            Some(conn) => self.deliver(game_id, user, &conn, message),
            None => false,
        }
    }

    /// Send to every open connection in `game_id` except `exclude`.
    ///
    /// Closed connections, including the excluded user's, are pruned.
    /// Returns the number of connections the event was delivered to.
    pub fn broadcast(
        &self,
        game_id: GameId,
        exclude: Option<&Username>,
        message: &ServerMessage,
    ) -> usize {
        let Some(game) = self.game(game_id) else {
            return 0;
        };
        let targets: Vec<(Username, Arc<dyn Connection>)> = game
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();

        let mut delivered = 0;
        for (user, conn) in targets {
            if !conn.is_open() {
                self.prune(game_id, &user, conn.id(), "closed");
                continue;
            }
            if exclude == Some(&user) {
                continue;
            }
            if self.deliver(game_id, &user, &conn, message) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Drop every entry that refers to the transport `conn_id`.
    ///
    /// Returns the games the connection was removed from.
    pub fn remove_connection(&self, conn_id: ConnectionId) -> Vec<GameId> {
        let games: Vec<(GameId, Arc<GameConnections>)> = self
            .games
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();

        let mut affected = Vec::new();
        for (game_id, game) in games {
            let before = game.len();
            game.retain(|_, conn| conn.id() != conn_id);
            if game.len() != before {
                affected.push(game_id);
            }
            self.sweep(game_id);
        }
        affected
    }

    /// Users currently registered for `game_id`, sorted.
    #[must_use]
    pub fn participants(&self, game_id: GameId) -> Vec<Username> {
        let mut users: Vec<Username> = self
            .game(game_id)
            .map(|game| game.iter().map(|e| e.key().clone()).collect())
            .unwrap_or_default();
        users.sort();
        users
    }

    /// Number of games with at least one registered connection.
    #[must_use]
    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    fn game(&self, game_id: GameId) -> Option<Arc<GameConnections>> {
        self.games.get(&game_id).map(|g| Arc::clone(g.value()))
    }

    fn deliver(
        &self,
        game_id: GameId,
        user: &Username,
        conn: &Arc<dyn Connection>,
        message: &ServerMessage,
    ) -> bool {
        match conn.send(message) {
            Ok(()) => true,
            Err(e) => {
                self.prune(game_id, user, conn.id(), &e.to_string());
                false
            }
        }
    }

    /// Remove `user` from `game_id` only if still bound to `conn_id`, so a
    /// reconnect that already replaced the entry survives.
    fn prune(&self, game_id: GameId, user: &Username, conn_id: ConnectionId, reason: &str) {
        if let Some(game) = self.game(game_id) {
            if game.remove_if(user, |_, c| c.id() == conn_id).is_some() {
                tracing::warn!(%game_id, %user, conn = %conn_id, reason, "pruned connection");
            }
        }
        self.sweep(game_id);
    }

    fn sweep(&self, game_id: GameId) {
        self.games.remove_if(&game_id, |_, game| game.is_empty());
    }
}
