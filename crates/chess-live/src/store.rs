//! External collaborators: the persisted game store and the auth resolver.
//!
//! The live-game core only needs `load`/`save` by id and token resolution.
//! The in-memory implementations here back the tests and the demo server.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::Deserialize;

use crate::chess::{Board, ChessError, GameState, PlacementError};
use crate::error::LiveGameError;
use crate::types::{Color, GameId, GameSnapshot, Username};

/// Resolves an auth token to the user it belongs to.
#[async_trait]
pub trait AuthResolver: Send + Sync {
    /// Fails with [`LiveGameError::Unauthorized`] for unknown tokens.
    async fn resolve(&self, token: &str) -> Result<Username, LiveGameError>;
}

/// Persisted games keyed by id.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Fails with [`LiveGameError::NotFound`] for unknown games.
    async fn load(&self, game_id: GameId) -> Result<GameSnapshot, LiveGameError>;

    /// Fails with [`LiveGameError::StorageFault`] if the write cannot be made.
    async fn save(&self, game_id: GameId, snapshot: &GameSnapshot) -> Result<(), LiveGameError>;
}

/// In-memory token table.
#[derive(Default)]
pub struct MemoryAuthResolver {
    tokens: RwLock<HashMap<String, Username>>,
}

impl MemoryAuthResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, token: impl Into<String>, user: impl Into<Username>) {
        self.tokens.write().insert(token.into(), user.into());
    }

    pub fn revoke(&self, token: &str) -> Option<Username> {
        self.tokens.write().remove(token)
    }
}

#[async_trait]
impl AuthResolver for MemoryAuthResolver {
    async fn resolve(&self, token: &str) -> Result<Username, LiveGameError> {
        self.tokens
            .read()
            .get(token)
            .cloned()
            .ok_or(LiveGameError::Unauthorized)
    }
}

/// In-memory game table with sequential ids starting at 1.
pub struct MemoryGameStore {
    inner: Mutex<Inner>,
}

struct Inner {
    games: HashMap<GameId, GameSnapshot>,
    next_id: u32,
}

impl MemoryGameStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                games: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Create a game in the starting position and return its id.
    pub fn create(
        &self,
        game_name: impl Into<String>,
        white: Option<Username>,
        black: Option<Username>,
    ) -> GameId {
        self.create_with(game_name, white, black, GameState::new())
    }

    /// Create a game from an existing state and return its id.
    pub fn create_with(
        &self,
        game_name: impl Into<String>,
        white: Option<Username>,
        black: Option<Username>,
        game: GameState,
    ) -> GameId {
        let mut inner = self.inner.lock();
        let game_id = GameId::new(inner.next_id);
        inner.next_id += 1;
        let mut snapshot = GameSnapshot::new(game_id, game_name, white, black);
        snapshot.game = game;
        inner.games.insert(game_id, snapshot);
        game_id
    }
}

impl Default for MemoryGameStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GameStore for MemoryGameStore {
    async fn load(&self, game_id: GameId) -> Result<GameSnapshot, LiveGameError> {
        self.inner
            .lock()
            .games
            .get(&game_id)
            .cloned()
            .ok_or(LiveGameError::NotFound { game_id })
    }

    async fn save(&self, game_id: GameId, snapshot: &GameSnapshot) -> Result<(), LiveGameError> {
        let mut inner = self.inner.lock();
        match inner.games.get_mut(&game_id) {
            Some(slot) => {
                *slot = snapshot.clone();
                Ok(())
            }
            None => Err(LiveGameError::StorageFault {
                reason: format!("game {game_id} does not exist"),
                source: None,
            }),
        }
    }
}

/// Errors loading a fixtures file.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("invalid fixtures JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("fixture game {game_name:?}: {source}")]
    Board {
        game_name: String,
        #[source]
        source: PlacementError,
    },

    #[error("fixture game {game_name:?}: {source}")]
    Position {
        game_name: String,
        #[source]
        source: ChessError,
    },
}

/// Seed data for the in-memory collaborators, read from a JSON file.
///
/// ```json
/// {
///   "tokens": { "tok-alice": "alice", "tok-bob": "bob" },
///   "games": [
///     { "gameName": "casual", "whiteUsername": "alice", "blackUsername": "bob" },
///     { "gameName": "endgame", "board": "4k3/8/8/8/8/8/4P3/4K3", "turn": "BLACK" }
///   ]
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct Fixtures {
    #[serde(default)]
    pub tokens: HashMap<String, Username>,
    #[serde(default)]
    pub games: Vec<GameFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameFixture {
    pub game_name: String,
    #[serde(default)]
    pub white_username: Option<Username>,
    #[serde(default)]
    pub black_username: Option<Username>,
    /// Piece placement; the standard setup when absent.
    #[serde(default)]
    pub board: Option<String>,
    #[serde(default)]
    pub turn: Option<Color>,
}

impl Fixtures {
    pub fn from_json(text: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load the fixtures into the given collaborators. Returns the created game ids.
    ///
    /// Every game is validated before anything is written, so a bad entry
    /// leaves both collaborators untouched.
    pub fn apply(
        self,
        auth: &MemoryAuthResolver,
        store: &MemoryGameStore,
    ) -> Result<Vec<GameId>, FixtureError> {
        let games = self
            .games
            .into_iter()
            .map(|fixture| {
                let game = fixture.game_state()?;
                Ok((fixture, game))
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        for (token, user) in self.tokens {
            auth.insert(token, user);
        }
        Ok(games
            .into_iter()
            .map(|(fixture, game)| {
                store.create_with(
                    fixture.game_name,
                    fixture.white_username,
                    fixture.black_username,
                    game,
                )
            })
            .collect())
    }
}

impl GameFixture {
    fn game_state(&self) -> Result<GameState, FixtureError> {
        let Some(placement) = &self.board else {
            return Ok(GameState::new());
        };
        let board = Board::from_placement(placement).map_err(|source| FixtureError::Board {
            game_name: self.game_name.clone(),
            source,
        })?;
        GameState::from_board(board, self.turn.unwrap_or(Color::White)).map_err(|source| {
            FixtureError::Position {
                game_name: self.game_name.clone(),
                source,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn auth_resolves_known_tokens() {
        let auth = MemoryAuthResolver::new();
        auth.insert("t1", "alice");
        assert_eq!(auth.resolve("t1").await.unwrap(), Username::from("alice"));
        assert_eq!(auth.resolve("nope").await.unwrap_err().kind(), ErrorKind::Unauthorized);
        auth.revoke("t1");
        assert!(auth.resolve("t1").await.is_err());
    }

    #[tokio::test]
    async fn store_load_and_save() {
        let store = MemoryGameStore::new();
        let id = store.create("g", Some("alice".into()), None);
        assert_eq!(id, GameId::new(1));

        let mut snapshot = store.load(id).await.unwrap();
        snapshot.black_username = Some("bob".into());
        store.save(id, &snapshot).await.unwrap();
        assert_eq!(store.load(id).await.unwrap(), snapshot);

        let missing = GameId::new(42);
        assert_eq!(store.load(missing).await.unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(
            store.save(missing, &snapshot).await.unwrap_err().kind(),
            ErrorKind::StorageFault
        );
    }

    #[tokio::test]
    async fn fixtures_seed_collaborators() {
        let fixtures = Fixtures::from_json(
            r#"{
                "tokens": {"ta": "alice"},
                "games": [
                    {"gameName": "one", "whiteUsername": "alice"},
                    {"gameName": "two", "board": "4k3/8/8/8/8/8/4P3/4K3", "turn": "BLACK"}
                ]
            }"#,
        )
        .unwrap();
        let auth = MemoryAuthResolver::new();
        let store = MemoryGameStore::new();
        let ids = fixtures.apply(&auth, &store).unwrap();

        assert_eq!(ids, vec![GameId::new(1), GameId::new(2)]);
        assert_eq!(auth.resolve("ta").await.unwrap(), Username::from("alice"));
        let two = store.load(ids[1]).await.unwrap();
        assert_eq!(two.game.turn(), Color::Black);
        assert_eq!(two.game.board().placement(), "4k3/8/8/8/8/8/4P3/4K3");
    }

    #[test]
    fn bad_fixture_game_writes_nothing() {
        let fixtures = Fixtures::from_json(
            r#"{
                "tokens": {"ta": "alice"},
                "games": [
                    {"gameName": "fine"},
                    {"gameName": "broken", "board": "4k3/8/8"}
                ]
            }"#,
        )
        .unwrap();
        let auth = MemoryAuthResolver::new();
        let store = MemoryGameStore::new();

        let err = fixtures.apply(&auth, &store).unwrap_err();
        assert!(matches!(err, FixtureError::Board { ref game_name, .. } if game_name == "broken"));
        assert!(err.to_string().starts_with("fixture game \"broken\""), "{err}");
        assert!(store.inner.lock().games.is_empty());
        assert!(auth.tokens.read().is_empty());

        assert!(matches!(
            Fixtures::from_json("{"),
            Err(FixtureError::Json(_))
        ));
    }
}
