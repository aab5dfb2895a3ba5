//! Game-related types.

use serde::{Deserialize, Serialize};

use super::chess::Color;
use super::player::Username;
use crate::chess::GameState;

/// Identifier of a persisted game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(u32);

impl GameId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a user participates in a game, derived from seat occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Holds the given seat.
    Player(Color),
    /// Holds no seat.
    Observer,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Player(color) => write!(f, "{color} player"),
            Self::Observer => write!(f, "observer"),
        }
    }
}

/// A game as persisted by the store and sent to clients in `LOAD_GAME`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    #[serde(rename = "gameID")]
    pub game_id: GameId,
    #[serde(rename = "gameName")]
    pub game_name: String,
    #[serde(rename = "whiteUsername", default)]
    pub white_username: Option<Username>,
    #[serde(rename = "blackUsername", default)]
    pub black_username: Option<Username>,
    pub game: GameState,
}

impl GameSnapshot {
    /// A fresh game in the standard starting position.
    #[must_use]
    pub fn new(
        game_id: GameId,
        game_name: impl Into<String>,
        white_username: Option<Username>,
        black_username: Option<Username>,
    ) -> Self {
        Self {
            game_id,
            game_name: game_name.into(),
            white_username,
            black_username,
            game: GameState::new(),
        }
    }

    /// The user holding the given seat.
    #[must_use]
    pub fn seat(&self, color: Color) -> Option<&Username> {
        match color {
            Color::White => self.white_username.as_ref(),
            Color::Black => self.black_username.as_ref(),
        }
    }

    /// The seat a user holds, if any. White is checked first.
    #[must_use]
    pub fn seat_of(&self, user: &Username) -> Option<Color> {
        if self.white_username.as_ref() == Some(user) {
            Some(Color::White)
        } else if self.black_username.as_ref() == Some(user) {
            Some(Color::Black)
        } else {
            None
        }
    }

    #[must_use]
    pub fn role_of(&self, user: &Username) -> Role {
        self.seat_of(user).map_or(Role::Observer, Role::Player)
    }

    /// Empty the user's seat. Returns the vacated color, if any.
    pub fn vacate(&mut self, user: &Username) -> Option<Color> {
        let color = self.seat_of(user)?;
        match color {
            Color::White => self.white_username = None,
            Color::Black => self.black_username = None,
        }
        Some(color)
    }
}
