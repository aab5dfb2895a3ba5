//! Wire messages exchanged with connected clients.
//!
//! Both directions are JSON objects discriminated by a single tag field:
//! `commandType` for inbound commands and `serverMessageType` for events.

use serde::{Deserialize, Serialize};

use crate::error::LiveGameError;
use crate::types::{ChessMove, GameId, GameSnapshot};

/// An inbound command. The auth token and game id are common to every kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGameCommand {
    #[serde(rename = "authToken")]
    pub auth_token: String,
    #[serde(rename = "gameID")]
    pub game_id: GameId,
    #[serde(flatten)]
    pub kind: CommandKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "commandType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandKind {
    Connect,
    MakeMove {
        #[serde(rename = "move")]
        chess_move: ChessMove,
    },
    Leave,
    Resign,
}

impl CommandKind {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::MakeMove { .. } => "make_move",
            Self::Leave => "leave",
            Self::Resign => "resign",
        }
    }
}

impl UserGameCommand {
    pub fn connect(auth_token: impl Into<String>, game_id: GameId) -> Self {
        Self::with_kind(auth_token, game_id, CommandKind::Connect)
    }

    pub fn make_move(auth_token: impl Into<String>, game_id: GameId, chess_move: ChessMove) -> Self {
        Self::with_kind(auth_token, game_id, CommandKind::MakeMove { chess_move })
    }

    pub fn leave(auth_token: impl Into<String>, game_id: GameId) -> Self {
        Self::with_kind(auth_token, game_id, CommandKind::Leave)
    }

    pub fn resign(auth_token: impl Into<String>, game_id: GameId) -> Self {
        Self::with_kind(auth_token, game_id, CommandKind::Resign)
    }

    fn with_kind(auth_token: impl Into<String>, game_id: GameId, kind: CommandKind) -> Self {
        Self {
            auth_token: auth_token.into(),
            game_id,
            kind,
        }
    }

    /// Decode a text frame.
    pub fn from_json(text: &str) -> Result<Self, LiveGameError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// An outbound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "serverMessageType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// Full current state of the game.
    LoadGame { game: GameSnapshot },
    /// Human-readable update for some of a game's participants.
    Notification { message: String },
    /// Failure report for the issuing connection only.
    Error {
        #[serde(rename = "errorMessage")]
        error_message: String,
    },
}

impl ServerMessage {
    #[must_use]
    pub fn load_game(game: GameSnapshot) -> Self {
        Self::LoadGame { game }
    }

    #[must_use]
    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(err: &LiveGameError) -> Self {
        Self::Error {
            error_message: err.client_message(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceType;

    #[test]
    fn test_decode_connect() {
        let cmd =
            UserGameCommand::from_json(r#"{"commandType":"CONNECT","authToken":"t1","gameID":3}"#)
                .unwrap();
        assert_eq!(cmd, UserGameCommand::connect("t1", GameId::new(3)));
    }

    #[test]
    fn test_decode_make_move() {
        let json = r#"{
            "commandType": "MAKE_MOVE",
            "authToken": "t1",
            "gameID": 3,
            "move": {
                "startPosition": {"row": 7, "col": 2},
                "endPosition": {"row": 8, "col": 2},
                "promotion": "ROOK"
            }
        }"#;
        let cmd = UserGameCommand::from_json(json).unwrap();
        let CommandKind::MakeMove { chess_move } = cmd.kind else {
            panic!("expected MAKE_MOVE, got {:?}", cmd.kind);
        };
        assert_eq!(chess_move.to_string(), "b7b8r");
        assert_eq!(chess_move.promotion, Some(PieceType::Rook));
    }

    #[test]
    fn test_decode_rejects_bad_shapes() {
        let cases = [
            "not json",
            r#"{"commandType":"CASTLE","authToken":"t","gameID":1}"#,
            r#"{"commandType":"CONNECT","gameID":1}"#,
            r#"{"commandType":"MAKE_MOVE","authToken":"t","gameID":1}"#,
            r#"{"commandType":"MAKE_MOVE","authToken":"t","gameID":1,"move":{"startPosition":{"row":9,"col":1},"endPosition":{"row":1,"col":1}}}"#,
        ];
        for case in cases {
            let err = UserGameCommand::from_json(case).unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::MalformedCommand, "{case}");
        }
    }

    #[test]
    fn test_encode_events() {
        let json = ServerMessage::notification("bob resigned").to_json().unwrap();
        assert_eq!(json, r#"{"serverMessageType":"NOTIFICATION","message":"bob resigned"}"#);

        let json = ServerMessage::error(&LiveGameError::Unauthorized).to_json().unwrap();
        assert_eq!(
            json,
            r#"{"serverMessageType":"ERROR","errorMessage":"Error: unauthorized"}"#
        );

        let snapshot = GameSnapshot::new(GameId::new(1), "g", None, None);
        let value: serde_json::Value =
            serde_json::from_str(&ServerMessage::load_game(snapshot).to_json().unwrap()).unwrap();
        assert_eq!(value["serverMessageType"], "LOAD_GAME");
        assert_eq!(value["game"]["gameID"], 1);
    }
}
