use crate::chess::ChessError;
use crate::types::GameId;

/// Category of a command failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthorized,
    NotFound,
    MalformedCommand,
    InvalidMove,
    AlreadyOver,
    Forbidden,
    StorageFault,
}

/// Errors a command can fail with. Each is reported only to the issuing
/// connection.
#[derive(Debug, thiserror::Error)]
pub enum LiveGameError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("game {game_id} not found")]
    NotFound { game_id: GameId },

    #[error("malformed command: {reason}")]
    MalformedCommand { reason: String },

    #[error("{reason}")]
    InvalidMove { reason: String },

    #[error("game is already over")]
    AlreadyOver,

    #[error("{reason}")]
    Forbidden { reason: String },

    #[error("storage fault: {reason}")]
    StorageFault {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl LiveGameError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::MalformedCommand { .. } => ErrorKind::MalformedCommand,
            Self::InvalidMove { .. } => ErrorKind::InvalidMove,
            Self::AlreadyOver => ErrorKind::AlreadyOver,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::StorageFault { .. } => ErrorKind::StorageFault,
        }
    }

    pub(crate) fn invalid_move(reason: impl Into<String>) -> Self {
        Self::InvalidMove {
            reason: reason.into(),
        }
    }

    pub(crate) fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    /// Text carried by the `ERROR` event sent back to the client.
    #[must_use]
    pub fn client_message(&self) -> String {
        format!("Error: {self}")
    }
}

impl From<ChessError> for LiveGameError {
    fn from(err: ChessError) -> Self {
        match err {
            ChessError::GameOver => Self::AlreadyOver,
            other => Self::invalid_move(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for LiveGameError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedCommand {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChessMove, Position};

    #[test]
    fn error_display_messages() {
        let err = LiveGameError::NotFound {
            game_id: GameId::new(12),
        };
        assert_eq!(err.client_message(), "Error: game 12 not found");
        assert_eq!(
            LiveGameError::AlreadyOver.client_message(),
            "Error: game is already over"
        );
    }

    #[test]
    fn chess_errors_map_to_kinds() {
        let e2: Position = "e2".parse().unwrap();
        let e5: Position = "e5".parse().unwrap();
        let illegal: LiveGameError = ChessError::IllegalMove(ChessMove::new(e2, e5, None)).into();
        assert_eq!(illegal.kind(), ErrorKind::InvalidMove);
        assert_eq!(illegal.to_string(), "illegal move e2e5");

        let over: LiveGameError = ChessError::GameOver.into();
        assert_eq!(over.kind(), ErrorKind::AlreadyOver);
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LiveGameError>();
    }
}
