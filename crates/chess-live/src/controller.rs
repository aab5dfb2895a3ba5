//! Command dispatch for live games.
//!
//! Every command runs `resolve token → load snapshot → validate → mutate →
//! persist → emit events` while holding its game's lock, so commands on the
//! same game are applied (and their events emitted) one at a time, in order.
//! Commands on different games never share a lock.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::chess::Verdict;
use crate::error::LiveGameError;
use crate::protocol::{CommandKind, ServerMessage, UserGameCommand};
use crate::session::{Connection, ConnectionId, SessionRegistry};
use crate::store::{AuthResolver, GameStore};
use crate::types::{ChessMove, Color, GameId, GameSnapshot, Username};

/// Handles commands from connected clients.
///
/// Built once at startup with its collaborators and shared by every
/// connection.
pub struct GameSessionController {
    registry: Arc<SessionRegistry>,
    auth: Arc<dyn AuthResolver>,
    store: Arc<dyn GameStore>,
    game_locks: DashMap<GameId, Arc<Mutex<()>>>,
}

impl GameSessionController {
    pub fn new(
        registry: Arc<SessionRegistry>,
        auth: Arc<dyn AuthResolver>,
        store: Arc<dyn GameStore>,
    ) -> Self {
        Self {
            registry,
            auth,
            store,
            game_locks: DashMap::new(),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Decode and handle one inbound text frame.
    pub async fn handle_text(&self, conn: &Arc<dyn Connection>, text: &str) {
        match UserGameCommand::from_json(text) {
            Ok(command) => self.handle(conn, command).await,
            Err(err) => self.report(conn, None, &err),
        }
    }

    /// Handle a command, reporting any failure to `conn` as an `ERROR` event.
    pub async fn handle(&self, conn: &Arc<dyn Connection>, command: UserGameCommand) {
        let game_id = command.game_id;
        if let Err(err) = self.execute(conn, command).await {
            self.report(conn, Some(game_id), &err);
        }
    }

    /// Run a command. A failed command has made no persistent change and
    /// sent nothing to other participants.
    pub async fn execute(
        &self,
        conn: &Arc<dyn Connection>,
        command: UserGameCommand,
    ) -> Result<(), LiveGameError> {
        let UserGameCommand {
            auth_token,
            game_id,
            kind,
        } = command;

        let user = self.auth.resolve(&auth_token).await?;
        tracing::debug!(%game_id, %user, conn = %conn.id(), command = kind.name(), "dispatching");

        let lock = self.lock_for(game_id);
        let result = {
            let _guard = lock.lock().await;
            self.dispatch(conn, user, game_id, kind).await
        };
        drop(lock);
        self.release_lock(game_id);
        result
    }

    /// Purge a closed transport from every game it was registered in.
    pub fn disconnect(&self, conn_id: ConnectionId) {
        let games = self.registry.remove_connection(conn_id);
        if !games.is_empty() {
            tracing::info!(conn = %conn_id, games = ?games, "connection closed");
        }
    }

    async fn dispatch(
        &self,
        conn: &Arc<dyn Connection>,
        user: Username,
        game_id: GameId,
        kind: CommandKind,
    ) -> Result<(), LiveGameError> {
        let snapshot = self.store.load(game_id).await?;
        match kind {
            CommandKind::Connect => {
                self.connect(conn, user, snapshot);
                Ok(())
            }
            CommandKind::MakeMove { chess_move } => self.make_move(user, snapshot, chess_move).await,
            CommandKind::Leave => self.leave(user, snapshot).await,
            CommandKind::Resign => self.resign(user, snapshot).await,
        }
    }

    fn connect(&self, conn: &Arc<dyn Connection>, user: Username, snapshot: GameSnapshot) {
        let game_id = snapshot.game_id;
        let role = snapshot.role_of(&user);

        self.registry.add(game_id, user.clone(), Arc::clone(conn));
        self.registry
            .send_to(game_id, &user, &ServerMessage::load_game(snapshot));
        self.registry.broadcast(
            game_id,
            Some(&user),
            &ServerMessage::notification(format!("{user} connected as {role}")),
        );
        tracing::info!(%game_id, %user, %role, "connected");
    }

    async fn make_move(
        &self,
        user: Username,
        mut snapshot: GameSnapshot,
        chess_move: ChessMove,
    ) -> Result<(), LiveGameError> {
        let game_id = snapshot.game_id;
        if snapshot.game.is_over() {
            return Err(LiveGameError::AlreadyOver);
        }

        let start = chess_move.start_position;
        let piece = snapshot
            .game
            .board()
            .get(start)
            .ok_or_else(|| LiveGameError::invalid_move(format!("no piece at {start}")))?;
        let color = snapshot
            .seat_of(&user)
            .ok_or_else(|| LiveGameError::forbidden("observers cannot make moves"))?;
        if piece.color != color {
            return Err(LiveGameError::forbidden("cannot move opponent's piece"));
        }
        if snapshot.game.turn() != color {
            return Err(LiveGameError::invalid_move("not your turn"));
        }

        let applied = snapshot.game.make_move(chess_move)?;
        let verdict = snapshot.game.settle();
        self.store.save(game_id, &snapshot).await?;

        let opponent = opponent_label(&snapshot, color);
        let mut description = format!(
            "{user} moved {} from {} to {}",
            applied.piece, start, chess_move.end_position
        );
        if let Some(captured) = applied.captured {
            description.push_str(&format!(", capturing {captured}"));
        }
        if let Some(promotion) = chess_move.promotion {
            description.push_str(&format!(", promoting to {promotion}"));
        }

        self.registry
            .broadcast(game_id, None, &ServerMessage::load_game(snapshot));
        self.registry
            .broadcast(game_id, Some(&user), &ServerMessage::notification(description));

        let follow_up = match verdict {
            Some(Verdict::Checkmate) => Some(format!("{user} checkmated {opponent}")),
            Some(Verdict::Stalemate) => Some(format!("Stalemate: {opponent} has no legal moves")),
            Some(Verdict::Check) => Some(format!("{user} put {opponent} in check")),
            None => None,
        };
        if let Some(message) = follow_up {
            self.registry
                .broadcast(game_id, None, &ServerMessage::notification(message));
        }
        if matches!(verdict, Some(Verdict::Checkmate | Verdict::Stalemate)) {
            tracing::info!(%game_id, %user, ?verdict, "game over");
        }
        Ok(())
    }

    async fn leave(&self, user: Username, mut snapshot: GameSnapshot) -> Result<(), LiveGameError> {
        let game_id = snapshot.game_id;
        if let Some(color) = snapshot.vacate(&user) {
            self.store.save(game_id, &snapshot).await?;
            tracing::info!(%game_id, %user, %color, "seat vacated");
        }

        self.registry.broadcast(
            game_id,
            Some(&user),
            &ServerMessage::notification(format!("{user} left the game")),
        );
        self.registry.remove(game_id, &user);
        Ok(())
    }

    async fn resign(&self, user: Username, mut snapshot: GameSnapshot) -> Result<(), LiveGameError> {
        let game_id = snapshot.game_id;
        if snapshot.seat_of(&user).is_none() {
            return Err(LiveGameError::forbidden("observers cannot resign"));
        }
        snapshot.game.resign()?;
        self.store.save(game_id, &snapshot).await?;

        self.registry.broadcast(
            game_id,
            None,
            &ServerMessage::notification(format!("{user} resigned")),
        );
        tracing::info!(%game_id, %user, "resigned");
        Ok(())
    }

    fn lock_for(&self, game_id: GameId) -> Arc<Mutex<()>> {
        Arc::clone(self.game_locks.entry(game_id).or_default().value())
    }

    /// Drop the game's lock once no other command holds or awaits it.
    ///
    /// `lock_for` clones under the same shard lock `remove_if` takes, so a
    /// count of one means no task can still be using this mutex.
    fn release_lock(&self, game_id: GameId) {
        self.game_locks
            .remove_if(&game_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    fn report(&self, conn: &Arc<dyn Connection>, game_id: Option<GameId>, err: &LiveGameError) {
        tracing::debug!(game_id = ?game_id, conn = %conn.id(), kind = ?err.kind(), error = %err, "command rejected");
        if let Err(e) = conn.send(&ServerMessage::error(err)) {
            tracing::warn!(conn = %conn.id(), error = %e, "could not deliver error event");
        }
    }
}

/// The opponent's username, or their color if the seat is empty.
fn opponent_label(snapshot: &GameSnapshot, mover: Color) -> String {
    let color = mover.opposite();
    snapshot
        .seat(color)
        .map_or_else(|| color.to_string(), ToString::to_string)
}
