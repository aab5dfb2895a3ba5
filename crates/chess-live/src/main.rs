//! Live chess server.
//!
//! Serves the WebSocket endpoint backed by in-memory auth and game stores,
//! optionally seeded from a JSON fixtures file.
//!
//! ```bash
//! FIXTURES=fixtures.json LISTEN_ADDR=127.0.0.1:8080 cargo run --package chess-live
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use chess_live::session::SessionRegistry;
use chess_live::store::{Fixtures, MemoryAuthResolver, MemoryGameStore};
use chess_live::ws::{create_router, AppState};
use chess_live::{GameSessionController, ServerConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "chess-live")]
#[command(about = "Live chess game server")]
struct Args {
    /// HTTP/WebSocket listen address.
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    listen_addr: SocketAddr,

    /// Route serving the WebSocket upgrade.
    #[arg(long, env = "WS_PATH", default_value = "/ws")]
    ws_path: String,

    /// Events queued per connection before it is dropped as stalled.
    #[arg(long, env = "OUTBOUND_BUFFER", default_value_t = 64)]
    outbound_buffer: usize,

    /// JSON file with auth tokens and games to preload.
    #[arg(long, env = "FIXTURES")]
    fixtures: Option<PathBuf>,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            listen_addr: self.listen_addr,
            ws_path: self.ws_path.clone(),
            outbound_buffer: self.outbound_buffer,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("chess_live=info".parse()?))
        .init();

    let args = Args::parse();
    let config = args.server_config();
    config.validate()?;

    let auth = Arc::new(MemoryAuthResolver::new());
    let store = Arc::new(MemoryGameStore::new());
    if let Some(path) = &args.fixtures {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading fixtures from {}", path.display()))?;
        let games = Fixtures::from_json(&text)
            .and_then(|fixtures| fixtures.apply(&auth, &store))
            .with_context(|| format!("loading fixtures from {}", path.display()))?;
        tracing::info!(games = games.len(), path = %path.display(), "loaded fixtures");
    }

    let controller = Arc::new(GameSessionController::new(
        Arc::new(SessionRegistry::new()),
        auth,
        store,
    ));
    let state = Arc::new(AppState {
        controller,
        outbound_buffer: config.outbound_buffer,
    });
    let app = create_router(state, &config.ws_path);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, path = %config.ws_path, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
