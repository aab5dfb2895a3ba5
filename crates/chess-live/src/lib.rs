//! # Chess Live
//!
//! A chess rules engine with live, per-game synchronization of connected
//! clients.
//!
//! ## Features
//!
//! - **Rules**: `chess` - board model, move generation, check/checkmate/stalemate
//! - **Sessions**: `session` - per-game registry of live connections
//! - **Dispatch**: `controller` - authenticated commands serialized per game
//! - **Wire format**: `protocol` - tagged JSON commands and events
//! - **Transport**: `ws` - axum WebSocket adapter

pub mod chess;
pub mod config;
pub mod controller;
pub mod error;
pub mod protocol;
pub mod session;
pub mod store;
pub mod types;
pub mod ws;

pub use config::ServerConfig;
pub use controller::GameSessionController;
pub use error::{ErrorKind, LiveGameError};
pub use protocol::{CommandKind, ServerMessage, UserGameCommand};
