//! Live client sessions: the transport abstraction and the per-game registry.

pub mod connection;
pub mod registry;

pub use connection::{ChannelConnection, Connection, ConnectionId, DeliveryError};
pub use registry::SessionRegistry;
