use std::net::SocketAddr;

/// Invalid server configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid configuration: {reason}")]
pub struct ConfigError {
    pub reason: String,
}

/// Configuration for the live-game server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP/WebSocket listener binds to. Default: 0.0.0.0:8080.
    pub listen_addr: SocketAddr,
    /// Route the WebSocket upgrade is served on. Default: "/ws".
    pub ws_path: String,
    /// Events queued per connection before it is treated as stalled and
    /// dropped from the registry. Default: 64.
    pub outbound_buffer: usize,
}

impl ServerConfig {
    /// Validate configuration values.
    ///
    /// Checks:
    /// - `outbound_buffer >= 1` (a zero-capacity queue can never deliver)
    /// - `ws_path` starts with `/`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.outbound_buffer == 0 {
            return Err(ConfigError {
                reason: "outbound_buffer must be >= 1".to_string(),
            });
        }
        if !self.ws_path.starts_with('/') {
            return Err(ConfigError {
                reason: format!("ws_path must start with '/', got {:?}", self.ws_path),
            });
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            ws_path: "/ws".to_string(),
            outbound_buffer: 64,
        }
    }
}
