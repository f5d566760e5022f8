//! `[serve]` section configuration.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    pub interface: IpAddr,
    /// HTTP port (next free port is used if taken).
    pub port: u16,
    /// Live-reload WebSocket port.
    pub ws_port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            ws_port: 35729,
        }
    }
}
