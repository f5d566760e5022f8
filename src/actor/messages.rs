//! Actor Message Definitions
//!
//! ```text
//! FsActor --Run--> RunnerActor --Css/Reload/Error--> WsActor
//! ```

use crate::core::TaskKind;

// =============================================================================
// RunnerActor Messages
// =============================================================================

/// Messages to Runner Actor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerMsg {
    /// Run each task once (a batch never names a task twice)
    Run(Vec<TaskKind>),
    /// Stop accepting work; running tasks still complete
    Shutdown,
}

// =============================================================================
// WsActor Messages
// =============================================================================

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Reload every page
    Reload { reason: String },
    /// Swap one stylesheet, by served path
    Css { href: String },
    /// Task error (display overlay, no reload)
    Error { path: String, error: String },
    /// Clear error overlay (task succeeded after error)
    ClearError,
    /// Add client
    AddClient(std::net::TcpStream),
    /// Close all clients and stop
    Shutdown,
}
