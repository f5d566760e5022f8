//! Live reload over WebSocket.
//!
//! ```text
//! FsActor -> RunnerActor -> WsActor -> Browser
//!  (watch)     (tasks)    (broadcast)
//! ```
//!
//! - `message` - JSON messages understood by the injected client script
//! - `server` - TCP acceptor handing new connections to `WsActor`

pub mod message;
pub mod server;
