//! Actor system for watch mode.
//!
//! Message-passing concurrency between the watcher, the task runner and the
//! browser connections:
//!
//! ```text
//! FsActor --Run--> RunnerActor --Css/Reload/Error--> WsActor
//! (watch)          (tasks)                         (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher, debouncer and watch table
//! - `runner` - Runs tasks on blocking threads, coalesces reruns
//! - `ws` - WebSocket broadcast
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod runner;
pub mod ws;

pub use coordinator::Coordinator;
