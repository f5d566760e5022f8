//! WebSocket Actor
//!
//! Owns every browser connection and broadcasts live-reload messages. The
//! last error is remembered so a page opened while a build is broken still
//! shows the overlay.
//!
//! ```text
//! RunnerActor --[Css/Reload/Error]--> WsActor --[broadcast]--> Clients
//! ```

mod client_io;
mod delivery;

use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;

use super::messages::WsMsg;
use crate::reload::message::HotReloadMessage;

/// Error currently displayed in the overlay
#[derive(Debug, Clone)]
struct PendingError {
    path: String,
    error: String,
}

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    /// Connected clients (shared with the reader thread)
    clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
    pending_error: Option<PendingError>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
            pending_error: None,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let clients_for_reader = Arc::clone(&self.clients);
        std::thread::spawn(move || Self::client_reader_loop(clients_for_reader));

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Reload { reason } => {
                    crate::debug!("ws"; "sending reload: {}", reason);
                    self.broadcast(&HotReloadMessage::reload_with_reason(reason));
                }
                WsMsg::Css { href } => {
                    crate::debug!("ws"; "sending css: {}", href);
                    self.broadcast(&HotReloadMessage::css(href));
                }
                WsMsg::Error { path, error } => {
                    self.broadcast(&HotReloadMessage::error(&path, &error));
                    self.pending_error = Some(PendingError { path, error });
                }
                WsMsg::ClearError => {
                    self.pending_error = None;
                    self.broadcast(&HotReloadMessage::clear_error());
                }
                WsMsg::AddClient(stream) => self.add_client(stream),
                WsMsg::Shutdown => break,
            }
        }

        crate::debug!("ws"; "shutting down");
        self.close_all();
    }

    #[cfg(test)]
    fn client_count(&self) -> usize {
        self.clients.lock().len()
    }
}
