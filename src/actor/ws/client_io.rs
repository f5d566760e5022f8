use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use crate::reload::message::HotReloadMessage;

use super::WsActor;

impl WsActor {
    /// Handshake, greet, and register a new client.
    pub(super) fn add_client(&self, stream: TcpStream) {
        // Blocking during handshake, non-blocking afterwards for polling reads
        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                crate::log!("ws"; "handshake failed: {}", e);
                return;
            }
        };

        if let Err(e) = ws.send(text(&HotReloadMessage::connected())) {
            crate::log!("ws"; "failed to send connected message: {}", e);
            return;
        }

        if let Some(pending) = &self.pending_error {
            let msg = HotReloadMessage::error(&pending.path, &pending.error);
            if let Err(e) = ws.send(text(&msg)) {
                crate::log!("ws"; "failed to send pending error: {}", e);
                return;
            }
            crate::debug!("ws"; "sent pending error to new client");
        }

        let _ = ws.get_ref().set_nonblocking(true);

        let mut clients = self.clients.lock();
        clients.push(ws);
        crate::debug!("ws"; "client connected (total: {})", clients.len());
    }

    /// Background thread draining client frames so closed sockets are noticed.
    ///
    /// Exits once the actor has dropped its handle to the client list.
    pub(super) fn client_reader_loop(clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>) {
        while Arc::strong_count(&clients) > 1 {
            std::thread::sleep(Duration::from_millis(100));

            let mut guard = clients.lock();
            guard.retain_mut(|ws| match ws.read() {
                Ok(Message::Close(_)) => false,
                Ok(_) => true,
                Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    true
                }
                Err(_) => false,
            });
        }
    }

    pub(super) fn close_all(&self) {
        let mut clients = self.clients.lock();
        for mut ws in clients.drain(..) {
            let _ = ws.close(None);
            let _ = ws.flush();
        }
    }
}

pub(super) fn text(msg: &HotReloadMessage) -> Message {
    Message::Text(msg.to_json().into())
}
