use tungstenite::protocol::Message;

use crate::reload::message::HotReloadMessage;

use super::WsActor;
use super::client_io::text;

impl WsActor {
    /// Broadcast a message to all connected clients, dropping dead ones.
    pub(super) fn broadcast(&self, msg: &HotReloadMessage) {
        let frame = text(msg);
        let mut clients = self.clients.lock();
        let count = clients.len();

        if count == 0 {
            crate::debug!("ws"; "no clients connected");
            return;
        }

        clients.retain_mut(|ws| match send(ws, frame.clone()) {
            Ok(()) => true,
            Err(e) => {
                crate::debug!("ws"; "client disconnected: {}", e);
                false
            }
        });
        crate::debug!("ws"; "broadcast to {} clients", count);
    }
}

/// Write a frame on a non-blocking socket.
///
/// A full send buffer surfaces as `WouldBlock`; the frame is queued inside
/// tungstenite and flushed on the next write.
fn send<S: std::io::Read + std::io::Write>(
    ws: &mut tungstenite::WebSocket<S>,
    frame: Message,
) -> Result<(), tungstenite::Error> {
    match ws.send(frame) {
        Err(tungstenite::Error::Io(e)) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(()),
        other => other,
    }
}
