use std::time::Duration;

use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::fs::FsActor;
use crate::actor::messages::{RunnerMsg, WsMsg};
use crate::actor::runner::RunnerActor;
use crate::actor::ws::WsActor;

/// Run all actors until the stop signal, then shut them down in order.
///
/// The runner is drained first so a task in flight still gets to notify
/// browsers, then the WebSocket actor closes its clients.
pub(super) async fn run_actors(
    fs: FsActor,
    runner: RunnerActor,
    ws: WsActor,
    runner_tx: mpsc::Sender<RunnerMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    stop_rx: Receiver<()>,
) {
    let fs_handle = tokio::spawn(fs.run());
    let runner_handle = tokio::spawn(runner.run());
    let ws_handle = tokio::spawn(ws.run());

    loop {
        if stop_rx.try_recv().is_ok() || crate::core::is_shutdown() {
            crate::debug!("actor"; "shutdown signal received");
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    fs_handle.abort();

    let _ = runner_tx.send(RunnerMsg::Shutdown).await;
    if tokio::time::timeout(Duration::from_secs(30), runner_handle)
        .await
        .is_err()
    {
        crate::log!("actor"; "runner did not stop in time");
    }

    let _ = ws_tx.send(WsMsg::Shutdown).await;
    let _ = tokio::time::timeout(Duration::from_millis(500), ws_handle).await;
}
