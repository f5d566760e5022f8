//! Actor Coordinator - Wires up the watch-mode actors
//!
//! Binding happens up front ([`Coordinator::bind`]) so the watcher is live and
//! the WebSocket port is known before the initial pipeline runs. [`run`]
//! then drives the actors until the stop signal arrives.
//!
//! [`run`]: Coordinator::run

mod runtime;

use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::{FsActor, WatchTable};
use super::messages::{RunnerMsg, WsMsg};
use super::runner::RunnerActor;
use super::ws::WsActor;
use crate::config::Config;

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - owns the actors between bind and run.
pub struct Coordinator {
    fs: FsActor,
    runner: RunnerActor,
    ws: WsActor,
    runner_tx: mpsc::Sender<RunnerMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    ws_port: u16,
}

impl Coordinator {
    /// Start the watcher and the WebSocket listener.
    pub fn bind(config: Arc<Config>) -> Result<Self> {
        let (runner_tx, runner_rx) = mpsc::channel::<RunnerMsg>(CHANNEL_BUFFER);
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);

        let ws_port = crate::reload::server::start_ws_server(
            config.serve.interface,
            config.serve.ws_port,
            ws_tx.clone(),
        )?;
        crate::debug!("hotreload"; "ws://{}:{}", config.serve.interface, ws_port);

        let table = WatchTable::from_config(&config);
        let fs = FsActor::new(table, runner_tx.clone()).context("watcher failed")?;
        let runner = RunnerActor::new(runner_rx, ws_tx.clone(), Arc::clone(&config));
        let ws = WsActor::new(ws_rx);

        Ok(Self {
            fs,
            runner,
            ws,
            runner_tx,
            ws_tx,
            ws_port,
        })
    }

    /// Port the WebSocket listener actually bound.
    pub fn ws_port(&self) -> u16 {
        self.ws_port
    }

    /// Run the actors on a dedicated runtime until `stop_rx` fires.
    pub fn run(self, stop_rx: Receiver<()>) -> Result<()> {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .context("Failed to create tokio runtime")?;

        crate::debug!("actor"; "start");
        rt.block_on(runtime::run_actors(
            self.fs,
            self.runner,
            self.ws,
            self.runner_tx,
            self.ws_tx,
            stop_rx,
        ));
        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
