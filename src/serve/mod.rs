//! Development server with live reload.
//!
//! [`DevServer`] owns everything watch mode needs: the HTTP listener rooted
//! at the output tree, the WebSocket live-reload listener, and the file
//! watcher with its task runner. `start` binds all three; `stop` (or Ctrl+C
//! while in [`DevServer::wait`]) tears them down.

mod content;
mod lifecycle;
mod path;
mod response;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel::{self, Receiver, Sender};
use tiny_http::{Request, Server};

use crate::actor::Coordinator;
use crate::config::Config;
use crate::embed::serve::HOTRELOAD_URL;
use crate::{debug, log};

/// Worker threads answering HTTP requests.
const HTTP_THREADS: usize = 4;

/// What request handlers need to know.
struct ServeState {
    root: PathBuf,
    ws_port: u16,
}

/// A running dev server.
pub struct DevServer {
    server: Arc<Server>,
    addr: SocketAddr,
    ws_port: u16,
    http: Option<JoinHandle<()>>,
    actors: Option<JoinHandle<()>>,
    /// Stops the actor system
    stop_tx: Sender<()>,
    /// Fired by the Ctrl+C handler
    shutdown_rx: Receiver<()>,
}

impl DevServer {
    /// Bind the listeners and start watching. Does not build anything.
    pub fn start(config: Arc<Config>) -> Result<Self> {
        let coordinator = Coordinator::bind(Arc::clone(&config))?;
        let ws_port = coordinator.ws_port();

        let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
        let server = Arc::new(server);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(HTTP_THREADS)
            .build()
            .context("Failed to create HTTP thread pool")?;

        let (shutdown_tx, shutdown_rx) = channel::bounded::<()>(1);
        crate::core::register_shutdown(shutdown_tx);

        let (stop_tx, stop_rx) = channel::bounded::<()>(1);
        let actors = thread::spawn(move || {
            if let Err(e) = coordinator.run(stop_rx) {
                log!("actor"; "error: {:#}", e);
            }
        });

        let state = Arc::new(ServeState {
            root: config.output_dir(),
            ws_port,
        });
        let http = {
            let server = Arc::clone(&server);
            thread::spawn(move || run_request_loop(&server, &pool, &state))
        };

        log!("serve"; "http://{}", addr);
        debug!("serve"; "live reload on port {}", ws_port);

        Ok(Self {
            server,
            addr,
            ws_port,
            http: Some(http),
            actors: Some(actors),
            stop_tx,
            shutdown_rx,
        })
    }

    /// Bound HTTP address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Bound WebSocket port.
    pub fn ws_port(&self) -> u16 {
        self.ws_port
    }

    /// Block until Ctrl+C, then stop.
    pub fn wait(self) {
        let _ = self.shutdown_rx.recv();
        self.stop();
    }

    /// Stop watching, close browser connections, and unblock the listener.
    ///
    /// A task already running is allowed to finish first.
    pub fn stop(mut self) {
        let _ = self.stop_tx.send(());
        self.server.unblock();
        lifecycle::join_with_timeout(self.actors.take(), Duration::from_secs(35));
        lifecycle::join_with_timeout(self.http.take(), Duration::from_secs(2));
        debug!("serve"; "stopped");
    }
}

fn run_request_loop(server: &Server, pool: &rayon::ThreadPool, state: &Arc<ServeState>) {
    for request in server.incoming_requests() {
        let state = Arc::clone(state);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &state) {
                log!("serve"; "request error: {e}");
            }
        });
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, state: &ServeState) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    if path::url_path(request.url()) == HOTRELOAD_URL {
        return response::respond_hotreload_js(request, state.ws_port);
    }

    if let Some(file) = path::resolve_path(request.url(), &state.root) {
        return response::respond_file(request, &file);
    }

    response::respond_not_found(request, &state.root)
}
