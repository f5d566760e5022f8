//! Process-wide shutdown state.
//!
//! `SHUTDOWN` is set by the Ctrl+C handler. Long-running loops poll it; the
//! dev server additionally registers a channel so it can tear down its
//! listener and watches promptly.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::channel::Sender;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Shutdown signal sender for the dev server
static SHUTDOWN_TX: OnceLock<Sender<()>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start
///
/// - Before `register_shutdown()`: exits immediately (one-shot pipelines
///   leave a partially written output tree, the next run cleans it)
/// - After `register_shutdown()`: graceful stop of the dev server
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        if !request_shutdown() {
            std::process::exit(130);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Flag shutdown and notify the registered listener.
///
/// Returns false when nothing is registered to stop gracefully.
pub fn request_shutdown() -> bool {
    SHUTDOWN.store(true, Ordering::SeqCst);
    match SHUTDOWN_TX.get() {
        Some(tx) => {
            crate::log!("serve"; "shutting down...");
            let _ = tx.send(());
            true
        }
        None => false,
    }
}

/// Register the channel the dev server listens on for shutdown.
pub fn register_shutdown(tx: Sender<()>) {
    let _ = SHUTDOWN_TX.set(tx);
}

/// Check if shutdown has been requested
///
/// Uses Relaxed ordering for performance - worst case is processing
/// a few more items before stopping, which is acceptable
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
