//! FileSystem Actor
//!
//! Watches the source tree and sends debounced task batches to the
//! RunnerActor. The watcher starts with the dev server, after the initial
//! dev pipeline has finished. A file edited during that build is rebuilt on
//! its next change.
//!
//! ```text
//! Watcher → Debouncer (pure timing) → WatchTable (path → task) → RunnerMsg
//! ```

use std::time::Duration;

use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use super::messages::RunnerMsg;

// Pure timing and deduplication.
mod debouncer;
// Path → task mapping.
mod router;
// Shared fs event types.
mod types;
// Watch root attach/re-attach lifecycle.
mod watch_roots;

pub use router::WatchTable;

use debouncer::Debouncer;
use watch_roots::WatchRoots;

/// Upper bound between watch-root maintenance passes.
const MAINTAIN_INTERVAL: Duration = Duration::from_secs(1);

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    watch_roots: WatchRoots,
    table: WatchTable,
    runner_tx: mpsc::Sender<RunnerMsg>,
}

impl FsActor {
    /// Create the watcher and attach every existing root immediately.
    pub fn new(table: WatchTable, runner_tx: mpsc::Sender<RunnerMsg>) -> notify::Result<Self> {
        // notify is sync-only
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        // Missing roots are re-attached once they appear
        let mut watch_roots = WatchRoots::new(table.roots());
        watch_roots.attach_existing(&mut watcher)?;

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            table,
            runner_tx,
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let Self {
            notify_rx,
            mut watcher,
            mut watch_roots,
            table,
            runner_tx,
        } = self;
        let mut debouncer = Debouncer::new();

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // Bridge thread ends when the watcher (and its sender) is dropped
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            let wait = debouncer.sleep_duration().min(MAINTAIN_INTERVAL);
            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                _ = tokio::time::sleep(wait) => {
                    watch_roots.maintain(&mut watcher);
                    if dispatch_batch(&mut debouncer, &table, &runner_tx).await.is_err() {
                        break;
                    }
                }
            }
        }
        crate::debug!("watch"; "stopped");
    }
}

/// Send the ready batch, if any, as one `Run` message.
///
/// Returns `Err(())` once the runner has shut down.
async fn dispatch_batch(
    debouncer: &mut Debouncer,
    table: &WatchTable,
    runner_tx: &mpsc::Sender<RunnerMsg>,
) -> Result<(), ()> {
    if crate::core::is_shutdown() {
        return Err(());
    }

    let Some(changes) = debouncer.take_if_ready() else {
        return Ok(());
    };

    for (path, kind) in &changes {
        crate::debug!("watch"; "{}: {}", kind.label(), path.display());
    }

    let tasks = table.route(changes.keys().map(|p| p.as_path()));
    if tasks.is_empty() {
        return Ok(());
    }

    runner_tx.send(RunnerMsg::Run(tasks)).await.map_err(|_| ())
}
