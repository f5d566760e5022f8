//! Runner Actor
//!
//! Runs watched tasks on blocking threads. A task is never started twice at
//! once: requests arriving while it runs collapse into a single rerun that
//! starts when the current run completes. Distinct tasks run concurrently.

use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rustc_hash::FxHashSet;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::messages::{RunnerMsg, WsMsg};
use crate::config::Config;
use crate::core::{ReloadKind, TaskError, TaskKind, TaskReport};
use crate::logger::{status_error, status_success};
use crate::pipeline::run_task;
use crate::utils::path::to_slash;
use crate::utils::plural::plural_count;

/// Running tasks and the ones owing a rerun.
#[derive(Debug, Default)]
struct Schedule {
    running: FxHashSet<TaskKind>,
    pending: FxHashSet<TaskKind>,
}

impl Schedule {
    /// Returns true when `kind` should start now.
    fn request(&mut self, kind: TaskKind) -> bool {
        if self.running.contains(&kind) {
            self.pending.insert(kind);
            false
        } else {
            self.running.insert(kind);
            true
        }
    }

    /// Returns true when a rerun is owed; the task then stays marked running.
    fn complete(&mut self, kind: TaskKind) -> bool {
        if self.pending.remove(&kind) {
            true
        } else {
            self.running.remove(&kind);
            false
        }
    }

    fn drop_pending(&mut self) {
        self.pending.clear();
    }
}

/// Turns task reports into browser messages and tracks the error overlay.
#[derive(Debug, Default)]
struct Notifier {
    /// Task whose failure is currently shown in the overlay.
    overlay: Option<TaskKind>,
}

impl Notifier {
    fn notify(&mut self, report: &TaskReport, config: &Config) -> Vec<WsMsg> {
        let kind = report.kind;
        let summary = match &report.result {
            Err(err) => {
                self.overlay = Some(kind);
                return vec![WsMsg::Error {
                    path: kind.name().to_string(),
                    error: format!("{err}"),
                }];
            }
            Ok(summary) => summary,
        };

        let mut messages = Vec::new();
        if let Some(first) = summary.failures.first() {
            self.overlay = Some(kind);
            let error = summary
                .failures
                .iter()
                .map(|f| format!("{}\n{}", config.display_path(&f.path), f.message))
                .collect::<Vec<_>>()
                .join("\n\n");
            messages.push(WsMsg::Error {
                path: config.display_path(&first.path),
                error,
            });
        } else if self.overlay == Some(kind) {
            self.overlay = None;
            messages.push(WsMsg::ClearError);
        }

        match kind.reload_kind() {
            ReloadKind::InjectCss => {
                let output = config.output_dir();
                messages.extend(
                    summary
                        .written
                        .iter()
                        .filter_map(|path| stylesheet_href(path, &output))
                        .map(|href| WsMsg::Css { href }),
                );
            }
            ReloadKind::Full if summary.failures.is_empty() => messages.push(WsMsg::Reload {
                reason: kind.name().to_string(),
            }),
            ReloadKind::Full => {}
        }
        messages
    }
}

/// `app/css/main.min.css` → `/css/main.min.css`; maps are skipped.
fn stylesheet_href(path: &Path, output: &Path) -> Option<String> {
    let is_css = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("css"));
    if !is_css {
        return None;
    }
    let rel = path.strip_prefix(output).ok()?;
    Some(format!("/{}", to_slash(rel)))
}

/// Watch-mode status line for a finished task.
fn show_status(report: &TaskReport, config: &Config) {
    let name = report.kind.name();
    let ms = report.elapsed.as_millis();
    match &report.result {
        Ok(summary) if summary.failures.is_empty() => status_success(&format!(
            "{name}: {} in {ms}ms",
            plural_count(summary.written.len(), "file")
        )),
        Ok(summary) => {
            let detail = summary
                .failures
                .iter()
                .map(|f| format!("{}: {}", config.display_path(&f.path), f.message))
                .collect::<Vec<_>>()
                .join("\n");
            status_error(&format!("{name} failed"), &detail);
        }
        Err(TaskError::Recoverable(err) | TaskError::Fatal(err)) => {
            status_error(&format!("{name} failed"), &format!("{err:#}"));
        }
    }
}

/// Runner Actor - executes task batches from the watcher
pub struct RunnerActor {
    rx: mpsc::Receiver<RunnerMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    config: Arc<Config>,
    schedule: Schedule,
    notifier: Notifier,
}

impl RunnerActor {
    pub fn new(rx: mpsc::Receiver<RunnerMsg>, ws_tx: mpsc::Sender<WsMsg>, config: Arc<Config>) -> Self {
        Self {
            rx,
            ws_tx,
            config,
            schedule: Schedule::default(),
            notifier: Notifier::default(),
        }
    }

    /// Run the actor event loop
    ///
    /// After `Shutdown`, no new work is accepted but running tasks are
    /// awaited so no output is left half written.
    pub async fn run(mut self) {
        let mut jobs: JoinSet<TaskReport> = JoinSet::new();
        let mut accepting = true;

        loop {
            tokio::select! {
                msg = self.rx.recv(), if accepting => match msg {
                    Some(RunnerMsg::Run(kinds)) => {
                        for kind in kinds {
                            if self.schedule.request(kind) {
                                self.spawn(kind, &mut jobs);
                            } else {
                                crate::debug!("runner"; "{} busy, rerun queued", kind);
                            }
                        }
                    }
                    Some(RunnerMsg::Shutdown) | None => {
                        accepting = false;
                        self.schedule.drop_pending();
                    }
                },
                Some(joined) = jobs.join_next() => match joined {
                    Ok(report) => self.finish(report, &mut jobs).await,
                    Err(e) => crate::log!("runner"; "task join failed: {}", e),
                },
                else => break,
            }
        }
        crate::debug!("runner"; "stopped");
    }

    fn spawn(&self, kind: TaskKind, jobs: &mut JoinSet<TaskReport>) {
        let config = Arc::clone(&self.config);
        crate::debug!("runner"; "start {}", kind);
        jobs.spawn_blocking(move || {
            std::panic::catch_unwind(AssertUnwindSafe(|| run_task(kind, &config))).unwrap_or_else(
                |_| TaskReport {
                    kind,
                    result: Err(TaskError::Fatal(anyhow::anyhow!("task panicked"))),
                    elapsed: Duration::ZERO,
                },
            )
        });
    }

    async fn finish(&mut self, report: TaskReport, jobs: &mut JoinSet<TaskReport>) {
        show_status(&report, &self.config);

        for msg in self.notifier.notify(&report, &self.config) {
            if self.ws_tx.send(msg).await.is_err() {
                break;
            }
        }

        if self.schedule.complete(report.kind) {
            crate::debug!("runner"; "rerun {}", report.kind);
            self.spawn(report.kind, jobs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{TaskSummary, Variant};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const STYLES: TaskKind = TaskKind::Styles(Variant::Dev);

    fn report(kind: TaskKind, result: Result<TaskSummary, TaskError>) -> TaskReport {
        TaskReport {
            kind,
            result,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_busy_task_collapses_to_one_rerun() {
        let mut schedule = Schedule::default();
        assert!(schedule.request(STYLES));
        assert!(!schedule.request(STYLES));
        assert!(!schedule.request(STYLES));
        assert!(schedule.request(TaskKind::Html));

        // one rerun for any number of requests
        assert!(schedule.complete(STYLES));
        assert!(!schedule.complete(STYLES));
        assert!(schedule.request(STYLES));
    }

    #[test]
    fn test_pending_dropped_on_shutdown() {
        let mut schedule = Schedule::default();
        schedule.request(STYLES);
        schedule.request(STYLES);
        schedule.drop_pending();
        assert!(!schedule.complete(STYLES));
    }

    #[test]
    fn test_styles_inject_written_sheets() {
        let config = Config::with_root(Path::new("/site"));
        let written = vec![
            PathBuf::from("/site/app/css/main.min.css"),
            PathBuf::from("/site/app/css/main.min.css.map"),
            PathBuf::from("/site/app/css/pages/home.min.css"),
        ];
        let messages = Notifier::default().notify(
            &report(STYLES, Ok(TaskSummary::with_written(written))),
            &config,
        );
        let hrefs: Vec<_> = messages
            .iter()
            .map(|m| match m {
                WsMsg::Css { href } => href.as_str(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(hrefs, ["/css/main.min.css", "/css/pages/home.min.css"]);
    }

    #[test]
    fn test_other_tasks_reload() {
        let config = Config::with_root(Path::new("/site"));
        let messages = Notifier::default().notify(
            &report(TaskKind::Html, Ok(TaskSummary::default())),
            &config,
        );
        assert!(matches!(&messages[..], [WsMsg::Reload { reason }] if reason == "html"));
    }

    #[test]
    fn test_overlay_shown_then_cleared() {
        let config = Config::with_root(Path::new("/site"));
        let mut notifier = Notifier::default();

        let mut broken = TaskSummary::default();
        broken.push_failure(PathBuf::from("/site/src/scss/main.scss"), "expected \";\"");
        let messages = notifier.notify(&report(STYLES, Ok(broken)), &config);
        assert!(matches!(
            &messages[..],
            [WsMsg::Error { path, .. }] if path == "src/scss/main.scss"
        ));

        let fixed = TaskSummary::with_written(vec![PathBuf::from("/site/app/css/main.min.css")]);
        let messages = notifier.notify(&report(STYLES, Ok(fixed)), &config);
        assert!(matches!(&messages[0], WsMsg::ClearError));
        assert!(matches!(&messages[1], WsMsg::Css { .. }));

        // nothing left to clear
        let messages = notifier.notify(&report(STYLES, Ok(TaskSummary::default())), &config);
        assert!(messages.is_empty());
    }

    #[test]
    fn test_task_error_shows_overlay() {
        let config = Config::with_root(Path::new("/site"));
        let messages = Notifier::default().notify(
            &report(
                TaskKind::Scripts(Variant::Dev),
                Err(TaskError::Recoverable(anyhow::anyhow!("cannot resolve './x'"))),
            ),
            &config,
        );
        assert!(matches!(&messages[..], [WsMsg::Error { path, .. }] if path == "scripts"));
    }

    #[tokio::test]
    async fn test_stylesheet_change_injects_css_only() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/scss")).unwrap();
        fs::create_dir_all(root.join("src/js")).unwrap();
        fs::write(root.join("src/scss/main.scss"), "a { color: red; }").unwrap();
        fs::write(root.join("src/js/main.js"), "console.log(1);").unwrap();

        let config = Arc::new(Config::with_root(root));
        let (runner_tx, runner_rx) = mpsc::channel(8);
        let (ws_tx, mut ws_rx) = mpsc::channel(8);
        let handle = tokio::spawn(RunnerActor::new(runner_rx, ws_tx, config).run());

        runner_tx.send(RunnerMsg::Run(vec![STYLES])).await.unwrap();
        let msg = ws_rx.recv().await.unwrap();
        assert!(matches!(msg, WsMsg::Css { ref href } if href == "/css/main.min.css"));

        runner_tx.send(RunnerMsg::Shutdown).await.unwrap();
        handle.await.unwrap();

        assert!(root.join("app/css/main.min.css").is_file());
        assert!(!root.join("app/js").exists());
        assert!(!root.join("app/index.html").exists());
    }
}
