//! Console output.
//!
//! - `log!` / `debug!` print one line behind a colored `[module]` prefix;
//!   `debug!` only with `--verbose`.
//! - [`GroupProgress`] keeps a single line showing which tasks of a parallel
//!   group are still running.
//! - The watch status block is rewritten in place after every watched task,
//!   so the terminal shows the latest result rather than a scrolling log.
//!
//! ```ignore
//! log!("clean"; "removed {} entries", count);
//!
//! let progress = GroupProgress::new("build", &["html", "scripts", "images"]);
//! progress.done("images", true);
//! progress.finish();
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::LazyLock,
    sync::atomic::{AtomicBool, Ordering},
};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// A group progress line is on screen and must stay the last line.
static PROGRESS_ACTIVE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

// ============================================================================
// Macros
// ============================================================================

/// Log a message with a colored module prefix
///
/// ```ignore
/// log!("styles"; "compiled {} entries", count);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Like `log!`, only shown with `--verbose`
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Lines
// ============================================================================

/// Print `[module] message`, keeping an active progress line at the bottom.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let mut stdout = stdout().lock();

    if PROGRESS_ACTIVE.load(Ordering::SeqCst) {
        // Overwrite the progress line; the next refresh redraws it below
        execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
    }

    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

fn colorize_prefix(module: &str) -> String {
    let prefix = format!("[{module}]");
    match module {
        "serve" | "reload" | "ws" | "hotreload" => prefix.bright_blue().bold().to_string(),
        "watch" | "runner" => prefix.bright_green().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        "default" | "build" | "cache" => prefix.bright_magenta().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

/// Wall-clock `HH:MM:SS` (UTC), to tell consecutive rebuilds apart
fn now() -> String {
    use std::time::SystemTime;
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!(
        "{:02}:{:02}:{:02}",
        (secs / 3600) % 24,
        (secs / 60) % 60,
        secs % 60
    )
}

// ============================================================================
// Watch status
// ============================================================================

/// Status block rewritten in place after every watched task.
pub struct WatchStatus {
    /// Lines of previous output to clear
    last_lines: usize,
}

static WATCH_STATUS: LazyLock<Mutex<WatchStatus>> =
    LazyLock::new(|| Mutex::new(WatchStatus::new()));

impl WatchStatus {
    pub const fn new() -> Self {
        Self { last_lines: 0 }
    }

    pub fn success(&mut self, message: &str) {
        self.display(&"✓".green().to_string(), message);
    }

    /// `summary` on the first line, `detail` (may be multi-line) below.
    pub fn error(&mut self, summary: &str, detail: &str) {
        let message = if detail.is_empty() {
            summary.to_string()
        } else {
            format!("{summary}\n{detail}")
        };
        self.display(&"✗".red().to_string(), &message);
    }

    fn display(&mut self, symbol: &str, message: &str) {
        let mut stdout = stdout().lock();

        if self.last_lines > 0 {
            let lines = u16::try_from(self.last_lines).unwrap_or(u16::MAX);
            execute!(stdout, cursor::MoveUp(lines), Clear(ClearType::FromCursorDown)).ok();
        }

        let timestamp = format!("[{}]", now()).dimmed().to_string();
        writeln!(stdout, "{timestamp} {symbol} {message}").ok();
        stdout.flush().ok();

        self.last_lines = message.lines().count().max(1);
    }
}

pub fn status_success(message: &str) {
    WATCH_STATUS.lock().success(message);
}

pub fn status_error(summary: &str, detail: &str) {
    WATCH_STATUS.lock().error(summary, detail);
}

// ============================================================================
// Group progress
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq)]
enum TaskState {
    Running,
    Done,
    Failed,
}

/// One line listing the tasks of a parallel group and their state:
///
/// `[default] html ✓  scripts …  images ✓  fonts ✓  sprites …`
pub struct GroupProgress {
    label: &'static str,
    tasks: Mutex<Vec<(&'static str, TaskState)>>,
}

impl GroupProgress {
    pub fn new(label: &'static str, tasks: &[&'static str]) -> Self {
        PROGRESS_ACTIVE.store(true, Ordering::SeqCst);
        let progress = Self {
            label,
            tasks: Mutex::new(tasks.iter().map(|t| (*t, TaskState::Running)).collect()),
        };
        progress.draw(false);
        progress
    }

    /// Mark a task finished and redraw.
    pub fn done(&self, name: &str, ok: bool) {
        {
            let mut tasks = self.tasks.lock();
            if let Some(entry) = tasks.iter_mut().find(|(n, _)| *n == name) {
                entry.1 = if ok { TaskState::Done } else { TaskState::Failed };
            }
        }
        self.draw(false);
    }

    /// Leave the final state on screen.
    pub fn finish(self) {
        self.draw(true);
        PROGRESS_ACTIVE.store(false, Ordering::SeqCst);
    }

    fn render(&self) -> String {
        self.tasks
            .lock()
            .iter()
            .map(|(name, state)| match state {
                TaskState::Running => format!("{name} {}", "…".dimmed()),
                TaskState::Done => format!("{name} {}", "✓".green()),
                TaskState::Failed => format!("{name} {}", "✗".red()),
            })
            .collect::<Vec<_>>()
            .join("  ")
    }

    fn draw(&self, newline: bool) {
        let line = format!("{} {}", colorize_prefix(self.label), self.render());
        let mut stdout = stdout().lock();
        execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        if newline {
            writeln!(stdout, "{line}").ok();
        } else {
            write!(stdout, "{line}").ok();
        }
        stdout.flush().ok();
    }
}

impl Drop for GroupProgress {
    fn drop(&mut self) {
        PROGRESS_ACTIVE.store(false, Ordering::SeqCst);
    }
}
