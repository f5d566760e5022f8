//! Task outcomes and their aggregation.
//!
//! Tasks never decide whether the pipeline continues. They return a
//! [`TaskReport`]; the runner looks at all reports of a step and stops only
//! on a fatal error, after every sibling has finished.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use super::TaskKind;

/// Why a task did not complete normally.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Aborts the pipeline once the current step has joined.
    #[error("{0:#}")]
    Fatal(anyhow::Error),

    /// Logged and swallowed; the task counts as completed.
    #[error("{0:#}")]
    Recoverable(anyhow::Error),
}

impl TaskError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

/// A per-file problem that did not stop the rest of the task.
#[derive(Debug, Clone)]
pub struct TaskFailure {
    pub path: PathBuf,
    pub message: String,
}

/// What a finished task produced.
#[derive(Debug, Default)]
pub struct TaskSummary {
    /// Files written (or rewritten) in the output tree.
    pub written: Vec<PathBuf>,
    /// Inputs that failed without failing the task.
    pub failures: Vec<TaskFailure>,
}

impl TaskSummary {
    pub fn with_written(written: Vec<PathBuf>) -> Self {
        Self {
            written,
            failures: Vec::new(),
        }
    }

    pub fn push_failure(&mut self, path: PathBuf, message: impl Into<String>) {
        self.failures.push(TaskFailure {
            path,
            message: message.into(),
        });
    }
}

/// Outcome of one task run.
#[derive(Debug)]
pub struct TaskReport {
    pub kind: TaskKind,
    pub result: Result<TaskSummary, TaskError>,
    pub elapsed: Duration,
}

impl TaskReport {
    pub fn is_fatal(&self) -> bool {
        matches!(&self.result, Err(e) if e.is_fatal())
    }

    /// Completed with nothing to complain about.
    pub fn is_clean(&self) -> bool {
        matches!(&self.result, Ok(summary) if summary.failures.is_empty())
    }

    pub fn written(&self) -> &[PathBuf] {
        match &self.result {
            Ok(summary) => &summary.written,
            Err(_) => &[],
        }
    }

    pub fn failures(&self) -> &[TaskFailure] {
        match &self.result {
            Ok(summary) => &summary.failures,
            Err(_) => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Variant;

    fn report(result: Result<TaskSummary, TaskError>) -> TaskReport {
        TaskReport {
            kind: TaskKind::Styles(Variant::Build),
            result,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_fatal_classification() {
        assert!(report(Err(TaskError::Fatal(anyhow::anyhow!("disk full")))).is_fatal());
        assert!(!report(Err(TaskError::Recoverable(anyhow::anyhow!("bad js")))).is_fatal());
        assert!(!report(Ok(TaskSummary::default())).is_fatal());
    }

    #[test]
    fn test_partial_success_is_not_clean() {
        let mut summary = TaskSummary::with_written(vec![PathBuf::from("a.min.css")]);
        summary.push_failure(PathBuf::from("b.scss"), "expected \";\"");
        let report = report(Ok(summary));
        assert!(!report.is_clean());
        assert!(!report.is_fatal());
        assert_eq!(report.written().len(), 1);
        assert_eq!(report.failures().len(), 1);
    }
}
