//! Console reporting of task outcomes.

use crate::core::{TaskError, TaskReport};
use crate::utils::plural::plural_count;
use crate::{debug, log};

pub fn report_task(report: &TaskReport) {
    let name = report.kind.name();
    let ms = report.elapsed.as_millis();

    match &report.result {
        Ok(summary) => {
            for failure in &summary.failures {
                log!("error"; "{name}: {}\n{}", failure.path.display(), failure.message);
            }
            if summary.failures.is_empty() {
                log!(name; "{} in {ms}ms", plural_count(summary.written.len(), "file"));
            } else {
                log!(name; "{} written, {} failed in {ms}ms",
                    plural_count(summary.written.len(), "file"),
                    summary.failures.len());
            }
            for path in &summary.written {
                debug!(name; "{}", path.display());
            }
        }
        Err(TaskError::Recoverable(err)) => {
            log!("error"; "{name}: {err:#}");
            log!(name; "skipped output for this run");
        }
        Err(TaskError::Fatal(err)) => {
            log!("error"; "{name}: {err:#}");
        }
    }
}
