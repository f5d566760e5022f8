//! Task dispatch and error classification.
//!
//! Each task maps its domain error onto the pipeline policy here:
//! filesystem, image and markup failures are fatal, a failed script bundle
//! is recoverable, and stylesheet failures are per-entry.

use std::time::Instant;

use anyhow::Result;

use crate::asset::{SourceSet, clean_dir, copy_set};
use crate::config::Config;
use crate::core::{TaskError, TaskKind, TaskReport, TaskSummary};
use crate::{image, markup, rev, script, style};

/// Run one task to completion and capture its outcome.
pub fn run_task(kind: TaskKind, config: &Config) -> TaskReport {
    let started = Instant::now();
    let result = dispatch(kind, config);
    TaskReport {
        kind,
        result,
        elapsed: started.elapsed(),
    }
}

fn dispatch(kind: TaskKind, config: &Config) -> Result<TaskSummary, TaskError> {
    match kind {
        TaskKind::Clean => fatal(clean_dir(&config.output_dir()).map(|_| Vec::new())),
        TaskKind::Fonts => fatal(copy_set(
            &SourceSet::any(config.fonts_src()),
            &config.fonts_out(),
        )),
        TaskKind::Images => fatal(copy_set(
            &SourceSet::recursive(config.images_src(), &config.images.extensions),
            &config.images_out(),
        )),
        TaskKind::Webp => fatal(image::convert_webp(config)),
        TaskKind::Sprites => fatal(image::build_sprite(config).map(|out| out.into_iter().collect())),
        TaskKind::Html => fatal(markup::assemble_pages(config)),
        TaskKind::Styles(variant) => style::compile_all(config, variant).map_err(TaskError::Fatal),
        TaskKind::Scripts(variant) => script::bundle(config, variant)
            .map(TaskSummary::with_written)
            .map_err(TaskError::Recoverable),
        TaskKind::ImageMin => fatal(image::optimize_images(config)),
        TaskKind::Rev => fatal(rev::rev_files(config).map(|(_, renamed)| renamed).map_err(Into::into)),
        TaskKind::Rewrite => fatal(rev::rewrite_html(config).map_err(Into::into)),
    }
}

fn fatal(result: Result<Vec<std::path::PathBuf>>) -> Result<TaskSummary, TaskError> {
    result.map(TaskSummary::with_written).map_err(TaskError::Fatal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Variant;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_script_failure_is_recoverable() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/js/main.js", "import './nope.js';");

        let report = run_task(TaskKind::Scripts(Variant::Build), &Config::with_root(dir.path()));
        assert!(matches!(report.result, Err(TaskError::Recoverable(_))));
        assert!(!report.is_fatal());
    }

    #[test]
    fn test_markup_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/index.html", "@@include('missing.html')");

        let report = run_task(TaskKind::Html, &Config::with_root(dir.path()));
        assert!(report.is_fatal());
    }

    #[test]
    fn test_missing_sources_are_not_errors() {
        let dir = TempDir::new().unwrap();
        let config = Config::with_root(dir.path());
        for kind in [TaskKind::Fonts, TaskKind::Images, TaskKind::Sprites, TaskKind::Webp] {
            let report = run_task(kind, &config);
            assert!(report.is_clean(), "{kind}");
            assert!(report.written().is_empty());
        }
    }

    #[test]
    fn test_rewrite_without_build_is_fatal() {
        let dir = TempDir::new().unwrap();
        let report = run_task(TaskKind::Rewrite, &Config::with_root(dir.path()));
        assert!(report.is_fatal());
    }
}
