//! Task pipelines.
//!
//! A pipeline is an ordered list of steps. A step is either one task or a
//! parallel group run on the rayon pool and joined before the next step.
//!
//! ```text
//! default: clean → [html, scripts, images, fonts, sprites] → styles → webp
//! build:   clean → [html, scripts, images, fonts, sprites] → styles → imagemin
//! cache:   rev → rewrite
//! ```
//!
//! Siblings are never cancelled: when a task fails fatally, the rest of its
//! group still finishes, then the pipeline stops.

mod report;
mod task;

pub use report::report_task;
pub use task::run_task;

use anyhow::{Result, bail};
use rayon::prelude::*;

use crate::config::Config;
use crate::core::{TaskKind, TaskReport, Variant, is_shutdown};
use crate::logger::GroupProgress;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Run(TaskKind),
    Parallel(Vec<TaskKind>),
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    pub name: &'static str,
    pub steps: Vec<Step>,
}

impl Pipeline {
    fn assets_then_styles(name: &'static str, variant: Variant, last: TaskKind) -> Self {
        Self {
            name,
            steps: vec![
                Step::Run(TaskKind::Clean),
                Step::Parallel(vec![
                    TaskKind::Html,
                    TaskKind::Scripts(variant),
                    TaskKind::Images,
                    TaskKind::Fonts,
                    TaskKind::Sprites,
                ]),
                Step::Run(TaskKind::Styles(variant)),
                Step::Run(last),
            ],
        }
    }

    /// Development build, followed by the watcher.
    pub fn dev() -> Self {
        Self::assets_then_styles("default", Variant::Dev, TaskKind::Webp)
    }

    /// Production build.
    pub fn build() -> Self {
        Self::assets_then_styles("build", Variant::Build, TaskKind::ImageMin)
    }

    /// Cache busting over a finished build.
    pub fn cache() -> Self {
        Self {
            name: "cache",
            steps: vec![Step::Run(TaskKind::Rev), Step::Run(TaskKind::Rewrite)],
        }
    }

    pub fn single(kind: TaskKind) -> Self {
        Self {
            name: kind.name(),
            steps: vec![Step::Run(kind)],
        }
    }

    /// Run every step in order; fails after the first step with a fatal
    /// task outcome.
    pub fn run(&self, config: &Config) -> Result<Vec<TaskReport>> {
        let mut reports = Vec::new();
        for step in &self.steps {
            if is_shutdown() {
                bail!("{} interrupted", self.name);
            }

            let step_reports = run_step(step, self.name, config);
            step_reports.iter().for_each(report_task);

            let fatal: Vec<_> = step_reports
                .iter()
                .filter(|r| r.is_fatal())
                .map(|r| r.kind.name())
                .collect();
            reports.extend(step_reports);
            if !fatal.is_empty() {
                bail!("{} aborted: {} failed", self.name, fatal.join(", "));
            }
        }
        Ok(reports)
    }
}

fn run_step(step: &Step, label: &'static str, config: &Config) -> Vec<TaskReport> {
    match step {
        Step::Run(kind) => vec![run_task(*kind, config)],
        Step::Parallel(kinds) => {
            let names: Vec<_> = kinds.iter().map(|k| k.name()).collect();
            let progress = GroupProgress::new(label, &names);
            let reports = kinds
                .par_iter()
                .map(|kind| {
                    let report = run_task(*kind, config);
                    progress.done(kind.name(), !report.is_fatal());
                    report
                })
                .collect();
            progress.finish();
            reports
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn site(root: &Path) {
        write(root, "src/index.html", "<body>@@include('html/nav.html')</body>");
        write(root, "src/html/nav.html", "<nav></nav>");
        write(root, "src/js/main.js", "export const x = 1;\nconsole.log(x);\n");
        write(root, "src/fonts/inter.woff2", "font");
        write(
            root,
            "src/img/svg/menu.svg",
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 1 1"><path d="M0 0L1 1"/></svg>"#,
        );
        write(root, "src/scss/main.scss", "$c: red; body { color: $c; }");
    }

    fn listing(dir: &Path) -> Vec<String> {
        let mut files: Vec<_> = jwalk::WalkDir::new(dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| crate::utils::path::to_slash(e.path().strip_prefix(dir).unwrap()))
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_presets_order() {
        let build = Pipeline::build();
        assert_eq!(build.steps[0], Step::Run(TaskKind::Clean));
        assert!(matches!(&build.steps[1], Step::Parallel(group) if group.len() == 5));
        assert_eq!(build.steps[2], Step::Run(TaskKind::Styles(Variant::Build)));
        assert_eq!(build.steps[3], Step::Run(TaskKind::ImageMin));
        assert_eq!(Pipeline::dev().steps[3], Step::Run(TaskKind::Webp));
        assert_eq!(
            Pipeline::cache().steps,
            vec![Step::Run(TaskKind::Rev), Step::Run(TaskKind::Rewrite)]
        );
    }

    #[test]
    fn test_build_twice_leaves_no_stale_outputs() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        site(root);
        write(root, "src/fonts/old.woff", "old");
        let config = Config::with_root(root);

        Pipeline::build().run(&config).unwrap();
        assert!(root.join("app/fonts/old.woff").exists());
        write(root, "app/stray.txt", "left behind");

        fs::remove_file(root.join("src/fonts/old.woff")).unwrap();
        Pipeline::build().run(&config).unwrap();

        assert_eq!(
            listing(&root.join("app")),
            vec![
                "css/main.min.css",
                "fonts/inter.woff2",
                "img/sprites.svg",
                "img/svg/menu.svg",
                "index.html",
                "js/main.js",
            ]
        );
    }

    #[test]
    fn test_broken_stylesheet_does_not_block_siblings() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        site(root);
        write(root, "src/scss/broken.scss", "body { color: $nope; }");
        let config = Config::with_root(root);

        let reports = Pipeline::dev().run(&config).unwrap();

        let styles = reports
            .iter()
            .find(|r| r.kind == TaskKind::Styles(Variant::Dev))
            .unwrap();
        assert_eq!(styles.failures().len(), 1);
        assert!(root.join("app/css/main.min.css").exists());
        assert!(root.join("app/js/main.js").exists());
        assert!(root.join("app/fonts/inter.woff2").exists());
        assert!(root.join("app/index.html").exists());
    }

    #[test]
    fn test_fatal_task_stops_after_group_joins() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        site(root);
        write(root, "src/about.html", "@@include('html/missing.html')");
        let config = Config::with_root(root);

        let err = Pipeline::build().run(&config).unwrap_err();
        assert!(err.to_string().contains("html"), "{err}");
        // siblings in the same group still ran
        assert!(root.join("app/js/main.js").exists());
        assert!(root.join("app/fonts/inter.woff2").exists());
        // later steps did not
        assert!(!root.join("app/css").exists());
    }

    #[test]
    fn test_copies_complete_on_a_saturated_pool() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        site(root);
        write(root, "src/fonts/sub/mono.woff2", "mono");
        let config = Config::with_root(root);

        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        pool.install(|| Pipeline::build().run(&config)).unwrap();

        for rel in [
            "fonts/inter.woff2",
            "fonts/sub/mono.woff2",
            "img/svg/menu.svg",
            "img/sprites.svg",
            "index.html",
            "js/main.js",
        ] {
            assert!(root.join("app").join(rel).exists(), "{rel}");
        }
    }

    #[test]
    fn test_copy_failure_in_group_is_fatal() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        site(root);
        // a file where the fonts directory should go
        write(root, "app/fonts", "");
        let config = Config::with_root(root);
        let pipeline = Pipeline {
            name: "assets",
            steps: vec![
                Step::Parallel(vec![TaskKind::Fonts, TaskKind::Html]),
                Step::Run(TaskKind::Styles(Variant::Build)),
            ],
        };

        let err = pipeline.run(&config).unwrap_err();
        assert!(err.to_string().contains("fonts"), "{err}");
        assert!(root.join("app/index.html").exists());
        assert!(!root.join("app/css").exists());

        let report = run_task(TaskKind::Fonts, &config);
        assert!(matches!(report.result, Err(crate::core::TaskError::Fatal(_))));
    }

    #[test]
    fn test_build_then_cache() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        site(root);
        write(
            root,
            "src/index.html",
            r#"<link href="css/main.min.css"><script src="js/main.js"></script>"#,
        );
        let config = Config::with_root(root);

        Pipeline::build().run(&config).unwrap();
        Pipeline::cache().run(&config).unwrap();

        let manifest = crate::rev::read_manifest(&config.manifest_path()).unwrap();
        let html = fs::read_to_string(root.join("app/index.html")).unwrap();
        assert!(html.contains(&manifest["css/main.min.css"]));
        assert!(html.contains(&manifest["js/main.js"]));
        assert!(!root.join("app/css/main.min.css").exists());
    }
}
