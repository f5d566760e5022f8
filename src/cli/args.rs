//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Asset pipeline for static sites
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: kiln.toml)
    #[arg(short = 'C', long, global = true, default_value = "kiln.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Print per-file and watcher details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Task to run (default: dev build, then serve and watch)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available tasks
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Dev build with source maps, then serve and watch
    Default,

    /// Production build with image optimization
    #[command(visible_alias = "b")]
    Build,

    /// Content-hash asset names and rewrite references over a finished build
    Cache,

    /// Compile stylesheets only
    Styles,

    /// Bundle scripts only
    Scripts,

    /// Assemble pages from includes only
    #[command(visible_alias = "fileinclude")]
    Html,

    /// Serve and watch without building first
    #[command(visible_alias = "watch-files")]
    Watch,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("kiln").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_no_task_is_default() {
        let cli = parse(&[]);
        assert_eq!(cli.command, None);
        assert_eq!(cli.config, PathBuf::from("kiln.toml"));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_task_aliases() {
        assert_eq!(parse(&["fileinclude"]).command, Some(Commands::Html));
        assert_eq!(parse(&["watch-files"]).command, Some(Commands::Watch));
    }

    #[test]
    fn test_global_options_after_task() {
        let cli = parse(&["build", "--verbose", "-C", "site/kiln.toml"]);
        assert_eq!(cli.command, Some(Commands::Build));
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("site/kiln.toml"));
    }

    #[test]
    fn test_unknown_task_rejected() {
        assert!(Cli::try_parse_from(["kiln", "deploy"]).is_err());
    }
}
