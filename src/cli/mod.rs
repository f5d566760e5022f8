//! Command-line interface module.

mod args;

pub use args::{Cli, Commands};

use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::core::{TaskKind, Variant};
use crate::pipeline::Pipeline;
use crate::serve::DevServer;

/// Run one CLI task to completion.
pub fn run_command(command: Commands, config: Arc<Config>) -> Result<()> {
    match command {
        Commands::Default => {
            Pipeline::dev().run(&config)?;
            serve(config)
        }
        Commands::Build => run(Pipeline::build(), &config),
        Commands::Cache => run(Pipeline::cache(), &config),
        Commands::Styles => run(Pipeline::single(TaskKind::Styles(Variant::Dev)), &config),
        Commands::Scripts => run(Pipeline::single(TaskKind::Scripts(Variant::Dev)), &config),
        Commands::Html => run(Pipeline::single(TaskKind::Html), &config),
        Commands::Watch => serve(config),
    }
}

fn run(pipeline: Pipeline, config: &Config) -> Result<()> {
    pipeline.run(config).map(drop)
}

/// Serve the output tree and rerun tasks on change until Ctrl+C.
fn serve(config: Arc<Config>) -> Result<()> {
    DevServer::start(config)?.wait();
    Ok(())
}
