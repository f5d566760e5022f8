//! kiln - an asset pipeline for static sites.

#![allow(dead_code)]

mod actor;
mod asset;
mod cli;
mod config;
mod core;
mod embed;
mod image;
mod logger;
mod markup;
mod pipeline;
mod reload;
mod rev;
mod script;
mod serve;
mod style;
mod utils;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::Config;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = Arc::new(Config::load(&cli)?);
    cli::run_command(cli.command.unwrap_or(Commands::Default), config)
}
