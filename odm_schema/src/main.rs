mod cmd;

use crate::cmd::update::{self, UpdateArgs};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::{env, io, process::ExitCode, str::FromStr};
use tokio::runtime::Builder;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt::{self, time::OffsetTime},
};

#[derive(Debug, Parser)]
#[command(name = "odm")]
#[command(about = "Object document mapper console tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Update indexes for your documents
    #[command(name = "schema:update", alias = "odm:schema:update")]
    SchemaUpdate(UpdateArgs),
}

fn init_tracing() -> Result<()> {
    let log_level = env::var("RUST_LOG").unwrap_or(String::from("info"));
    let filter = EnvFilter::builder()
        .with_default_directive(
            LevelFilter::from_str(&log_level)
                .context("couldn't parse specified log level")?
                .into(),
        )
        .from_env_lossy();
    let format = fmt::format()
        .with_level(true)
        .with_target(true)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_timer(OffsetTime::local_rfc_3339().context("couldn't determine local offset")?);
    // stdout carries the command result only.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .event_format(format)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")
}

fn main() -> Result<ExitCode> {
    dotenv().ok();
    let cli = Cli::parse();

    init_tracing()?;

    let runtime = Builder::new_multi_thread().enable_all().build()?;

    match cli.command {
        Commands::SchemaUpdate(args) => runtime.block_on(update::run(args)),
    }
}
