mod clipboard;
mod fetch;
mod profiles;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use model_fetcher_core::ProfileStore;

#[derive(Parser, Debug)]
#[command(name = "model-fetcher", version, about = "List the models of an OpenAI-compatible API")]
struct Args {
    /// Directory holding saved profiles (default: ~/.openai_model_fetcher)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the model list
    Fetch(fetch::FetchArgs),
    /// Manage saved API profiles
    #[command(subcommand)]
    Profiles(profiles::ProfilesCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let store = match &args.config_dir {
        Some(dir) => ProfileStore::open(dir),
        None => ProfileStore::open_default(),
    }
    .context("failed to open profile store")?;

    match args.command {
        Command::Fetch(fetch_args) => fetch::run(&store, fetch_args).await,
        Command::Profiles(cmd) => profiles::run(&store, cmd),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries model ids only
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
