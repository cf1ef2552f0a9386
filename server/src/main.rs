use clap::Parser;
use commands::Command;
use tracing_common::{setup_sentry, setup_tracing};

pub use color_eyre::Result;

mod commands;
mod http_server;
mod spoonacular;
mod state;
mod uploads;
mod vision;

pub(crate) use state::{AppConfig, AppState};

#[derive(Parser)]
#[command(author, version, about)]
struct CliArgs {
    #[clap(subcommand)]
    command: Option<Command>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let _sentry_guard = setup_sentry();

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()?
        .block_on(async { _main().await })
}

async fn _main() -> Result<()> {
    setup_tracing(env!("CARGO_PKG_NAME"))?;

    let cli = CliArgs::parse();
    let command = cli.command.unwrap_or_default();

    command.run().await
}
