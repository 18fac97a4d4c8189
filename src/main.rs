mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rn42_radio::CancelFlag;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!("\ninterrupted, finishing current step");
        handler_flag.cancel();
    })?;

    match cli.command {
        Commands::Init {
            name,
            no_auth,
            mode,
            sleep,
        } => commands::init(&cli.port, name, no_auth, mode, sleep, cancel).await,
        Commands::Type { text, delay } => commands::type_text(&cli.port, &text, delay).await,
        Commands::Key { key } => commands::key(&cli.port, key).await,
        Commands::Mouse { dx, dy, buttons } => commands::mouse(&cli.port, buttons, dx, dy).await,
        Commands::Connect { address } => commands::connect(&cli.port, address).await,
        Commands::Status => commands::status(&cli.port).await,
    }
}
