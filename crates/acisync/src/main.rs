mod cli;
mod commands;
mod config;
mod engine;
mod error;
mod kind;
mod manifest;
mod output;
mod state;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use acisync_api::Transport;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;
use crate::manifest::Manifest;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let global = &cli.global;
    match cli.command {
        // Offline commands
        Command::Config(args) => commands::config_cmd::handle(args, global),
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "acisync", &mut std::io::stdout());
            Ok(())
        }
        Command::Show(args) => {
            let store = commands::util::open_state(global)?;
            commands::show::handle(&args, &store, global)
        }

        // Controller commands
        Command::Apply(args) => {
            // Validate before touching config or the network.
            let manifest = Manifest::load(&args.file)?;
            let transport = connect(global)?;
            commands::apply::handle(&args, &manifest, transport, global).await
        }
        Command::Refresh => commands::refresh::handle(connect(global)?, global).await,
        Command::Destroy(args) => commands::destroy::handle(args, connect(global)?, global).await,
        Command::Import(args) => commands::import::handle(args, connect(global)?, global).await,
        Command::Lookup(args) => commands::lookup::handle(args, connect(global)?, global).await,
    }
}

fn connect(global: &GlobalOpts) -> Result<Arc<dyn Transport>, CliError> {
    let controller = config::build_controller_config(global)?;
    tracing::debug!(url = %controller.url, "connecting");
    controller.transport().map_err(CliError::from)
}
