mod cli;
mod commands;
mod config;
mod error;
mod frontend;
mod logging;
mod ui;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use crate::logging::LogSettings;
use crate::ui::UiManager;
use clap::Parser;
use tokio::task;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn install_panic_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));
    Ok(())
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();
    let log_settings = LogSettings {
        verbosity: cli.verbose,
        quiet: cli.quiet,
        log_file: cli.log_file.clone(),
    };

    // Workers speak the relay protocol on stdout, so they run without the terminal UI.
    if let Commands::Worker(args) = cli.command {
        logging::setup_logging(&LogSettings {
            log_file: None,
            ..log_settings
        })?;
        install_panic_hooks()?;
        return commands::worker::run(args).await;
    }

    let (ui_manager, ui_sender, shutdown_sender) = UiManager::new();
    let ui_handle = task::spawn(ui_manager.run());

    logging::setup_logging(&log_settings)?;
    install_panic_hooks()?;

    let command_result = async {
        info!(
            "🚀 LigFilter CLI v{} starting up.",
            env!("CARGO_PKG_VERSION")
        );
        debug!("Full CLI arguments parsed: {:?}", &cli);

        match cli.command {
            Commands::Serve(args) => {
                info!("Dispatching to 'serve' command.");
                commands::serve::run(args, &log_settings, ui_sender).await
            }
            Commands::Count(args) => {
                info!("Dispatching to 'count' command.");
                commands::count::run(args, ui_sender).await
            }
            Commands::Pack(args) => {
                info!("Dispatching to 'pack' command.");
                commands::pack::run(args).await
            }
            Commands::Query(args) => {
                info!("Dispatching to 'query' command.");
                commands::query::run(args).await
            }
            Commands::Worker(_) => Err(CliError::Argument(
                "the worker command is dispatched before the UI starts".to_string(),
            )),
        }
    }
    .await;

    match &command_result {
        Ok(_) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }

    if shutdown_sender.send(true).is_err() {
        warn!("UI manager may have already exited before shutdown signal.");
    }

    ui_handle
        .await
        .map_err(|e| CliError::Other(anyhow::anyhow!("UI manager task failed: {}", e)))?;

    command_result
}
