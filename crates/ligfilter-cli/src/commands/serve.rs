use crate::cli::ServeArgs;
use crate::config::{CliOverrides, build_config};
use crate::error::Result;
use crate::logging::LogSettings;
use crate::ui::{CliProgressHandler, UiEvent};
use ligfilter::engine::progress::ProgressReporter;
use ligfilter::supervisor::ProcessLauncher;
use ligfilter::workflows;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{info, warn};

pub async fn run(
    args: ServeArgs,
    log_settings: &LogSettings,
    ui_sender: mpsc::Sender<UiEvent>,
) -> Result<()> {
    let overrides = CliOverrides {
        num_workers: args.workers,
        request_timeout_secs: args.request_timeout_secs,
        bind: args.bind,
        base_port: args.base_port,
    };
    let app = build_config(&args.config, &overrides)?;
    info!(
        "Serving {} from {} workers on {}:{}+",
        app.service.table.path.display(),
        app.service.pool.num_workers,
        app.frontend.bind,
        app.frontend.base_port
    );

    let mut launcher = ProcessLauncher::current_exe()?
        .arg("worker")
        .arg("--bind")
        .arg(app.frontend.bind.to_string())
        .arg("--base-port")
        .arg(app.frontend.base_port.to_string())
        .args(log_settings.worker_args());
    if let Some(timeout) = app.service.relay.request_timeout {
        launcher = launcher
            .arg("--request-timeout-secs")
            .arg(timeout.as_secs().to_string());
    }

    let (stop, shutdown) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl-C, stopping the worker pool.");
                let _ = stop.send(true);
            }
            Err(e) => {
                warn!("Cannot listen for Ctrl-C: {}", e);
                // Keep the sender alive so the pool runs until the process is killed.
                std::future::pending::<()>().await;
                drop(stop);
            }
        }
    });

    let progress_handler = CliProgressHandler::new(ui_sender.clone());
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let pool_ui = ui_sender.clone();
    workflows::serve::run(
        &app.service,
        launcher,
        shutdown,
        move |mut pool| {
            tokio::spawn(async move {
                loop {
                    match pool.events.recv().await {
                        Ok(event) => {
                            if pool_ui.send(UiEvent::Pool(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!("Skipped {} pool events", missed);
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            });
        },
        &reporter,
    )
    .await?;

    Ok(())
}
