use crate::cli::WorkerArgs;
use crate::config::FrontendConfig;
use crate::error::{CliError, Result};
use crate::frontend;
use ligfilter::relay::worker::RelayClient;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Worker process entry point. Stdin and stdout carry the relay channel to the owner, so
/// nothing else may be written to stdout.
pub async fn run(args: WorkerArgs) -> Result<()> {
    let addr = FrontendConfig {
        bind: args.bind,
        base_port: args.base_port,
    }
    .worker_addr(args.slot)
    .ok_or_else(|| {
        CliError::Argument(format!(
            "slot {} has no port above base port {}",
            args.slot, args.base_port
        ))
    })?;
    let timeout = args.request_timeout_secs.map(Duration::from_secs);

    // A terminal Ctrl-C reaches the whole process group; the owner decides when workers stop.
    tokio::spawn(async {
        while tokio::signal::ctrl_c().await.is_ok() {
            debug!("Worker {} ignoring Ctrl-C", std::process::id());
        }
    });

    let (client, connection) =
        RelayClient::connect(tokio::io::stdin(), tokio::io::stdout(), timeout);
    let listener = frontend::bind(addr).await?;
    client.announce_ready(args.slot)?;

    tokio::select! {
        result = frontend::serve(listener, client) => {
            result?;
        }
        _ = connection.closed() => {
            warn!("Owner closed the relay channel; worker {} exiting.", std::process::id());
        }
    }
    info!("Worker {} stopped.", std::process::id());
    Ok(())
}
