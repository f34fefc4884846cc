use crate::core::io::property_file::PropertyTable;
use crate::engine::config::ServiceConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::relay::owner::Owner;
use crate::supervisor::{PoolEvent, PoolStatus, Supervisor, WorkerLauncher};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tracing::{info, instrument, warn};

const OWNER_JOIN_GRACE: Duration = Duration::from_secs(5);

/// Handles for observing a pool before [`run`] takes ownership of its supervisor.
pub struct PoolWatch {
    pub events: broadcast::Receiver<PoolEvent>,
    pub status: PoolStatus,
}

/// Loads the property table and serves it to a supervised worker pool until `shutdown`
/// turns `true`.
///
/// The table is loaded before any worker is launched, so a load failure ends the service
/// without a single worker having been started. Loading blocks the calling worker thread,
/// which requires a multi-threaded runtime.
#[instrument(skip_all, name = "serve_workflow")]
pub async fn run<L: WorkerLauncher>(
    config: &ServiceConfig,
    launcher: L,
    shutdown: watch::Receiver<bool>,
    on_pool: impl FnOnce(PoolWatch),
    reporter: &ProgressReporter<'_>,
) -> Result<(), EngineError> {
    let store = tokio::task::block_in_place(|| {
        PropertyTable::read_from_path(&config.table.path, config.table.num_ligands, reporter)
    })?;

    let (owner, owner_thread) = Owner::spawn(store)?;

    let supervisor = Supervisor::new(launcher, config.pool.num_workers);
    on_pool(PoolWatch {
        events: supervisor.subscribe(),
        status: supervisor.status(),
    });
    let outcome = supervisor.run(owner, shutdown).await;

    match tokio::time::timeout(
        OWNER_JOIN_GRACE,
        tokio::task::spawn_blocking(move || owner_thread.join()),
    )
    .await
    {
        Ok(Ok(Ok(served))) => info!("Owner served {} queries", served),
        Ok(Ok(Err(e))) => warn!("{}", e),
        Ok(Err(e)) => warn!("Failed to join the owner thread: {}", e),
        Err(_) => warn!("Owner thread still busy after shutdown"),
    }

    outcome.map_err(EngineError::from)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::core::io::property_file::LoadError;
    use crate::core::models::property::LigandRecord;
    use crate::engine::config::ServiceConfigBuilder;
    use crate::engine::store::LigandStore;
    use crate::supervisor::ProcessLauncher;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn load_failure_prevents_any_worker_launch() {
        let dir = tempdir().unwrap();
        let config = ServiceConfigBuilder::new()
            .property_path(dir.path().join("missing.bin.gz"))
            .num_ligands(5)
            .num_workers(2)
            .build()
            .unwrap();
        let (_stop, shutdown) = watch::channel(false);
        let launched = Arc::new(Mutex::new(false));

        let flag = Arc::clone(&launched);
        let result = run(
            &config,
            ProcessLauncher::new("sleep").arg("30"),
            shutdown,
            move |_| *flag.lock().unwrap() = true,
            &ProgressReporter::new(),
        )
        .await;

        assert!(matches!(
            result,
            Err(EngineError::Load {
                source: LoadError::Open { .. }
            })
        ));
        assert!(!*launched.lock().unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn serves_until_shutdown_is_requested() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("16_prop.bin.gz");
        let store = LigandStore::from_records(vec![LigandRecord::default(); 3]);
        PropertyTable::write_to_path(&store, &path).unwrap();
        let config = ServiceConfigBuilder::new()
            .property_path(path)
            .num_ligands(3)
            .num_workers(2)
            .build()
            .unwrap();

        let (stop, shutdown) = watch::channel(false);
        let (pool_tx, pool_rx) = tokio::sync::oneshot::channel();
        let service = tokio::spawn(async move {
            run(
                &config,
                ProcessLauncher::new("sleep").arg("30"),
                shutdown,
                move |pool| {
                    let _ = pool_tx.send(pool);
                },
                &ProgressReporter::new(),
            )
            .await
        });

        let mut pool = pool_rx.await.unwrap();
        for _ in 0..2 {
            let event = tokio::time::timeout(Duration::from_secs(10), pool.events.recv())
                .await
                .unwrap()
                .unwrap();
            assert!(matches!(event, PoolEvent::Started { .. }));
        }
        assert_eq!(pool.status.live_workers(), 2);

        stop.send(true).unwrap();
        service.await.unwrap().unwrap();
        assert_eq!(pool.status.live_workers(), 0);
    }
}
