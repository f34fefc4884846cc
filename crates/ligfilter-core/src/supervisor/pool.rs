use super::SupervisorError;
use super::launcher::WorkerLauncher;
use crate::relay::owner::{OwnerHandle, WorkerChannel, attach};
use slotmap::{SlotMap, new_key_type};
use std::process::ExitStatus;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::process::Child;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

const RELAUNCH_BACKOFF: Duration = Duration::from_secs(1);
/// A worker that dies sooner than this after launch is relaunched only after the backoff.
const MIN_UPTIME: Duration = Duration::from_secs(1);
const STOP_GRACE: Duration = Duration::from_secs(5);
const EVENT_CAPACITY: usize = 64;

new_key_type! {
    struct WorkerKey;
}

/// Lifecycle notifications broadcast by a running [`Supervisor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolEvent {
    Started {
        slot: usize,
        pid: u32,
    },
    Exited {
        slot: usize,
        pid: u32,
        status: Option<ExitStatus>,
    },
    Restarted {
        slot: usize,
        old_pid: u32,
        new_pid: u32,
    },
}

/// Read-only view of the pool size, valid while the supervisor runs.
#[derive(Debug, Clone)]
pub struct PoolStatus {
    live: Arc<AtomicUsize>,
}

impl PoolStatus {
    pub fn live_workers(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }
}

struct WorkerEntry {
    slot: usize,
    pid: u32,
    started: Instant,
    channel: WorkerChannel,
    kill: oneshot::Sender<()>,
    watcher: JoinHandle<()>,
}

enum Signal {
    Exited {
        key: WorkerKey,
        status: Option<ExitStatus>,
    },
    Relaunch {
        slot: usize,
        old_pid: u32,
    },
}

/// Keeps `num_workers` worker processes alive for one owner.
pub struct Supervisor<L> {
    launcher: L,
    num_workers: usize,
    events: broadcast::Sender<PoolEvent>,
    live: Arc<AtomicUsize>,
}

impl<L: WorkerLauncher> Supervisor<L> {
    pub fn new(launcher: L, num_workers: usize) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            launcher,
            num_workers,
            events,
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PoolEvent> {
        self.events.subscribe()
    }

    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            live: Arc::clone(&self.live),
        }
    }

    /// Launches the pool and supervises it until `shutdown` turns `true` or its sender is
    /// dropped. Every worker is stopped before this returns.
    ///
    /// # Errors
    ///
    /// Fails only if a worker of the initial pool cannot be launched. A failed relaunch
    /// after a worker death is retried until it succeeds.
    pub async fn run(
        self,
        owner: OwnerHandle,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), SupervisorError> {
        let (signals, mut inbox) = mpsc::unbounded_channel();
        let mut workers = SlotMap::with_key();

        info!("Forking {} worker processes", self.num_workers);
        for slot in 0..self.num_workers {
            match self.start(&mut workers, slot, &owner, &signals) {
                Ok(pid) => {
                    info!("Worker process {} started in slot {}", pid, slot);
                    let _ = self.events.send(PoolEvent::Started { slot, pid });
                }
                Err(e) => {
                    self.stop_all(workers).await;
                    return Err(e);
                }
            }
        }
        info!("Worker pool is up with {} processes", self.num_workers);

        while !*shutdown.borrow() {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                Some(signal) = inbox.recv() => match signal {
                    Signal::Exited { key, status } => {
                        let Some(entry) = workers.remove(key) else {
                            continue;
                        };
                        entry.channel.abort();
                        self.live.fetch_sub(1, Ordering::AcqRel);
                        error!("Worker process {} died. Restarting...", entry.pid);
                        let _ = self.events.send(PoolEvent::Exited {
                            slot: entry.slot,
                            pid: entry.pid,
                            status,
                        });
                        if entry.started.elapsed() < MIN_UPTIME {
                            warn!(
                                "Worker process {} lived under {} ms; relaunching slot {} after backoff",
                                entry.pid,
                                MIN_UPTIME.as_millis(),
                                entry.slot
                            );
                            schedule_relaunch(&signals, entry.slot, entry.pid);
                        } else {
                            self.relaunch(&mut workers, entry.slot, entry.pid, &owner, &signals);
                        }
                    }
                    Signal::Relaunch { slot, old_pid } => {
                        self.relaunch(&mut workers, slot, old_pid, &owner, &signals);
                    }
                },
            }
        }

        info!("Stopping {} worker processes", workers.len());
        self.stop_all(workers).await;
        Ok(())
    }

    fn start(
        &self,
        workers: &mut SlotMap<WorkerKey, WorkerEntry>,
        slot: usize,
        owner: &OwnerHandle,
        signals: &mpsc::UnboundedSender<Signal>,
    ) -> Result<u32, SupervisorError> {
        let mut child = self
            .launcher
            .launch(slot)
            .map_err(|source| SupervisorError::Launch { slot, source })?;
        let pid = child.id().unwrap_or_default();
        let stdin = child.stdin.take().ok_or(SupervisorError::MissingPipe {
            slot,
            stream: "stdin",
        })?;
        let stdout = child.stdout.take().ok_or(SupervisorError::MissingPipe {
            slot,
            stream: "stdout",
        })?;

        let channel = attach(slot, stdout, stdin, owner.clone());
        let (kill, killed) = oneshot::channel();
        let signals = signals.clone();
        workers.insert_with_key(|key| WorkerEntry {
            slot,
            pid,
            started: Instant::now(),
            channel,
            kill,
            watcher: tokio::spawn(watch_exit(key, child, killed, signals)),
        });
        self.live.fetch_add(1, Ordering::AcqRel);
        Ok(pid)
    }

    fn relaunch(
        &self,
        workers: &mut SlotMap<WorkerKey, WorkerEntry>,
        slot: usize,
        old_pid: u32,
        owner: &OwnerHandle,
        signals: &mpsc::UnboundedSender<Signal>,
    ) {
        match self.start(workers, slot, owner, signals) {
            Ok(new_pid) => {
                info!(
                    "Worker process {} replaced {} in slot {}",
                    new_pid, old_pid, slot
                );
                let _ = self.events.send(PoolEvent::Restarted {
                    slot,
                    old_pid,
                    new_pid,
                });
            }
            Err(e) => {
                warn!(
                    "{}; retrying in {} ms",
                    e,
                    RELAUNCH_BACKOFF.as_millis()
                );
                schedule_relaunch(signals, slot, old_pid);
            }
        }
    }

    async fn stop_all(&self, workers: SlotMap<WorkerKey, WorkerEntry>) {
        for (_, entry) in workers {
            entry.channel.abort();
            let _ = entry.kill.send(());
            if tokio::time::timeout(STOP_GRACE, entry.watcher).await.is_err() {
                warn!("Worker process {} did not stop in time", entry.pid);
            }
            self.live.fetch_sub(1, Ordering::AcqRel);
            debug!("Worker process {} stopped", entry.pid);
        }
    }
}

fn schedule_relaunch(signals: &mpsc::UnboundedSender<Signal>, slot: usize, old_pid: u32) {
    let signals = signals.clone();
    tokio::spawn(async move {
        tokio::time::sleep(RELAUNCH_BACKOFF).await;
        let _ = signals.send(Signal::Relaunch { slot, old_pid });
    });
}

/// Waits for `child` to exit on its own, or kills it once `killed` fires.
async fn watch_exit(
    key: WorkerKey,
    mut child: Child,
    killed: oneshot::Receiver<()>,
    signals: mpsc::UnboundedSender<Signal>,
) {
    let exited = tokio::select! {
        status = child.wait() => Some(status.ok()),
        _ = killed => None,
    };
    match exited {
        Some(status) => {
            let _ = signals.send(Signal::Exited { key, status });
        }
        None => {
            let _ = child.kill().await;
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::core::models::property::LigandRecord;
    use crate::engine::store::LigandStore;
    use crate::relay::owner::Owner;
    use crate::supervisor::launcher::ProcessLauncher;

    const EVENT_WAIT: Duration = Duration::from_secs(10);

    fn owner() -> OwnerHandle {
        let (owner, _thread) = Owner::spawn(LigandStore::from_records([LigandRecord::default()]))
            .unwrap();
        owner
    }

    async fn next_event(events: &mut broadcast::Receiver<PoolEvent>) -> PoolEvent {
        tokio::time::timeout(EVENT_WAIT, events.recv())
            .await
            .expect("no pool event in time")
            .unwrap()
    }

    fn kill_hard(pid: u32) {
        let status = std::process::Command::new("kill")
            .arg("-9")
            .arg(pid.to_string())
            .status()
            .unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn killed_worker_is_replaced_in_its_slot() {
        let supervisor = Supervisor::new(ProcessLauncher::new("sleep").arg("30"), 2);
        let mut events = supervisor.subscribe();
        let status = supervisor.status();
        let (stop, shutdown) = watch::channel(false);
        let pool = tokio::spawn(supervisor.run(owner(), shutdown));

        let mut started = Vec::new();
        for _ in 0..2 {
            match next_event(&mut events).await {
                PoolEvent::Started { slot, pid } => started.push((slot, pid)),
                other => panic!("unexpected event {:?}", other),
            }
        }
        assert_eq!(status.live_workers(), 2);

        let (victim_slot, victim_pid) = started[0];
        kill_hard(victim_pid);

        match next_event(&mut events).await {
            PoolEvent::Exited { slot, pid, status } => {
                assert_eq!((slot, pid), (victim_slot, victim_pid));
                assert!(!status.unwrap().success());
            }
            other => panic!("unexpected event {:?}", other),
        }
        match next_event(&mut events).await {
            PoolEvent::Restarted {
                slot,
                old_pid,
                new_pid,
            } => {
                assert_eq!(slot, victim_slot);
                assert_eq!(old_pid, victim_pid);
                assert_ne!(new_pid, victim_pid);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(status.live_workers(), 2);

        stop.send(true).unwrap();
        pool.await.unwrap().unwrap();
        assert_eq!(status.live_workers(), 0);
    }

    #[tokio::test]
    async fn worker_dying_at_startup_is_relaunched_after_backoff() {
        let supervisor = Supervisor::new(ProcessLauncher::new("sh").arg("-c").arg("exit 1"), 1);
        let mut events = supervisor.subscribe();
        let (stop, shutdown) = watch::channel(false);
        let pool = tokio::spawn(supervisor.run(owner(), shutdown));

        assert!(matches!(
            next_event(&mut events).await,
            PoolEvent::Started { slot: 0, .. }
        ));
        assert!(matches!(
            next_event(&mut events).await,
            PoolEvent::Exited { slot: 0, .. }
        ));
        let exited_at = std::time::Instant::now();
        assert!(matches!(
            next_event(&mut events).await,
            PoolEvent::Restarted { slot: 0, .. }
        ));
        assert!(exited_at.elapsed() >= RELAUNCH_BACKOFF - Duration::from_millis(100));

        stop.send(true).unwrap();
        pool.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn dropping_the_shutdown_sender_stops_the_pool() {
        let supervisor = Supervisor::new(ProcessLauncher::new("sleep").arg("30"), 1);
        let mut events = supervisor.subscribe();
        let status = supervisor.status();
        let (stop, shutdown) = watch::channel(false);
        let pool = tokio::spawn(supervisor.run(owner(), shutdown));

        assert!(matches!(
            next_event(&mut events).await,
            PoolEvent::Started { slot: 0, .. }
        ));
        drop(stop);
        pool.await.unwrap().unwrap();
        assert_eq!(status.live_workers(), 0);
    }

    #[tokio::test]
    async fn initial_launch_failure_is_reported() {
        let supervisor = Supervisor::new(ProcessLauncher::new("/nonexistent/ligfilter-worker"), 3);
        let (_stop, shutdown) = watch::channel(false);

        let result = supervisor.run(owner(), shutdown).await;
        assert!(matches!(
            result,
            Err(SupervisorError::Launch { slot: 0, .. })
        ));
    }
}
