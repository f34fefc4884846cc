//! # Worker Pool Supervision
//!
//! The owner process keeps a fixed number of worker processes alive. Each worker is started
//! through a [`WorkerLauncher`], attached to the owner's scan thread over its stdin/stdout,
//! and watched for exit. A worker that exits for any reason is replaced in the same slot, so
//! the pool returns to its configured size without operator action.

pub mod launcher;
pub mod pool;

pub use launcher::{ProcessLauncher, WorkerLauncher};
pub use pool::{PoolEvent, PoolStatus, Supervisor};

use std::io;
use thiserror::Error;

/// Environment variable through which a launched worker learns its slot.
pub const WORKER_SLOT_ENV: &str = "LIGFILTER_WORKER_SLOT";

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("Failed to launch worker for slot {slot}: {source}")]
    Launch {
        slot: usize,
        #[source]
        source: io::Error,
    },

    #[error("Worker for slot {slot} was launched without a piped {stream}")]
    MissingPipe { slot: usize, stream: &'static str },
}
