use std::io;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Relay channel I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed relay message: {source}")]
    Malformed {
        #[from]
        source: serde_json::Error,
    },

    #[error("The owner process disconnected before replying")]
    OwnerDisconnected,

    #[error("The owner did not reply within {0:?}")]
    Timeout(Duration),

    #[error("Criteria with infinite bounds cannot be relayed")]
    NonFiniteCriteria,

    #[error("The owner scan thread has stopped")]
    OwnerStopped,
}
