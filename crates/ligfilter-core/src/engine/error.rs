use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::property_file::LoadError;
use crate::relay::error::RelayError;
use crate::supervisor::SupervisorError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to load the ligand property table: {source}")]
    Load {
        #[from]
        source: LoadError,
    },

    #[error("Invalid service configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Query relay failed: {source}")]
    Relay {
        #[from]
        source: RelayError,
    },

    #[error("Worker supervision failed: {source}")]
    Supervisor {
        #[from]
        source: SupervisorError,
    },
}
