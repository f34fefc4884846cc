use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableConfig {
    pub path: PathBuf,
    pub num_ligands: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoolConfig {
    pub num_workers: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelayConfig {
    /// `None` waits for the owner indefinitely.
    pub request_timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub table: TableConfig,
    pub pool: PoolConfig,
    pub relay: RelayConfig,
}

#[derive(Default)]
pub struct ServiceConfigBuilder {
    property_path: Option<PathBuf>,
    num_ligands: Option<usize>,
    num_workers: Option<usize>,
    request_timeout: Option<Duration>,
}

impl ServiceConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property_path(mut self, path: PathBuf) -> Self {
        self.property_path = Some(path);
        self
    }
    pub fn num_ligands(mut self, n: usize) -> Self {
        self.num_ligands = Some(n);
        self
    }
    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = Some(n);
        self
    }
    pub fn request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<ServiceConfig, ConfigError> {
        let table = TableConfig {
            path: self
                .property_path
                .ok_or(ConfigError::MissingParameter("property_path"))?,
            num_ligands: self
                .num_ligands
                .ok_or(ConfigError::MissingParameter("num_ligands"))?,
        };
        let num_workers = self
            .num_workers
            .ok_or(ConfigError::MissingParameter("num_workers"))?;
        if num_workers == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "num_workers",
                reason: "at least one worker process is required".to_string(),
            });
        }
        if self.request_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::InvalidParameter {
                name: "request_timeout",
                reason: "a timeout must be longer than zero".to_string(),
            });
        }
        Ok(ServiceConfig {
            table,
            pool: PoolConfig { num_workers },
            relay: RelayConfig {
                request_timeout: self.request_timeout,
            },
        })
    }
}
