use ligfilter::core::io::csv_import::CsvImportError;
use ligfilter::core::io::property_file::LoadError;
use ligfilter::core::models::criteria::CriteriaError;
use ligfilter::engine::error::EngineError;
use ligfilter::relay::error::RelayError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    LigFilterCore(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid criteria: {0}")]
    Criteria(#[from] CriteriaError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<LoadError> for CliError {
    fn from(e: LoadError) -> Self {
        CliError::LigFilterCore(e.into())
    }
}

impl From<RelayError> for CliError {
    fn from(e: RelayError) -> Self {
        CliError::LigFilterCore(e.into())
    }
}

impl From<CsvImportError> for CliError {
    fn from(e: CsvImportError) -> Self {
        match e {
            CsvImportError::Csv { path, source } => CliError::FileParsing {
                path,
                source: source.into(),
            },
            CsvImportError::MissingColumn { path, column } => CliError::FileParsing {
                path,
                source: anyhow::anyhow!("missing column '{}'", column),
            },
        }
    }
}
