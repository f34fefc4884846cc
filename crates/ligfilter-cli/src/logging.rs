use crate::error::{CliError, Result};
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self},
    prelude::*,
};

#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    pub verbosity: u8,
    pub quiet: bool,
    pub log_file: Option<PathBuf>,
}

impl LogSettings {
    pub fn level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::ERROR;
        }
        match self.verbosity {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    /// Command-line flags that give a worker process the same console verbosity.
    ///
    /// The log file is never forwarded; workers log to stderr only, since their stdout is
    /// the relay channel and the file belongs to the owner.
    pub fn worker_args(&self) -> Vec<String> {
        if self.quiet {
            vec!["--quiet".to_string()]
        } else if self.verbosity > 0 {
            vec![format!("-{}", "v".repeat(self.verbosity as usize))]
        } else {
            Vec::new()
        }
    }
}

pub fn setup_logging(settings: &LogSettings) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact();

    let subscriber = tracing_subscriber::registry()
        .with(settings.level())
        .with(stderr_layer);

    if let Some(path) = &settings.log_file {
        let file = File::create(path).map_err(CliError::Io)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_thread_ids(true)
            .with_target(true);

        subscriber.with(file_layer).init();
    } else {
        subscriber.init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::Once;
    use std::thread;
    use std::time::Duration;
    use tracing::{debug, error, info, trace, warn};

    static INIT: Once = Once::new();

    fn ensure_global_logger_is_set() {
        INIT.call_once(|| {
            let settings = LogSettings {
                verbosity: 3,
                ..LogSettings::default()
            };
            setup_logging(&settings).expect("Failed to set up global logger for tests");
        });
    }

    #[test]
    fn verbosity_maps_to_levels() {
        let level = |verbosity, quiet| {
            LogSettings {
                verbosity,
                quiet,
                log_file: None,
            }
            .level()
        };
        assert_eq!(level(0, false), LevelFilter::WARN);
        assert_eq!(level(1, false), LevelFilter::INFO);
        assert_eq!(level(2, false), LevelFilter::DEBUG);
        assert_eq!(level(7, false), LevelFilter::TRACE);
        assert_eq!(level(0, true), LevelFilter::ERROR);
    }

    #[test]
    fn worker_args_reproduce_console_verbosity_without_log_file() {
        let settings = LogSettings {
            verbosity: 2,
            quiet: false,
            log_file: Some(PathBuf::from("owner.log")),
        };
        assert_eq!(settings.worker_args(), vec!["-vv".to_string()]);

        let quiet = LogSettings {
            quiet: true,
            ..LogSettings::default()
        };
        assert_eq!(quiet.worker_args(), vec!["--quiet".to_string()]);
        assert!(LogSettings::default().worker_args().is_empty());
    }

    #[test]
    #[serial]
    fn initialization_and_macros_work() {
        ensure_global_logger_is_set();

        error!("This is an error");
        warn!("This is a warning");
        info!("This is info");
        debug!("This is debug");
        trace!("This is trace");
    }

    #[test]
    #[serial]
    fn file_logging_can_be_added_to_global_logger() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("owner.log");

        let file = File::create(log_path.clone()).unwrap();
        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_thread_ids(true);
        let subscriber = tracing_subscriber::registry().with(file_layer);

        tracing::subscriber::with_default(subscriber, || {
            debug!("Parsed {} ligands within {} milliseconds", 5, 1);
        });

        thread::sleep(Duration::from_millis(100));

        let content = std::fs::read_to_string(log_path).unwrap();
        assert!(content.contains("Parsed 5 ligands within 1 milliseconds"));
        assert!(content.contains("DEBUG"));
        assert!(content.contains("ThreadId"));
    }

    #[test]
    #[serial]
    fn invalid_log_file_path_propagates_error() {
        let invalid_path = PathBuf::from("/");

        if cfg!(unix) && invalid_path.is_dir() {
            let settings = LogSettings {
                log_file: Some(invalid_path),
                ..LogSettings::default()
            };
            let result = setup_logging(&settings);
            assert!(matches!(result, Err(CliError::Io(_))));
        }
    }
}
