use super::defaults::{self, DefaultsConfig};
use super::file::FileConfig;
use super::models::{AppConfig, FrontendConfig};
use crate::cli::ConfigArgs;
use crate::error::{CliError, Result};
use ligfilter::engine::config::ServiceConfigBuilder;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Command-specific flags that take precedence over every configuration source.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub num_workers: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub bind: Option<IpAddr>,
    pub base_port: Option<u16>,
}

/// Resolves the application configuration from, in increasing precedence: built-in
/// defaults, the config file, `--set` values, and command-line flags.
pub fn build_config(args: &ConfigArgs, overrides: &CliOverrides) -> Result<AppConfig> {
    build_config_with_defaults(args, overrides, DefaultsConfig::default())
}

fn build_config_with_defaults(
    args: &ConfigArgs,
    overrides: &CliOverrides,
    defaults: DefaultsConfig,
) -> Result<AppConfig> {
    let file_config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => match defaults::user_config_path().filter(|p| p.is_file()) {
            Some(path) => FileConfig::from_file(&path)?,
            None => FileConfig::default(),
        },
    };
    let file_config = apply_set_values(file_config, &args.set_values)?;
    debug!("Effective file configuration: {:?}", file_config);

    let table = file_config.table.unwrap_or_default();
    let workers = file_config.workers.unwrap_or_default();
    let relay = file_config.relay.unwrap_or_default();
    let frontend = file_config.frontend.unwrap_or_default();

    let request_timeout = overrides
        .request_timeout_secs
        .or(relay.request_timeout_secs)
        .map(Duration::from_secs);

    let service = ServiceConfigBuilder::new()
        .property_path(
            args.table
                .clone()
                .or(table.path)
                .unwrap_or(defaults.table_path),
        )
        .num_ligands(
            args.num_ligands
                .or(table.num_ligands)
                .unwrap_or(defaults.num_ligands),
        )
        .num_workers(
            overrides
                .num_workers
                .or(workers.count)
                .unwrap_or(defaults.num_workers),
        )
        .request_timeout(request_timeout)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let frontend = FrontendConfig {
        bind: overrides.bind.or(frontend.bind).unwrap_or(defaults.bind),
        base_port: overrides
            .base_port
            .or(frontend.base_port)
            .unwrap_or(defaults.base_port),
    };
    if frontend.worker_addr(service.pool.num_workers - 1).is_none() {
        return Err(CliError::Config(format!(
            "{} workers starting at port {} exceed the port range",
            service.pool.num_workers, frontend.base_port
        )));
    }

    Ok(AppConfig { service, frontend })
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let (key, value_str) = kv_pair.split_once('=').ok_or_else(|| {
            CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            ))
        })?;

        match key {
            "table.path" => {
                config.table.get_or_insert_with(Default::default).path =
                    Some(value_str.into());
            }
            "table.num-ligands" => {
                config.table.get_or_insert_with(Default::default).num_ligands =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "workers.count" => {
                config.workers.get_or_insert_with(Default::default).count =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "relay.request-timeout-secs" => {
                config
                    .relay
                    .get_or_insert_with(Default::default)
                    .request_timeout_secs = Some(parse_value(key, value_str, "integer")?);
            }
            "frontend.bind" => {
                config.frontend.get_or_insert_with(Default::default).bind =
                    Some(parse_value(key, value_str, "address")?);
            }
            "frontend.base-port" => {
                config.frontend.get_or_insert_with(Default::default).base_port =
                    Some(parse_value(key, value_str, "port")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
