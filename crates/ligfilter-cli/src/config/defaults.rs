use directories::ProjectDirs;
use ligfilter::core::models::property::DEFAULT_NUM_LIGANDS;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::thread;

const CONFIG_FILE_NAME: &str = "config.toml";

pub struct DefaultsConfig {
    pub table_path: PathBuf,
    pub num_ligands: usize,
    pub num_workers: usize,
    pub bind: IpAddr,
    pub base_port: u16,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            table_path: PathBuf::from("idock/16_prop.bin.gz"),
            num_ligands: DEFAULT_NUM_LIGANDS,
            num_workers: thread::available_parallelism().map_or(1, |n| n.get()),
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            base_port: 3000,
        }
    }
}

/// The per-user configuration file, read when no `--config` is given and it exists.
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "ligfilter", "ligfilter")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
