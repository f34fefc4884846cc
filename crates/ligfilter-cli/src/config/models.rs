use ligfilter::engine::config::ServiceConfig;
use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Clone, PartialEq)]
pub struct FrontendConfig {
    pub bind: IpAddr,
    pub base_port: u16,
}

impl FrontendConfig {
    /// The address worker `slot` listens on, if its port fits in `u16`.
    pub fn worker_addr(&self, slot: usize) -> Option<SocketAddr> {
        let port = u16::try_from(slot).ok()?.checked_add(self.base_port)?;
        Some(SocketAddr::new(self.bind, port))
    }
}

pub struct AppConfig {
    pub service: ServiceConfig,
    pub frontend: FrontendConfig,
}
