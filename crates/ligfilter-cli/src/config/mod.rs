pub mod builder;
pub mod defaults;
pub mod file;
pub mod models;

pub use builder::{CliOverrides, build_config};
pub use models::FrontendConfig;
