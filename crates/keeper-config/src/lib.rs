mod config;
pub mod constants;
mod paths;

pub use config::{JobConfig, KeeperConfig, parse_keeper_toml, validate_job_name};
pub use paths::build_log_path;
