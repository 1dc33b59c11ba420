use keeper_config::constants;
use keeper_purge::PurgeSettings;
use keeper_scheduler::{CommandRunner, Executions, WorkerConfig};
use keeper_store::Store;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub fn logs_dir() -> PathBuf {
    std::env::var("LOGS_DIR")
        .unwrap_or_else(|_| constants::DEFAULT_LOGS_DIR.into())
        .into()
}

pub fn jobs_config_path() -> PathBuf {
    std::env::var("JOBS_CONFIG_PATH")
        .unwrap_or_else(|_| constants::DEFAULT_JOBS_CONFIG_PATH.into())
        .into()
}

pub fn create_worker_config(store: Arc<Store>, executions: Executions) -> WorkerConfig {
    WorkerConfig {
        store,
        runner: Arc::new(CommandRunner::new(logs_dir())),
        executions,
        max_concurrent_builds: std::env::var("MAX_CONCURRENT_BUILDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(constants::DEFAULT_MAX_CONCURRENT_BUILDS),
    }
}

pub fn create_purge_settings() -> PurgeSettings {
    PurgeSettings {
        cancel_timeout: std::env::var("CANCEL_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(constants::CANCEL_TIMEOUT),
        logs_dir: Some(logs_dir()),
        ..PurgeSettings::default()
    }
}
