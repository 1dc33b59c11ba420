use std::time::Duration;

pub const DEFAULT_API_HOST: &str = "0.0.0.0";
pub const DEFAULT_API_PORT: &str = "3000";

pub const DEFAULT_MAX_CONCURRENT_BUILDS: usize = 2;
pub const DEFAULT_LOGS_DIR: &str = "/var/lib/keeper/logs";
pub const DEFAULT_JOBS_CONFIG_PATH: &str = "/etc/keeper/keeper.toml";

pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(300);

/// How long a forced purge waits for a running build to stop.
pub const CANCEL_TIMEOUT: Duration = Duration::from_secs(30);
pub const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(250);

pub const BUILD_CHANNEL_CAPACITY: usize = 1000;

pub const MAX_JOB_NAME_LEN: usize = 128;
