use crate::constants::MAX_JOB_NAME_LEN;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct KeeperConfig {
    #[serde(default)]
    pub jobs: BTreeMap<String, JobConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JobConfig {
    pub command: String,
}

/// Reads job definitions from a `keeper.toml`. A missing file means no jobs.
pub async fn parse_keeper_toml(config_path: &Path) -> std::io::Result<KeeperConfig> {
    if !config_path.exists() {
        info!("No job configuration at {:?}", config_path);
        return Ok(KeeperConfig::default());
    }

    let content = tokio::fs::read_to_string(config_path).await?;
    let config: KeeperConfig = toml::from_str(&content)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    for name in config.jobs.keys() {
        validate_job_name(name)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    }

    Ok(config)
}

/// Job names end up in URLs and log paths.
pub fn validate_job_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Job name cannot be empty".to_string());
    }

    if name.len() > MAX_JOB_NAME_LEN {
        return Err(format!(
            "Job name '{}' is longer than {} characters",
            name, MAX_JOB_NAME_LEN
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        || name.starts_with('.')
    {
        return Err(format!(
            "Invalid job name '{}': must contain only letters, digits, '-', '_' and '.', and not start with '.'",
            name
        ));
    }

    Ok(())
}
