use crate::error::Result;
use async_trait::async_trait;
use entity::{builds, jobs};
use keeper_config::build_log_path;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded,
    Failed(String),
    Cancelled,
}

/// Executes a single build. Implementations must return promptly once
/// `cancel` fires.
#[async_trait]
pub trait BuildRunner: Send + Sync {
    async fn run(
        &self,
        job: &jobs::Model,
        build: &builds::Model,
        cancel: CancellationToken,
    ) -> Result<RunOutcome>;
}

/// Runs the job's command through `sh -c`, output going to the build log.
pub struct CommandRunner {
    logs_dir: PathBuf,
}

impl CommandRunner {
    pub fn new(logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            logs_dir: logs_dir.into(),
        }
    }
}

#[async_trait]
impl BuildRunner for CommandRunner {
    async fn run(
        &self,
        job: &jobs::Model,
        build: &builds::Model,
        cancel: CancellationToken,
    ) -> Result<RunOutcome> {
        let log_file = build_log_path(&self.logs_dir, &job.name, build.number);
        if let Some(parent) = log_file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let stdout = tokio::fs::File::create(&log_file).await?.into_std().await;
        let stderr = stdout.try_clone()?;

        debug!("Running `{}` for {}#{}", job.command, job.name, build.number);

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&job.command)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .kill_on_drop(true)
            .spawn()?;

        tokio::select! {
            status = child.wait() => {
                let status = status?;
                if status.success() {
                    Ok(RunOutcome::Succeeded)
                } else {
                    Ok(RunOutcome::Failed(format!("command exited with {}", status)))
                }
            }
            _ = cancel.cancelled() => {
                info!("Killing build {}#{}", job.name, build.number);
                child.kill().await?;
                Ok(RunOutcome::Cancelled)
            }
        }
    }
}
