use entity::sea_orm_active_enums::{BuildResult, BuildStatus};
use keeper_config::KeeperConfig;
use keeper_store::Store;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn reconcile_jobs(store: &Store, config_path: &Path) -> anyhow::Result<()> {
    let config = keeper_config::parse_keeper_toml(config_path).await?;
    info!("Reconciling {} jobs from configuration", config.jobs.len());

    for (name, job) in &config.jobs {
        match store.jobs().find_by_name(name).await? {
            Some(existing) if existing.command == job.command => {}
            Some(_) => {
                store.jobs().update_command(name, &job.command).await?;
                info!("Updated job: {}", name);
            }
            None => {
                store.jobs().create_job(name, &job.command).await?;
                info!("Created job: {}", name);
            }
        }
    }

    cleanup_removed_jobs(store, &config).await?;

    Ok(())
}

async fn cleanup_removed_jobs(store: &Store, config: &KeeperConfig) -> anyhow::Result<()> {
    for job in store.jobs().list_all().await? {
        if !config.jobs.contains_key(&job.name) {
            let _guard = store.lock_job(&job.name).await;
            info!("Removing job no longer in config: {}", job.name);
            store.jobs().delete(&job.name).await?;
        }
    }

    Ok(())
}

/// Settles builds a previous process left behind. Nothing is executing yet,
/// so running builds are aborted and queued ones are dispatched again.
pub async fn reconcile_builds(store: &Store, build_tx: &mpsc::Sender<i32>) -> anyhow::Result<()> {
    for build in store.builds().list_by_status(BuildStatus::Running).await? {
        warn!(
            "Aborting build {}#{} interrupted by restart",
            build.job_name, build.number
        );
        store
            .builds()
            .mark_finished(
                build.id,
                BuildResult::Aborted,
                Some("interrupted by restart".to_string()),
            )
            .await?;
    }

    let queued = store.builds().list_by_status(BuildStatus::Queued).await?;
    if !queued.is_empty() {
        info!("Re-dispatching {} queued build(s)", queued.len());
    }
    for build in queued {
        build_tx.send(build.id).await?;
    }

    Ok(())
}
