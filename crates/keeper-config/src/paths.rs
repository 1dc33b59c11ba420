use std::path::{Path, PathBuf};

/// `<logs_dir>/<job>/<number>.log`
pub fn build_log_path(logs_dir: &Path, job_name: &str, number: i32) -> PathBuf {
    logs_dir.join(job_name).join(format!("{}.log", number))
}
