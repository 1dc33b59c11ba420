use crate::error::{PurgeError, Result};

/// A purge as requested by a user or another service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeRequest {
    pub job_id: String,
    pub reset_next_build: bool,
    pub force: bool,
}

impl PurgeRequest {
    pub fn validate(&self) -> Result<()> {
        keeper_config::validate_job_name(&self.job_id).map_err(PurgeError::InvalidRequest)
    }
}
