use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Protected by the retention policy. Expected, not an error.
    NotDeletable,
    DeletionFailed,
    StatusCheckFailed,
    CancellationTimeout,
    CancellationFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SkippedBuild {
    pub number: i32,
    pub reason: SkipReason,
    pub message: String,
}

/// Outcome of one purge. Builds listed in `skipped` are still present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PurgeResult {
    pub job: String,
    pub deleted_count: usize,
    pub skipped_count: usize,
    pub counter_reset: bool,
    pub next_build_number: i32,
    pub skipped: Vec<SkippedBuild>,
}

impl PurgeResult {
    pub fn new(job: &str) -> Self {
        Self {
            job: job.to_string(),
            deleted_count: 0,
            skipped_count: 0,
            counter_reset: false,
            next_build_number: 0,
            skipped: Vec::new(),
        }
    }

    pub fn record_deleted(&mut self) {
        self.deleted_count += 1;
    }

    pub fn record_skipped(&mut self, number: i32, reason: SkipReason, message: String) {
        self.skipped_count += 1;
        self.skipped.push(SkippedBuild {
            number,
            reason,
            message,
        });
    }

    /// Skips caused by failures rather than by the retention policy.
    pub fn errors(&self) -> impl Iterator<Item = &SkippedBuild> {
        self.skipped
            .iter()
            .filter(|s| s.reason != SkipReason::NotDeletable)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_skips_are_not_errors() {
        let mut result = PurgeResult::new("nightly");
        result.record_deleted();
        result.record_skipped(2, SkipReason::NotDeletable, "kept".into());
        assert_eq!(result.deleted_count, 1);
        assert_eq!(result.skipped_count, 1);
        assert!(!result.has_errors());

        result.record_skipped(3, SkipReason::CancellationTimeout, "stuck".into());
        assert_eq!(result.skipped_count, 2);
        assert_eq!(
            result.errors().map(|s| s.number).collect::<Vec<_>>(),
            vec![3]
        );
    }

    #[test]
    fn test_serializes_reasons_in_snake_case() {
        let mut result = PurgeResult::new("nightly");
        result.record_skipped(1, SkipReason::CancellationTimeout, "stuck".into());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["skipped"][0]["reason"], "cancellation_timeout");
        assert_eq!(json["skipped_count"], 1);
    }
}
