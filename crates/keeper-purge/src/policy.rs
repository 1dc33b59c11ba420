//! Retention policy: which builds a purge may delete.

use entity::builds;
use entity::sea_orm_active_enums::BuildStatus;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    Running,
    KeptForever,
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Refusal::Running => write!(f, "build is running"),
            Refusal::KeptForever => write!(f, "build is kept forever"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Refused(Refusal),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

/// `force` overrides every protection.
pub fn evaluate(build: &builds::Model, force: bool) -> Decision {
    if force {
        return Decision::Allowed;
    }

    if build.status == BuildStatus::Running {
        return Decision::Refused(Refusal::Running);
    }

    if build.kept_forever {
        return Decision::Refused(Refusal::KeptForever);
    }

    Decision::Allowed
}

pub fn can_delete(build: &builds::Model, force: bool) -> bool {
    evaluate(build, force).is_allowed()
}
