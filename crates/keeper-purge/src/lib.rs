mod error;
mod executor;
pub mod policy;
mod request;
mod result;

pub use error::{PurgeError, Result};
pub use executor::{PurgeExecutor, PurgeSettings};
pub use policy::{Decision, Refusal, can_delete};
pub use request::PurgeRequest;
pub use result::{PurgeResult, SkipReason, SkippedBuild};
