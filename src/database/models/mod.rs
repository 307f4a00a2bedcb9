//! Persisted document models.

mod common;
mod guild_config;
mod infraction;
mod report;
mod request;
mod task;

pub use common::{ActionKind, AlertRef, ResolutionAction, ResolutionStatus, ReviewFamily, now_ts};
pub use guild_config::{Capability, CapabilityGrant, GuildConfig, ReasonPolicy};
pub use infraction::Infraction;
pub use report::{Report, ReportKind};
pub use request::ActionRequest;
pub use task::ExpiryTask;
