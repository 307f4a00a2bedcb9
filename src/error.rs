//! Error taxonomy for the moderation lifecycle.

use thiserror::Error;

use crate::database::models::Capability;

/// Failures surfaced by resolution and issuance flows.
///
/// Only `Persistence` is ever unexpected; the other variants are normal
/// outcomes of racing staff, departed targets, and stale UI elements, and
/// each maps to a short user-facing reply rather than a crash.
#[derive(Debug, Error)]
pub enum ModerationError {
    /// The referenced entity, guild, or task no longer exists.
    #[error("the referenced entry no longer exists")]
    NotFound,

    /// The acting staff member lacks the named capability. No state changed.
    #[error("missing capability: {0}")]
    PermissionDenied(Capability),

    /// The entity already reached a terminal status; the attempt is benign.
    #[error("already resolved")]
    AlreadyResolved,

    /// The platform could not apply or remove an effect.
    #[error("platform action failed: {0}")]
    ActionFailed(#[from] GatewayError),

    /// Transient store error; surfaced to callers as a generic failure.
    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

/// Classified failures from the platform collaborators.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The target is no longer present on the platform.
    #[error("target is not present")]
    TargetAbsent,

    /// The platform rejected the call for lack of permission.
    #[error("insufficient platform permission")]
    Forbidden,

    /// Anything else the platform reported.
    #[error("{0}")]
    Platform(String),
}
