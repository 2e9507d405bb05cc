//! Errors raised at the profile boundary.

/// Error types for profile loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// No actor with this ID exists in the store
    #[error("Actor not found: {0}")]
    NotFound(String),

    /// Profile data violates an invariant
    #[error("Invalid profile {actor_id}: {reason}")]
    Invalid { actor_id: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ProfileError>;
