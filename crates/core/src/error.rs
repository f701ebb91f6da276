use crate::types::DbId;

/// Rejection reasons produced by the issue core.
///
/// Every variant is recoverable: the request is refused and no stored state
/// changes. The HTTP host maps each variant to its own status code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A referenced issue or owner does not exist.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Malformed or missing input (empty title, unknown status token).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Well-formed request that breaks a lifecycle rule.
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl CoreError {
    /// Shorthand for a missing issue.
    pub fn issue_not_found(id: DbId) -> Self {
        Self::NotFound { entity: "Issue", id }
    }

    /// Shorthand for an owner id the user lookup could not resolve.
    pub fn unknown_owner(id: DbId) -> Self {
        Self::NotFound { entity: "Owner", id }
    }
}
