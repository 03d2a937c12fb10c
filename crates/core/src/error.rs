use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller's `expected_version` no longer matches the stored row.
    /// Always retriable after reloading the latest state.
    #[error("Concurrent modification: {entity} {id} expected version {expected}, found {actual}")]
    ConcurrentModification {
        entity: &'static str,
        id: DbId,
        expected: i32,
        actual: i32,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether the caller may resubmit after re-fetching fresh state.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::ConcurrentModification { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_concurrent_modification_is_retriable() {
        let cm = CoreError::ConcurrentModification {
            entity: "Prototype",
            id: 7,
            expected: 1,
            actual: 2,
        };
        assert!(cm.is_retriable());
        assert!(!CoreError::Conflict("dup".into()).is_retriable());
        assert!(!CoreError::NotFound {
            entity: "Prototype",
            id: 7
        }
        .is_retriable());
    }

    #[test]
    fn concurrent_modification_message_names_both_versions() {
        let msg = CoreError::ConcurrentModification {
            entity: "Prototype",
            id: 3,
            expected: 4,
            actual: 5,
        }
        .to_string();
        assert!(msg.contains("expected version 4"));
        assert!(msg.contains("found 5"));
    }
}
