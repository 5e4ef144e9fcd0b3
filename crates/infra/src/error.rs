//! Error types of the infrastructure layer.

use licitacao_core::DomainError;

/// Failure of a storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("optimistic concurrency check failed: {0}")]
    Conflict(String),
    #[error("company isolation violation")]
    CompanyIsolation,
    #[error("storage error: {0}")]
    Storage(String),
}

/// Failure of a lifecycle operation. Nothing was written when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// The process or item does not exist or belongs to another company.
    #[error("not found")]
    NotFound,
    /// The status policy refused the move; carries its reason verbatim.
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Domain(DomainError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DomainError> for LifecycleError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::NotFound => LifecycleError::NotFound,
            DomainError::Rejected(reason) => LifecycleError::Rejected(reason),
            other => LifecycleError::Domain(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_are_mapped() {
        assert_eq!(
            LifecycleError::from(DomainError::not_found()),
            LifecycleError::NotFound
        );
        assert_eq!(
            LifecycleError::from(DomainError::rejected("processo com faturamento")).to_string(),
            "processo com faturamento"
        );
        assert!(matches!(
            LifecycleError::from(DomainError::invariant("x")),
            LifecycleError::Domain(DomainError::InvariantViolation(_))
        ));
    }
}
