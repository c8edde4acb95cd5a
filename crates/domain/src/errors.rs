use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Repository error: {0}")]
    RepositoryError(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    pub fn repository(message: impl Into<String>) -> Self {
        Self::RepositoryError(message.into())
    }

    /// Caller-supplied input was rejected; everything else is a storage fault.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_))
    }
}
