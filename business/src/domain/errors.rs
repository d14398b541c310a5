/// Data-store failures surfaced to the domain.
/// Variants display as code-style identifiers so callers can translate them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository.not_found")]
    NotFound,
    #[error("repository.constraint_violation")]
    ConstraintViolation,
    #[error("repository.database_error")]
    DatabaseError,
}
