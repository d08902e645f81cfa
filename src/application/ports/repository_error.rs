/// Failures surfaced by the repository ports.
///
/// Missing rows are not errors; lookups return `Option` and deletes `bool`.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    /// Foreign-key, unique or check constraint rejected the write.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}
