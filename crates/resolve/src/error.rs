use uuid::Uuid;

/// Errors returned while resolving a record label.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// No record with this id exists in the schema.
    #[error("record {id} not found in {schema}")]
    NotFound { schema: String, id: Uuid },

    /// A source-specific failure (connection, permissions, etc.).
    #[error("record source error: {0}")]
    Backend(String),

    /// Every candidate schema failed.
    #[error("no target schema could resolve record {0}")]
    Unresolved(Uuid),
}
