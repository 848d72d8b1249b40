use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ResolveError;

/// A source of human-readable record labels.
///
/// Implementations must be `Send + Sync + 'static` so lookups can run on a
/// background task.
#[async_trait]
pub trait RecordSource: Send + Sync + 'static {
    /// The primary name of record `id` in `schema`.
    async fn record_label(&self, schema: &str, id: Uuid) -> Result<String, ResolveError>;
}

/// Record labels held in memory, keyed by schema and id.
#[derive(Debug, Default, Clone)]
pub struct InMemorySource {
    labels: HashMap<(String, Uuid), String>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, schema: &str, id: Uuid, label: &str) -> Self {
        self.labels
            .insert((schema.to_string(), id), label.to_string());
        self
    }
}

#[async_trait]
impl RecordSource for InMemorySource {
    async fn record_label(&self, schema: &str, id: Uuid) -> Result<String, ResolveError> {
        self.labels
            .get(&(schema.to_string(), id))
            .cloned()
            .ok_or_else(|| ResolveError::NotFound {
                schema: schema.to_string(),
                id,
            })
    }
}
