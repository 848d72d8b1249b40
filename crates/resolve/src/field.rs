//! Label resolution for one value field.
//!
//! Each request supersedes the previous one: the older task is aborted and
//! any result it still delivers is discarded because its generation is no
//! longer current.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use qtree_core::LabelRequest;

use crate::error::ResolveError;
use crate::source::RecordSource;

/// Try each target schema in order and return the first label found.
///
/// Per-target failures are logged and skipped.
pub async fn resolve_first<S>(source: &S, request: &LabelRequest) -> Result<String, ResolveError>
where
    S: RecordSource + ?Sized,
{
    for schema in &request.targets {
        match source.record_label(schema, request.id).await {
            Ok(label) => return Ok(label),
            Err(e) => {
                tracing::debug!(schema = %schema, id = %request.id, error = %e, "label lookup failed");
            }
        }
    }
    Err(ResolveError::Unresolved(request.id))
}

/// A label delivered by a background lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub generation: u64,
    pub id: Uuid,
    pub label: String,
}

/// Tracks the label lookup for a single GUID value field.
pub struct LabelField<S: RecordSource> {
    source: Arc<S>,
    generation: u64,
    current: Option<Uuid>,
    label: Option<String>,
    task: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<Resolved>,
    rx: mpsc::UnboundedReceiver<Resolved>,
}

impl<S: RecordSource> LabelField<S> {
    pub fn new(source: Arc<S>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        LabelField {
            source,
            generation: 0,
            current: None,
            label: None,
            task: None,
            tx,
            rx,
        }
    }

    /// Start resolving `request`, superseding any lookup in flight.
    ///
    /// Must be called from within a tokio runtime.
    pub fn request(&mut self, request: LabelRequest) -> u64 {
        self.cancel();
        self.current = Some(request.id);

        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        self.task = Some(tokio::spawn(async move {
            if let Ok(label) = resolve_first(source.as_ref(), &request).await {
                // The receiver lives as long as the field.
                let _ = tx.send(Resolved {
                    generation,
                    id: request.id,
                    label,
                });
            }
        }));
        generation
    }

    /// Abandon the current lookup and clear the shown label.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation += 1;
        self.current = None;
        self.label = None;
    }

    /// Apply a delivered result if it belongs to the current request.
    pub fn accept(&mut self, resolved: Resolved) -> bool {
        if resolved.generation != self.generation || self.current != Some(resolved.id) {
            tracing::debug!(id = %resolved.id, "discarding superseded label");
            return false;
        }
        self.label = Some(resolved.label);
        true
    }

    /// Wait for the current lookup to finish and apply its result.
    pub async fn settle(&mut self) -> Option<&str> {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    tracing::warn!(error = %e, "label lookup task failed");
                }
            }
        }
        while let Ok(resolved) = self.rx.try_recv() {
            self.accept(resolved);
        }
        self.label.as_deref()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The GUID currently being resolved or shown.
    pub fn current(&self) -> Option<Uuid> {
        self.current
    }
}

impl<S: RecordSource> Drop for LabelField<S> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
