//! qtree-resolve: best-effort record labels for GUID condition values.
//!
//! A [`LabelField`] runs lookups on a background task, tries each candidate
//! schema in turn and keeps only the result of the newest request.
//! Resolution is cosmetic; its failures never reach validation.

mod error;
mod field;
mod source;

pub use error::ResolveError;
pub use field::{resolve_first, LabelField, Resolved};
pub use source::{InMemorySource, RecordSource};
