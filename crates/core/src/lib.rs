//! qtree-core: condition editing engine for query trees.
//!
//! Validates the attribute, operator and value of a condition against schema
//! metadata, chooses how a condition's value should be edited, and turns
//! comma-separated values into value nodes when a query is saved.
//!
//! # Public API
//!
//! - [`ConditionEngine`] -- validation, operator offers, value-field modes, commit
//! - [`SchemaCatalog`] / [`StaticCatalog`] -- schema metadata access
//! - [`DocumentTree`] / [`QueryDocument`] -- the query tree the engine edits
//! - [`operators()`] / [`find_operator()`] -- the operator table
//!
//! The individual checks in [`validate`] are pure functions and can be used
//! without an engine.

pub mod catalog;
pub mod condition;
pub mod config;
pub mod document;
pub mod metadata;
pub mod mode;
pub mod normalize;
pub mod operator;
pub mod validate;
pub mod value;

// ── Convenience re-exports ───────────────────────────────────────────

pub use catalog::{Availability, CatalogError, SchemaCatalog, StaticCatalog};
pub use condition::{find_attribute, Commit, ConditionCheck, ConditionEngine, ValidationReport};
pub use config::{EngineConfig, ServerVersion, VersionParseError, COLUMN_COMPARISON_MIN_VERSION};
pub use document::{
    Condition, DocumentTree, LinkedEntity, NodeId, NodeKind, ProjectedAttribute, QueryDocument,
};
pub use metadata::{AttributeDescriptor, AttributeType, EntityDescriptor, OptionItem};
pub use mode::{
    label_targets, select_value_field, Choice, LabelRequest, ValueFieldInput, ValueFieldMode,
    ValueFieldState,
};
pub use normalize::{normalize_multi_value, requires_save, split_values};
pub use operator::{
    find_operator, is_type_compatible, operators, operators_for, OperandType, OperatorDescriptor,
};
pub use validate::{Field, IssueKind, Severity, ValidationIssue};
