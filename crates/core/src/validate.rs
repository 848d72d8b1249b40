//! Condition checks: attribute, operator, compatibility and value.
//!
//! Every check is a pure function returning `None` when the input is fine
//! or a [`ValidationIssue`]. Warnings are advisory; errors block a save.

use serde::Serialize;
use std::fmt;

use crate::metadata::{AttributeDescriptor, AttributeType};
use crate::operator::{self, OperandType, OperatorDescriptor};
use crate::value::{self, LiteralError};

/// Help page describing which operators the query serializer accepts.
pub const OPERATOR_HELP_URL: &str =
    "https://learn.microsoft.com/power-apps/developer/data-platform/fetchxml/reference/operators";

// ──────────────────────────────────────────────
// Issues
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// The condition field a result refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Attribute,
    Operator,
    Value,
    ValueOf,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Attribute => "Attribute",
            Field::Operator => "Operator",
            Field::Value => "Value",
            Field::ValueOf => "Value Of",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssueKind {
    Required,
    Unrecognized,
    Invalid,
    Unsupported,
    OperatorAttributeTypeMismatch,
    ConflictingValueSources,
    UnbalancedPattern,
    UnexpectedValue,
    InvalidBoolean,
    InvalidDateTime,
    InvalidInteger,
    InvalidDecimal,
    InvalidGuid,
    UnsupportedType,
}

impl IssueKind {
    pub fn severity(self) -> Severity {
        match self {
            IssueKind::Unrecognized | IssueKind::Unsupported => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: Field,
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_url: Option<String>,
}

impl ValidationIssue {
    pub fn new(field: Field, kind: IssueKind, message: impl Into<String>) -> Self {
        ValidationIssue {
            field,
            kind,
            severity: kind.severity(),
            message: message.into(),
            help_url: None,
        }
    }

    pub fn with_help(mut self, url: impl Into<String>) -> Self {
        self.help_url = Some(url.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}: {}: {}", level, self.field, self.message)
    }
}

/// Outcome of a single check.
pub type Check = Option<ValidationIssue>;

// ──────────────────────────────────────────────
// Checks
// ──────────────────────────────────────────────

/// Attribute text must be present; unknown names only warn.
///
/// `known` is `None` when the catalog has no metadata for the schema, in
/// which case nothing can be said about an unknown name.
pub fn validate_attribute(text: &str, known: Option<&[AttributeDescriptor]>) -> Check {
    if text.trim().is_empty() {
        return Some(ValidationIssue::new(
            Field::Attribute,
            IssueKind::Required,
            "Attribute is required",
        ));
    }
    let known = known?;
    if known.iter().any(|a| a.matches(text)) {
        return None;
    }
    Some(ValidationIssue::new(
        Field::Attribute,
        IssueKind::Unrecognized,
        format!("Attribute '{}' is not in the loaded metadata", text.trim()),
    ))
}

/// Operator text must name a known operator.
pub fn validate_operator(text: &str) -> Check {
    if text.trim().is_empty() {
        return Some(ValidationIssue::new(
            Field::Operator,
            IssueKind::Required,
            "Operator is required",
        ));
    }
    let Some(op) = operator::find_operator(text) else {
        return Some(ValidationIssue::new(
            Field::Operator,
            IssueKind::Invalid,
            format!("'{}' is not a valid operator", text.trim()),
        ));
    };
    if !op.target_supported {
        return Some(
            ValidationIssue::new(
                Field::Operator,
                IssueKind::Unsupported,
                format!(
                    "Operator {} is available in the editor but not supported by the query language",
                    op
                ),
            )
            .with_help(OPERATOR_HELP_URL),
        );
    }
    None
}

/// Whether attribute/operator and value checks apply to this condition.
///
/// Multi-valued operators without value children still carry a pending
/// comma-separated list, which is checked after it is split on save.
pub fn checks_apply(op: &OperatorDescriptor, child_count: usize) -> bool {
    !op.is_multi_valued || child_count > 0
}

/// The operator's required attribute type must match the attribute's type.
pub fn validate_compatibility(
    op: &OperatorDescriptor,
    attribute: Option<&AttributeDescriptor>,
    child_count: usize,
) -> Check {
    if !checks_apply(op, child_count) {
        return None;
    }
    let (required, attribute) = (op.attribute_type?, attribute?);
    if operator::is_type_compatible(required, attribute.attribute_type) {
        return None;
    }
    Some(ValidationIssue::new(
        Field::Operator,
        IssueKind::OperatorAttributeTypeMismatch,
        format!(
            "Operator {} is not valid for attribute of type {}",
            op,
            attribute.type_display()
        ),
    ))
}

/// Resolve the type a literal must have under `op`.
///
/// Polymorphic operators take the bound attribute's type and fall back to
/// `String` so unbound conditions stay editable. A managed property resolves
/// to `ManagedProperty` even when its underlying type is known, which leaves
/// its literals unchecked. `None` means no value is expected.
pub fn resolve_value_type(
    op: &OperatorDescriptor,
    attribute: Option<&AttributeDescriptor>,
) -> Option<AttributeType> {
    match op.value_type? {
        OperandType::Fixed(t) => Some(t),
        OperandType::Polymorphic => Some(
            attribute.map_or(AttributeType::String, |attr| attr.attribute_type),
        ),
    }
}

/// Inline value and column comparison are mutually exclusive.
pub fn validate_value_sources(value: &str, value_of: &str) -> Check {
    if !value.trim().is_empty() && !value_of.trim().is_empty() {
        return Some(ValidationIssue::new(
            Field::Value,
            IssueKind::ConflictingValueSources,
            "Value and Value Of cannot both be set",
        ));
    }
    None
}

/// Check the inline value of a condition.
pub fn validate_value(
    op: &OperatorDescriptor,
    attribute: Option<&AttributeDescriptor>,
    value: &str,
    value_of: &str,
    child_count: usize,
) -> Check {
    if let Some(issue) = validate_value_sources(value, value_of) {
        return Some(issue);
    }
    if !value_of.trim().is_empty() || !checks_apply(op, child_count) {
        return None;
    }
    if op.is_like_pattern() && value::has_unbalanced_brackets(value) {
        return Some(ValidationIssue::new(
            Field::Value,
            IssueKind::UnbalancedPattern,
            "LIKE pattern has mismatched brackets. Close every character range; \
             to match the character '[' use '[[]'",
        ));
    }
    // Once values live in child nodes the inline literal must stay empty.
    let resolved = if op.is_multi_valued {
        None
    } else {
        resolve_value_type(op, attribute)
    };
    check_value_literal(op, resolved, value, Field::Value)
}

/// Check each value child of a multi-valued condition.
pub fn validate_value_nodes(
    op: &OperatorDescriptor,
    attribute: Option<&AttributeDescriptor>,
    values: &[String],
) -> Vec<ValidationIssue> {
    let resolved = resolve_value_type(op, attribute);
    values
        .iter()
        .filter_map(|v| check_value_literal(op, resolved, v, Field::Value))
        .collect()
}

/// Check every segment of a pending comma-separated list before it is split.
pub fn validate_pending_list(
    op: &OperatorDescriptor,
    attribute: Option<&AttributeDescriptor>,
    value: &str,
) -> Vec<ValidationIssue> {
    if !op.is_multi_valued || value.trim().is_empty() {
        return Vec::new();
    }
    let resolved = resolve_value_type(op, attribute);
    crate::normalize::split_values(value)
        .iter()
        .filter_map(|v| check_value_literal(op, resolved, v, Field::Value))
        .collect()
}

pub(crate) fn check_value_literal(
    op: &OperatorDescriptor,
    resolved: Option<AttributeType>,
    value: &str,
    field: Field,
) -> Check {
    let err = value::check_literal(resolved, value).err()?;
    let (kind, message) = match err {
        LiteralError::Unexpected => (
            IssueKind::UnexpectedValue,
            format!("Operator {} does not allow a value", op),
        ),
        LiteralError::Boolean => (IssueKind::InvalidBoolean, "Value must be 0 or 1".to_string()),
        LiteralError::DateTime => (
            IssueKind::InvalidDateTime,
            format!("Operator {} requires a date value", op),
        ),
        LiteralError::Integer => (
            IssueKind::InvalidInteger,
            format!("Operator {} requires a whole number value", op),
        ),
        LiteralError::Decimal => (
            IssueKind::InvalidDecimal,
            format!("Operator {} requires a decimal value", op),
        ),
        LiteralError::Guid => (
            IssueKind::InvalidGuid,
            format!(
                "Operator {} requires a guid in the format {}",
                op,
                uuid::Uuid::nil().hyphenated()
            ),
        ),
        LiteralError::UnsupportedType(t) => (
            IssueKind::UnsupportedType,
            format!("Unsupported condition attribute type: {}", t),
        ),
    };
    Some(ValidationIssue::new(field, kind, message))
}
