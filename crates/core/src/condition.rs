//! The condition engine: runs every check for a condition, offers operators
//! and comparison columns, selects the value-field mode and commits
//! multi-value lists at save time.

use serde::Serialize;

use crate::catalog::{Availability, SchemaCatalog};
use crate::config::EngineConfig;
use crate::document::{Condition, DocumentTree};
use crate::metadata::AttributeDescriptor;
use crate::mode::{self, ValueFieldInput, ValueFieldState};
use crate::normalize;
use crate::operator::{self, OperatorDescriptor};
use crate::validate::{self, Severity, ValidationIssue};

/// All results of validating one condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn push(&mut self, issue: Option<ValidationIssue>) {
        self.issues.extend(issue);
    }

    /// Any error blocks a save; warnings never do.
    pub fn blocks_save(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Input for validating one condition.
#[derive(Debug, Clone, Copy)]
pub struct ConditionCheck<'a> {
    pub condition: &'a Condition,
    /// Attributes of the condition's schema; `None` while metadata is missing.
    pub attributes: Option<&'a [AttributeDescriptor]>,
    /// Texts of existing value children.
    pub values: &'a [String],
    /// Save-time checking: pending comma-separated lists are checked too.
    pub strict: bool,
}

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    /// Warnings that did not block the save.
    pub report: ValidationReport,
    /// Value children created from an inline list.
    pub created_values: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ConditionEngine {
    config: EngineConfig,
}

impl ConditionEngine {
    pub fn new(config: EngineConfig) -> Self {
        ConditionEngine { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Attributes of the schema a condition refers to.
    ///
    /// `entity_scope` names a linked entity (by alias or name) when the
    /// condition targets one. If the catalog has not loaded that schema a
    /// load is requested and `NotLoaded` returned; call again once the load
    /// completes. A node with no enclosing schema yields no attributes.
    pub fn schema_attributes<'c, C, T>(
        &self,
        catalog: &'c C,
        tree: &T,
        node: T::NodeId,
        entity_scope: Option<&str>,
    ) -> Availability<&'c [AttributeDescriptor]>
    where
        C: SchemaCatalog,
        T: DocumentTree,
    {
        let scoped = entity_scope.filter(|s| !s.trim().is_empty()).and_then(|scope| {
            tree.linked_entities(node)
                .into_iter()
                .find(|l| l.scope_name() == scope.trim())
                .map(|l| l.name)
        });
        let Some(schema) = scoped.or_else(|| tree.enclosing_schema_context(node)) else {
            return Availability::Ready(&[]);
        };
        let attrs = catalog.attributes(&schema);
        if !attrs.is_ready() {
            catalog.request_load(&schema);
        }
        attrs
    }

    /// Run every check for a condition.
    pub fn validate(&self, check: &ConditionCheck<'_>) -> ValidationReport {
        let cond = check.condition;
        let mut report = ValidationReport::default();

        report.push(validate::validate_attribute(&cond.attribute, check.attributes));
        let operator_issue = validate::validate_operator(&cond.operator);
        let operator_known = operator_issue.as_ref().map_or(true, |i| !i.is_error());
        report.push(operator_issue);

        let Some(op) = operator::find_operator(&cond.operator).filter(|_| operator_known) else {
            return report;
        };
        let attribute = find_attribute(check.attributes, &cond.attribute);
        let child_count = check.values.len();

        report.push(validate::validate_compatibility(op, attribute, child_count));
        report.push(validate::validate_value(
            op,
            attribute,
            &cond.value,
            &cond.value_of,
            child_count,
        ));
        if !check.values.is_empty() {
            report
                .issues
                .extend(validate::validate_value_nodes(op, attribute, check.values));
        }
        if check.strict && child_count == 0 {
            report
                .issues
                .extend(validate::validate_pending_list(op, attribute, &cond.value));
        }
        report
    }

    /// Operators offered for the selected attribute; all of them when none is selected.
    pub fn operators_for(
        &self,
        attribute: Option<&AttributeDescriptor>,
    ) -> Vec<&'static OperatorDescriptor> {
        match attribute {
            Some(attr) => operator::operators_for(attr.attribute_type),
            None => operator::operators().iter().collect(),
        }
    }

    /// Attributes a condition may be compared against.
    ///
    /// `None` means column comparison is unavailable here and any existing
    /// comparison text should be cleared.
    pub fn column_comparison_candidates<'a>(
        &self,
        op: &OperatorDescriptor,
        attribute: &AttributeDescriptor,
        attributes: &'a [AttributeDescriptor],
        scoped_to_linked_entity: bool,
    ) -> Option<Vec<&'a AttributeDescriptor>> {
        if !self.config.column_comparison_supported
            || !op.supports_column_comparison
            || scoped_to_linked_entity
        {
            return None;
        }
        Some(
            attributes
                .iter()
                .filter(|a| a.attribute_type == attribute.attribute_type)
                .collect(),
        )
    }

    /// Value-field state under the configured lookup preference.
    pub fn value_field(&self, input: ValueFieldInput<'_>) -> ValueFieldState {
        mode::select_value_field(&ValueFieldInput {
            use_lookup: self.config.use_lookup,
            ..input
        })
    }

    /// Validate strictly, then move a pending inline list into value children.
    ///
    /// Nothing is written when validation finds an error.
    pub fn commit<T: DocumentTree>(
        &self,
        tree: &mut T,
        node: T::NodeId,
        condition: &mut Condition,
        attributes: Option<&[AttributeDescriptor]>,
    ) -> Result<Commit, ValidationReport> {
        let values = tree.value_children(node);
        let report = self.validate(&ConditionCheck {
            condition: &*condition,
            attributes,
            values: &values,
            strict: true,
        });
        if report.blocks_save() {
            return Err(report);
        }
        let created_values = match operator::find_operator(&condition.operator) {
            Some(op) => normalize::normalize_multi_value(tree, node, op, &mut condition.value),
            None => 0,
        };
        Ok(Commit {
            report,
            created_values,
        })
    }
}

/// Find the attribute a condition's text refers to.
pub fn find_attribute<'a>(
    attributes: Option<&'a [AttributeDescriptor]>,
    text: &str,
) -> Option<&'a AttributeDescriptor> {
    attributes?.iter().find(|a| a.matches(text))
}
