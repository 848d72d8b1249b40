//! Value-field mode selection.
//!
//! Decides how the value of a condition is edited (free text, a picker,
//! a GUID field or a record lookup) from the selected operator, the bound
//! attribute and the current literal. The presentation layer applies the
//! returned [`ValueFieldState`]; nothing here touches widgets.

use serde::Serialize;
use uuid::Uuid;

use crate::metadata::{AttributeDescriptor, AttributeType, EntityDescriptor};
use crate::operator::{OperandType, OperatorDescriptor};
use crate::value::parse_guid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFieldMode {
    Disabled,
    FreeText,
    OptionPicker,
    EntityNamePicker,
    GuidFreeText,
    GuidLookup,
    BooleanPicker,
}

/// A pickable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

/// Request to resolve a record label for a GUID value, tried against each
/// target schema in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelRequest {
    pub id: Uuid,
    pub targets: Vec<String>,
}

/// Inputs to mode selection.
#[derive(Debug, Clone, Copy)]
pub struct ValueFieldInput<'a> {
    pub operator: Option<&'a OperatorDescriptor>,
    pub attribute: Option<&'a AttributeDescriptor>,
    pub value: &'a str,
    pub child_count: usize,
    /// Explicit target schema typed by the user for a GUID value.
    pub target_override: &'a str,
    /// Schema owning the condition.
    pub enclosing_schema: Option<&'a str>,
    /// All known schemas, when the entity list is available.
    pub entities: Option<&'a [EntityDescriptor]>,
    pub use_lookup: bool,
}

/// The value field as it should be presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueFieldState {
    pub mode: ValueFieldMode,
    /// Literal after the transition: cleared, defaulted or unchanged.
    pub value: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Schemas offered by the record lookup dialog.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lookup_targets: Vec<String>,
    pub lookup_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_request: Option<LabelRequest>,
}

impl ValueFieldState {
    fn new(mode: ValueFieldMode, value: &str) -> Self {
        ValueFieldState {
            mode,
            value: value.to_string(),
            choices: Vec::new(),
            selected: None,
            hint: None,
            lookup_targets: Vec::new(),
            lookup_available: false,
            label_request: None,
        }
    }

    fn picker(mut self, mode: ValueFieldMode, choices: Vec<Choice>) -> Self {
        self.selected = choices.iter().position(|c| c.value == self.value.trim());
        self.mode = mode;
        self.choices = choices;
        self
    }
}

/// Select the value-field state for the current condition.
pub fn select_value_field(input: &ValueFieldInput<'_>) -> ValueFieldState {
    let mut state = ValueFieldState::new(ValueFieldMode::FreeText, input.value);
    let Some(op) = input.operator else {
        return state;
    };

    let mut resolved = match op.value_type {
        None => None,
        Some(OperandType::Fixed(t)) => Some(t),
        Some(OperandType::Polymorphic) => Some(AttributeType::String),
    };

    if let (Some(OperandType::Polymorphic), Some(attr)) = (op.value_type, input.attribute) {
        let managed_inner = match attr.attribute_type {
            AttributeType::ManagedProperty => attr.value_type,
            _ => None,
        };
        resolved = Some(managed_inner.unwrap_or(attr.attribute_type));

        if op.is_multi_valued {
            if input.child_count == 0 {
                state.hint = Some(format!(
                    "Enter comma-separated {} values or add sub-nodes.",
                    resolved.map(AttributeType::name).unwrap_or("String")
                ));
            } else {
                resolved = None;
            }
        } else if attr.attribute_type.is_enumerated() {
            let choices = attr
                .options
                .iter()
                .map(|o| Choice {
                    value: o.value_text(),
                    label: o.to_string(),
                })
                .collect();
            state = state.picker(ValueFieldMode::OptionPicker, choices);
        } else if attr.attribute_type == AttributeType::EntityName {
            // Entity-name values are object type codes.
            if let Some(entities) = input.entities {
                let choices = entities
                    .iter()
                    .filter_map(|e| {
                        Some(Choice {
                            value: e.object_type_code?.to_string(),
                            label: e.logical_name.clone(),
                        })
                    })
                    .collect();
                state = state.picker(ValueFieldMode::EntityNamePicker, choices);
            }
        } else if managed_inner == Some(AttributeType::Boolean) {
            let choices = vec![
                Choice {
                    value: "0".to_string(),
                    label: "False (0)".to_string(),
                },
                Choice {
                    value: "1".to_string(),
                    label: "True (1)".to_string(),
                },
            ];
            state = state.picker(ValueFieldMode::BooleanPicker, choices);
        }
    }

    let Some(value_type) = resolved else {
        state.mode = ValueFieldMode::Disabled;
        state.value.clear();
        return state;
    };

    if value_type.is_guid_like() {
        apply_guid_mode(&mut state, op, input);
    }
    state
}

fn apply_guid_mode(state: &mut ValueFieldState, op: &OperatorDescriptor, input: &ValueFieldInput<'_>) {
    state.lookup_targets = lookup_dialog_targets(input.attribute, input.enclosing_schema);
    state.lookup_available = !state.lookup_targets.is_empty();
    state.mode = if input.use_lookup && state.lookup_available {
        ValueFieldMode::GuidLookup
    } else {
        ValueFieldMode::GuidFreeText
    };

    if input.use_lookup && !op.is_multi_valued {
        if let Some(id) = parse_guid(input.value).filter(|id| !id.is_nil()) {
            let targets = label_targets(input.attribute, input.target_override);
            if !targets.is_empty() {
                state.label_request = Some(LabelRequest { id, targets });
            }
        }
    }

    if state.value.trim().is_empty() && !op.is_multi_valued {
        state.value = Uuid::nil().hyphenated().to_string();
    }
}

/// Schemas the record lookup dialog may search.
fn lookup_dialog_targets(
    attribute: Option<&AttributeDescriptor>,
    enclosing_schema: Option<&str>,
) -> Vec<String> {
    let Some(attr) = attribute else {
        return Vec::new();
    };
    if attr.attribute_type.is_reference() {
        return attr.targets.clone();
    }
    if attr.is_primary_id {
        if !attr.is_logical {
            return enclosing_schema.map(str::to_string).into_iter().collect();
        }
        if attr.logical_name.ends_with("addressid") {
            return vec!["customeraddress".to_string()];
        }
    }
    Vec::new()
}

/// Candidate schemas for resolving a GUID's record label.
///
/// An explicit override wins, then the lookup's declared targets, then the
/// owning schema of a bare uniqueidentifier.
pub fn label_targets(attribute: Option<&AttributeDescriptor>, target_override: &str) -> Vec<String> {
    let target_override = target_override.trim();
    if !target_override.is_empty() {
        return vec![target_override.to_string()];
    }
    let Some(attr) = attribute else {
        return Vec::new();
    };
    if attr.attribute_type.is_reference() {
        return attr.targets.clone();
    }
    if attr.attribute_type == AttributeType::Uniqueidentifier && !attr.entity_logical_name.is_empty() {
        return vec![attr.entity_logical_name.clone()];
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::OptionItem;
    use crate::operator::find_operator;

    const ID: &str = "6f9619ff-8b86-d011-b42d-00c04fc964ff";

    fn input<'a>(
        op: &str,
        attribute: Option<&'a AttributeDescriptor>,
        value: &'a str,
    ) -> ValueFieldInput<'a> {
        ValueFieldInput {
            operator: find_operator(op),
            attribute,
            value,
            child_count: 0,
            target_override: "",
            enclosing_schema: Some("account"),
            entities: None,
            use_lookup: false,
        }
    }

    #[test]
    fn no_value_operator_disables_and_clears() {
        let attr = AttributeDescriptor::new("name", AttributeType::String);
        let state = select_value_field(&input("null", Some(&attr), "stale"));
        assert_eq!(state.mode, ValueFieldMode::Disabled);
        assert_eq!(state.value, "");
    }

    #[test]
    fn no_operator_keeps_free_text() {
        let state = select_value_field(&input("bogus", None, "abc"));
        assert_eq!(state.mode, ValueFieldMode::FreeText);
        assert_eq!(state.value, "abc");
    }

    #[test]
    fn picklist_gets_option_picker() {
        let attr = AttributeDescriptor::new("statuscode", AttributeType::Status)
            .with_options(vec![OptionItem::new(1, "Active"), OptionItem::new(2, "Inactive")]);
        let state = select_value_field(&input("eq", Some(&attr), "2"));
        assert_eq!(state.mode, ValueFieldMode::OptionPicker);
        assert_eq!(state.choices.len(), 2);
        assert_eq!(state.choices[1].label, "Inactive (2)");
        assert_eq!(state.selected, Some(1));
    }

    #[test]
    fn picklist_with_multi_valued_operator_gets_hint() {
        let attr = AttributeDescriptor::new("statuscode", AttributeType::Picklist);
        let state = select_value_field(&input("in", Some(&attr), ""));
        assert_eq!(state.mode, ValueFieldMode::FreeText);
        assert_eq!(
            state.hint.as_deref(),
            Some("Enter comma-separated Picklist values or add sub-nodes.")
        );
    }

    #[test]
    fn multi_valued_with_children_is_disabled() {
        let attr = AttributeDescriptor::new("statuscode", AttributeType::Picklist);
        let mut i = input("in", Some(&attr), "1,2");
        i.child_count = 2;
        let state = select_value_field(&i);
        assert_eq!(state.mode, ValueFieldMode::Disabled);
        assert_eq!(state.value, "");
    }

    #[test]
    fn entity_name_picker_needs_entity_list() {
        let attr = AttributeDescriptor::new("objecttypecode", AttributeType::EntityName);
        let mut account = EntityDescriptor::new("account");
        account.object_type_code = Some(1);
        let mut contact = EntityDescriptor::new("contact");
        contact.object_type_code = Some(2);
        let entities = vec![account, contact, EntityDescriptor::new("virtualentity")];
        let without = select_value_field(&input("eq", Some(&attr), "2"));
        assert_eq!(without.mode, ValueFieldMode::FreeText);
        let mut i = input("eq", Some(&attr), "2");
        i.entities = Some(&entities);
        let with = select_value_field(&i);
        assert_eq!(with.mode, ValueFieldMode::EntityNamePicker);
        assert_eq!(with.choices.len(), 2);
        assert_eq!(with.choices[1].label, "contact");
        assert_eq!(with.selected, Some(1));
    }

    #[test]
    fn managed_boolean_picker() {
        let attr = AttributeDescriptor::new("iscustomizable", AttributeType::ManagedProperty)
            .managed(AttributeType::Boolean);
        let state = select_value_field(&input("eq", Some(&attr), "1"));
        assert_eq!(state.mode, ValueFieldMode::BooleanPicker);
        assert_eq!(state.selected, Some(1));
    }

    #[test]
    fn lookup_preference_selects_lookup_mode() {
        let attr = AttributeDescriptor::new("parentaccountid", AttributeType::Lookup)
            .in_entity("account")
            .with_targets(["account"]);
        let mut i = input("eq", Some(&attr), ID);
        let free = select_value_field(&i);
        assert_eq!(free.mode, ValueFieldMode::GuidFreeText);
        assert!(free.label_request.is_none());

        i.use_lookup = true;
        let lookup = select_value_field(&i);
        assert_eq!(lookup.mode, ValueFieldMode::GuidLookup);
        assert_eq!(lookup.lookup_targets, vec!["account"]);
        let request = lookup.label_request.unwrap();
        assert_eq!(request.targets, vec!["account"]);
        assert_eq!(request.id.hyphenated().to_string(), ID);
    }

    #[test]
    fn lookup_without_targets_forces_free_text() {
        let attr = AttributeDescriptor::new("someid", AttributeType::Uniqueidentifier)
            .in_entity("account");
        let mut i = input("eq", Some(&attr), "");
        i.use_lookup = true;
        let state = select_value_field(&i);
        assert_eq!(state.mode, ValueFieldMode::GuidFreeText);
        assert!(!state.lookup_available);
        assert_eq!(state.value, "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn primary_id_targets_enclosing_schema() {
        let attr = AttributeDescriptor::new("accountid", AttributeType::Uniqueidentifier)
            .in_entity("account")
            .primary_id();
        let mut i = input("eq", Some(&attr), ID);
        i.use_lookup = true;
        let state = select_value_field(&i);
        assert_eq!(state.mode, ValueFieldMode::GuidLookup);
        assert_eq!(state.lookup_targets, vec!["account"]);
        assert_eq!(state.label_request.unwrap().targets, vec!["account"]);
    }

    #[test]
    fn logical_address_id_targets_customeraddress() {
        let attr = AttributeDescriptor::new("address1_addressid", AttributeType::Uniqueidentifier)
            .primary_id()
            .logical();
        let state = select_value_field(&input("eq", Some(&attr), ""));
        assert_eq!(state.lookup_targets, vec!["customeraddress"]);
    }

    #[test]
    fn nil_guid_does_not_request_label() {
        let attr = AttributeDescriptor::new("ownerid", AttributeType::Owner)
            .with_targets(["systemuser", "team"]);
        let mut i = input("eq", Some(&attr), "00000000-0000-0000-0000-000000000000");
        i.use_lookup = true;
        assert!(select_value_field(&i).label_request.is_none());
    }

    #[test]
    fn label_target_inference_order() {
        let lookup = AttributeDescriptor::new("ownerid", AttributeType::Owner)
            .with_targets(["systemuser", "team"]);
        assert_eq!(label_targets(Some(&lookup), " team "), vec!["team"]);
        assert_eq!(label_targets(Some(&lookup), ""), vec!["systemuser", "team"]);
        let bare = AttributeDescriptor::new("someid", AttributeType::Uniqueidentifier)
            .in_entity("lead");
        assert_eq!(label_targets(Some(&bare), ""), vec!["lead"]);
        assert!(label_targets(None, "").is_empty());
    }
}
