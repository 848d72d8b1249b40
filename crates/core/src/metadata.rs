//! Schema metadata snapshots: attribute types, attributes and entities.
//!
//! These are immutable views handed out by a [`SchemaCatalog`](crate::SchemaCatalog).
//! The engine reads them but never mutates them.

use serde::{Deserialize, Serialize};
use std::fmt;

// ──────────────────────────────────────────────
// Attribute type tags
// ──────────────────────────────────────────────

/// Primitive type tag of a schema attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    Boolean,
    Customer,
    DateTime,
    Decimal,
    Double,
    Integer,
    Lookup,
    Memo,
    Money,
    Owner,
    PartyList,
    Picklist,
    State,
    Status,
    String,
    Uniqueidentifier,
    CalendarRules,
    Virtual,
    BigInt,
    ManagedProperty,
    EntityName,
}

impl AttributeType {
    /// Every type tag, in declaration order.
    pub const ALL: [AttributeType; 21] = [
        AttributeType::Boolean,
        AttributeType::Customer,
        AttributeType::DateTime,
        AttributeType::Decimal,
        AttributeType::Double,
        AttributeType::Integer,
        AttributeType::Lookup,
        AttributeType::Memo,
        AttributeType::Money,
        AttributeType::Owner,
        AttributeType::PartyList,
        AttributeType::Picklist,
        AttributeType::State,
        AttributeType::Status,
        AttributeType::String,
        AttributeType::Uniqueidentifier,
        AttributeType::CalendarRules,
        AttributeType::Virtual,
        AttributeType::BigInt,
        AttributeType::ManagedProperty,
        AttributeType::EntityName,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AttributeType::Boolean => "Boolean",
            AttributeType::Customer => "Customer",
            AttributeType::DateTime => "DateTime",
            AttributeType::Decimal => "Decimal",
            AttributeType::Double => "Double",
            AttributeType::Integer => "Integer",
            AttributeType::Lookup => "Lookup",
            AttributeType::Memo => "Memo",
            AttributeType::Money => "Money",
            AttributeType::Owner => "Owner",
            AttributeType::PartyList => "PartyList",
            AttributeType::Picklist => "Picklist",
            AttributeType::State => "State",
            AttributeType::Status => "Status",
            AttributeType::String => "String",
            AttributeType::Uniqueidentifier => "Uniqueidentifier",
            AttributeType::CalendarRules => "CalendarRules",
            AttributeType::Virtual => "Virtual",
            AttributeType::BigInt => "BigInt",
            AttributeType::ManagedProperty => "ManagedProperty",
            AttributeType::EntityName => "EntityName",
        }
    }

    /// Lookup, Customer, Owner and Uniqueidentifier all carry a GUID value.
    pub fn is_guid_like(self) -> bool {
        matches!(
            self,
            AttributeType::Lookup
                | AttributeType::Customer
                | AttributeType::Owner
                | AttributeType::Uniqueidentifier
        )
    }

    /// Types whose attributes reference records of other entities.
    pub fn is_reference(self) -> bool {
        matches!(
            self,
            AttributeType::Lookup | AttributeType::Customer | AttributeType::Owner
        )
    }

    /// Types backed by an option set (entity-name attributes excluded).
    pub fn is_enumerated(self) -> bool {
        matches!(
            self,
            AttributeType::Picklist | AttributeType::State | AttributeType::Status
        )
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ──────────────────────────────────────────────
// Option sets
// ──────────────────────────────────────────────

/// One entry of an option set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    pub value: i32,
    pub label: String,
}

impl OptionItem {
    pub fn new(value: i32, label: impl Into<String>) -> Self {
        OptionItem {
            value,
            label: label.into(),
        }
    }

    /// The literal written into a condition when this option is picked.
    pub fn value_text(&self) -> String {
        self.value.to_string()
    }
}

impl fmt::Display for OptionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.value)
    }
}

// ──────────────────────────────────────────────
// Attributes
// ──────────────────────────────────────────────

/// Immutable snapshot of one schema attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    pub logical_name: String,
    /// Owning entity. Filled in by the catalog when omitted from the snapshot.
    #[serde(default)]
    pub entity_logical_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,
    #[serde(default)]
    pub is_primary_id: bool,
    #[serde(default)]
    pub is_logical: bool,
    /// Underlying value type of a managed property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<AttributeType>,
}

impl AttributeDescriptor {
    pub fn new(logical_name: impl Into<String>, attribute_type: AttributeType) -> Self {
        AttributeDescriptor {
            logical_name: logical_name.into(),
            entity_logical_name: String::new(),
            display_name: None,
            attribute_type,
            options: Vec::new(),
            targets: Vec::new(),
            is_primary_id: false,
            is_logical: false,
            value_type: None,
        }
    }

    pub fn in_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity_logical_name = entity.into();
        self
    }

    pub fn with_options(mut self, options: Vec<OptionItem>) -> Self {
        self.options = options;
        self
    }

    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn primary_id(mut self) -> Self {
        self.is_primary_id = true;
        self
    }

    pub fn logical(mut self) -> Self {
        self.is_logical = true;
        self
    }

    pub fn managed(mut self, value_type: AttributeType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    /// True if `text` names this attribute, by logical or display name.
    pub fn matches(&self, text: &str) -> bool {
        let text = text.trim();
        self.logical_name == text || self.display_name.as_deref() == Some(text)
    }

    /// Human-readable type used in operator mismatch messages.
    pub fn type_display(&self) -> String {
        match self.attribute_type {
            t if t.is_reference() && !self.targets.is_empty() => {
                format!("{} ({})", t, self.targets.join(", "))
            }
            AttributeType::ManagedProperty => match self.value_type {
                Some(inner) => format!("ManagedProperty ({})", inner),
                None => "ManagedProperty".to_string(),
            },
            t => t.to_string(),
        }
    }
}

// ──────────────────────────────────────────────
// Entities
// ──────────────────────────────────────────────

/// Immutable snapshot of one schema (entity type).
///
/// `attributes` is `None` until the catalog has loaded the entity's details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    pub logical_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_id_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_name_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<AttributeDescriptor>>,
}

impl EntityDescriptor {
    pub fn new(logical_name: impl Into<String>) -> Self {
        EntityDescriptor {
            logical_name: logical_name.into(),
            object_type_code: None,
            primary_id_attribute: None,
            primary_name_attribute: None,
            attributes: None,
        }
    }

    pub fn attribute(&self, logical_name: &str) -> Option<&AttributeDescriptor> {
        self.attributes
            .as_ref()?
            .iter()
            .find(|a| a.logical_name == logical_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tags_use_lowercase_names_in_json() {
        let json = serde_json::to_string(&AttributeType::Uniqueidentifier).unwrap();
        assert_eq!(json, "\"uniqueidentifier\"");
        let parsed: AttributeType = serde_json::from_str("\"entityname\"").unwrap();
        assert_eq!(parsed, AttributeType::EntityName);
    }

    #[test]
    fn reference_types_show_targets() {
        let attr = AttributeDescriptor::new("parentcustomerid", AttributeType::Customer)
            .with_targets(["account", "contact"]);
        assert_eq!(attr.type_display(), "Customer (account, contact)");
        let plain = AttributeDescriptor::new("name", AttributeType::String);
        assert_eq!(plain.type_display(), "String");
    }

    #[test]
    fn option_item_display() {
        let item = OptionItem::new(1, "Active");
        assert_eq!(item.to_string(), "Active (1)");
        assert_eq!(item.value_text(), "1");
    }
}
