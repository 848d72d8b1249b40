//! Schema catalog interface and an in-memory snapshot implementation.
//!
//! The catalog is the authoritative source of entity and attribute metadata.
//! Entity details may not be loaded yet; callers that find them missing
//! issue [`SchemaCatalog::request_load`] and retry once the load completes.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::metadata::{AttributeDescriptor, EntityDescriptor};

/// Errors raised while building a catalog snapshot.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("could not read catalog snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse catalog snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("entity '{0}' appears more than once in the catalog")]
    DuplicateEntity(String),
}

/// Metadata that may still be loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability<T> {
    Ready(T),
    NotLoaded,
}

impl<T> Availability<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            Availability::Ready(v) => Some(v),
            Availability::NotLoaded => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Availability::Ready(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Availability<U> {
        match self {
            Availability::Ready(v) => Availability::Ready(f(v)),
            Availability::NotLoaded => Availability::NotLoaded,
        }
    }
}

/// Read-only access to schema metadata.
pub trait SchemaCatalog {
    /// Ordered attributes of `schema`, or `NotLoaded` when details are missing.
    fn attributes(&self, schema: &str) -> Availability<&[AttributeDescriptor]>;

    /// Names of all known schemas, or `None` when the entity list is unavailable.
    fn entities(&self) -> Option<Vec<String>>;

    fn entity(&self, schema: &str) -> Option<&EntityDescriptor>;

    fn entity_by_object_type_code(&self, code: i32) -> Option<&EntityDescriptor>;

    /// Ask for `schema` to be loaded. Completion is signalled out of band.
    fn request_load(&self, schema: &str);
}

// ──────────────────────────────────────────────
// StaticCatalog
// ──────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct CatalogSnapshot {
    entities: Vec<EntityDescriptor>,
}

/// Catalog backed by a fixed metadata snapshot.
///
/// Entities without an `attributes` list count as not loaded. Load requests
/// are queued and can be drained with [`StaticCatalog::take_load_requests`];
/// [`StaticCatalog::complete_load`] supplies the missing details.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    entities: BTreeMap<String, EntityDescriptor>,
    entity_list_available: bool,
    pending: RefCell<Vec<String>>,
}

impl StaticCatalog {
    pub fn new(entities: Vec<EntityDescriptor>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for mut entity in entities {
            if let Some(attrs) = entity.attributes.as_mut() {
                adopt_attributes(&entity.logical_name, attrs);
            }
            let name = entity.logical_name.clone();
            if map.insert(name.clone(), entity).is_some() {
                return Err(CatalogError::DuplicateEntity(name));
            }
        }
        Ok(StaticCatalog {
            entities: map,
            entity_list_available: true,
            pending: RefCell::new(Vec::new()),
        })
    }

    /// Parse a JSON snapshot of the form `{"entities": [...]}`.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let snapshot: CatalogSnapshot = serde_json::from_str(json)?;
        StaticCatalog::new(snapshot.entities)
    }

    pub fn from_path(path: &std::path::Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        StaticCatalog::from_json_str(&json)
    }

    /// A catalog with no metadata at all, as seen before connecting.
    pub fn unavailable() -> Self {
        StaticCatalog::default()
    }

    pub fn take_load_requests(&self) -> Vec<String> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    /// Install loaded details for an entity, replacing any previous snapshot.
    pub fn complete_load(&mut self, mut entity: EntityDescriptor) {
        if let Some(attrs) = entity.attributes.as_mut() {
            adopt_attributes(&entity.logical_name, attrs);
        }
        self.pending
            .get_mut()
            .retain(|name| name != &entity.logical_name);
        self.entity_list_available = true;
        self.entities.insert(entity.logical_name.clone(), entity);
    }
}

fn adopt_attributes(entity: &str, attrs: &mut [AttributeDescriptor]) {
    for attr in attrs.iter_mut() {
        if attr.entity_logical_name.is_empty() {
            attr.entity_logical_name = entity.to_string();
        }
    }
}

impl SchemaCatalog for StaticCatalog {
    fn attributes(&self, schema: &str) -> Availability<&[AttributeDescriptor]> {
        match self.entities.get(schema).and_then(|e| e.attributes.as_deref()) {
            Some(attrs) => Availability::Ready(attrs),
            None => Availability::NotLoaded,
        }
    }

    fn entities(&self) -> Option<Vec<String>> {
        if !self.entity_list_available {
            return None;
        }
        Some(self.entities.keys().cloned().collect())
    }

    fn entity(&self, schema: &str) -> Option<&EntityDescriptor> {
        self.entities.get(schema)
    }

    fn entity_by_object_type_code(&self, code: i32) -> Option<&EntityDescriptor> {
        self.entities
            .values()
            .find(|e| e.object_type_code == Some(code))
    }

    fn request_load(&self, schema: &str) {
        let mut pending = self.pending.borrow_mut();
        // One outstanding request per schema
        if pending.iter().any(|p| p == schema) {
            return;
        }
        tracing::debug!(schema, "requesting schema metadata load");
        pending.push(schema.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::AttributeType;

    const SNAPSHOT: &str = r#"{
        "entities": [
            {
                "logical_name": "account",
                "object_type_code": 1,
                "primary_id_attribute": "accountid",
                "primary_name_attribute": "name",
                "attributes": [
                    { "logical_name": "accountid", "type": "uniqueidentifier", "is_primary_id": true },
                    { "logical_name": "name", "type": "string" }
                ]
            },
            { "logical_name": "contact", "object_type_code": 2 }
        ]
    }"#;

    #[test]
    fn snapshot_attributes_adopt_owning_entity() {
        let catalog = StaticCatalog::from_json_str(SNAPSHOT).unwrap();
        let attrs = catalog.attributes("account").ready().unwrap();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].entity_logical_name, "account");
        assert_eq!(attrs[1].attribute_type, AttributeType::String);
    }

    #[test]
    fn entity_without_attributes_is_not_loaded() {
        let catalog = StaticCatalog::from_json_str(SNAPSHOT).unwrap();
        assert_eq!(catalog.attributes("contact"), Availability::NotLoaded);
        assert_eq!(catalog.attributes("lead"), Availability::NotLoaded);
    }

    #[test]
    fn load_requests_are_deduplicated_and_cleared_on_completion() {
        let mut catalog = StaticCatalog::from_json_str(SNAPSHOT).unwrap();
        catalog.request_load("contact");
        catalog.request_load("contact");
        catalog.request_load("lead");
        let mut contact = EntityDescriptor::new("contact");
        contact.attributes = Some(vec![AttributeDescriptor::new(
            "fullname",
            AttributeType::String,
        )]);
        catalog.complete_load(contact);
        assert_eq!(catalog.take_load_requests(), vec!["lead".to_string()]);
        let attrs = catalog.attributes("contact").ready().unwrap();
        assert_eq!(attrs[0].entity_logical_name, "contact");
    }

    #[test]
    fn lookup_by_object_type_code() {
        let catalog = StaticCatalog::from_json_str(SNAPSHOT).unwrap();
        assert_eq!(
            catalog.entity_by_object_type_code(2).map(|e| e.logical_name.as_str()),
            Some("contact")
        );
        assert!(catalog.entity_by_object_type_code(99).is_none());
    }

    #[test]
    fn unavailable_catalog_has_no_entity_list() {
        let catalog = StaticCatalog::unavailable();
        assert!(catalog.entities().is_none());
    }

    #[test]
    fn duplicate_entities_are_rejected() {
        let err = StaticCatalog::new(vec![
            EntityDescriptor::new("account"),
            EntityDescriptor::new("account"),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateEntity(name) if name == "account"));
    }
}
