//! Metadata snapshot files.
//!
//! A snapshot is the JSON catalog read by [`StaticCatalog`], optionally
//! carrying record labels used to resolve GUID values:
//!
//! ```json
//! {
//!   "entities": [ { "logical_name": "account", "attributes": [] } ],
//!   "records": [ { "entity": "account", "id": "…", "name": "Contoso" } ]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use uuid::Uuid;

use qtree_core::StaticCatalog;
use qtree_resolve::InMemorySource;

#[derive(Debug, Deserialize)]
struct RecordEntry {
    entity: String,
    id: Uuid,
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct RecordSection {
    #[serde(default)]
    records: Vec<RecordEntry>,
}

/// Load the catalog and record labels from a snapshot file.
///
/// Without a file the catalog is empty and no entity list is available.
pub(crate) fn load_snapshot(path: Option<&Path>) -> Result<(StaticCatalog, InMemorySource), String> {
    let Some(path) = path else {
        return Ok((StaticCatalog::unavailable(), InMemorySource::new()));
    };
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;
    let catalog = StaticCatalog::from_json_str(&json)
        .map_err(|e| format!("{}: {}", path.display(), e))?;
    let section: RecordSection = serde_json::from_str(&json)
        .map_err(|e| format!("could not parse records in '{}': {}", path.display(), e))?;
    let records = section
        .records
        .iter()
        .fold(InMemorySource::new(), |source, r| {
            source.with_record(&r.entity, r.id, &r.name)
        });
    Ok((catalog, records))
}
