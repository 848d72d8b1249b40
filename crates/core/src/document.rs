//! Query document model: the tree interface the engine consumes and a small
//! arena-backed implementation of it.
//!
//! The engine only needs to find the schema a condition belongs to, count
//! and read its value children, append new ones, and list the linked
//! entities a condition may target.

use serde::{Deserialize, Serialize};

/// Tree operations required by the condition engine.
pub trait DocumentTree {
    type NodeId: Copy;

    /// Schema name of the closest enclosing entity or linked entity.
    fn enclosing_schema_context(&self, node: Self::NodeId) -> Option<String>;

    fn append_value_child(&mut self, node: Self::NodeId, text: &str);

    fn child_count(&self, node: Self::NodeId) -> usize;

    fn value_children(&self, node: Self::NodeId) -> Vec<String>;

    /// Linked entities a condition under `node` may be scoped to.
    ///
    /// Only conditions directly under the root entity can target a linked
    /// entity; everywhere else this is empty.
    fn linked_entities(&self, node: Self::NodeId) -> Vec<LinkedEntity>;
}

/// A linked entity somewhere in the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedEntity {
    pub name: String,
    pub alias: Option<String>,
}

impl LinkedEntity {
    /// The name a condition uses to refer to this entity.
    pub fn scope_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// The editable fields of one condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub attribute: String,
    pub operator: String,
    #[serde(default)]
    pub value: String,
    /// Column-comparison reference.
    #[serde(default)]
    pub value_of: String,
    /// Linked entity the condition is scoped to, by alias or name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
}

impl Condition {
    pub fn new(attribute: &str, operator: &str, value: &str) -> Self {
        Condition {
            attribute: attribute.to_string(),
            operator: operator.to_string(),
            value: value.to_string(),
            ..Default::default()
        }
    }
}

/// An attribute selected for output, as it appears in the result projection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectedAttribute {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Alias (or name) of the linked entity owning the attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_alias: Option<String>,
}

impl ProjectedAttribute {
    pub fn new(name: impl Into<String>) -> Self {
        ProjectedAttribute {
            name: name.into(),
            alias: None,
            entity_alias: None,
        }
    }

    /// Parse `alias.name` into a linked-entity attribute, or a plain name.
    pub fn parse(text: &str) -> Self {
        match text.split_once('.') {
            Some((entity, name)) => ProjectedAttribute {
                name: name.to_string(),
                alias: None,
                entity_alias: Some(entity.to_string()),
            },
            None => ProjectedAttribute::new(text),
        }
    }

    /// Column name in the result set.
    pub fn projection_name(&self) -> String {
        let column = self.alias.as_deref().unwrap_or(&self.name);
        match &self.entity_alias {
            Some(entity) => format!("{}.{}", entity, column),
            None => column.to_string(),
        }
    }
}

// ──────────────────────────────────────────────
// QueryDocument
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Query,
    Entity { name: String },
    LinkEntity { name: String, alias: Option<String> },
    Attribute { name: String, alias: Option<String> },
    Filter,
    Condition(Condition),
    Value { text: String },
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed query tree: one root entity with nested linked entities,
/// attributes, filters, conditions and condition values.
#[derive(Debug, Clone)]
pub struct QueryDocument {
    nodes: Vec<Node>,
}

impl QueryDocument {
    pub fn new(root_entity: &str) -> Self {
        let mut doc = QueryDocument {
            nodes: vec![Node {
                kind: NodeKind::Query,
                parent: None,
                children: Vec::new(),
            }],
        };
        doc.push(
            NodeId(0),
            NodeKind::Entity {
                name: root_entity.to_string(),
            },
        );
        doc
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn root_entity(&self) -> NodeId {
        NodeId(1)
    }

    pub fn root_entity_name(&self) -> &str {
        match &self.nodes[1].kind {
            NodeKind::Entity { name } => name,
            _ => "",
        }
    }

    pub fn add_link_entity(&mut self, parent: NodeId, name: &str, alias: Option<&str>) -> NodeId {
        self.push(
            parent,
            NodeKind::LinkEntity {
                name: name.to_string(),
                alias: alias.map(str::to_string),
            },
        )
    }

    pub fn add_attribute(&mut self, parent: NodeId, name: &str, alias: Option<&str>) -> NodeId {
        self.push(
            parent,
            NodeKind::Attribute {
                name: name.to_string(),
                alias: alias.map(str::to_string),
            },
        )
    }

    pub fn add_filter(&mut self, parent: NodeId) -> NodeId {
        self.push(parent, NodeKind::Filter)
    }

    pub fn add_condition(&mut self, parent: NodeId, condition: Condition) -> NodeId {
        self.push(parent, NodeKind::Condition(condition))
    }

    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.0].kind
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn condition(&self, node: NodeId) -> Option<&Condition> {
        match &self.nodes[node.0].kind {
            NodeKind::Condition(c) => Some(c),
            _ => None,
        }
    }

    pub fn condition_mut(&mut self, node: NodeId) -> Option<&mut Condition> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Condition(c) => Some(c),
            _ => None,
        }
    }

    fn closest_entity(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.parent(node);
        while let Some(id) = current {
            if matches!(
                self.kind(id),
                NodeKind::Entity { .. } | NodeKind::LinkEntity { .. }
            ) {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    /// Every attribute selected for output, in document order.
    pub fn projected_attributes(&self) -> Vec<ProjectedAttribute> {
        let mut out = Vec::new();
        self.collect_attributes(self.root_entity(), None, &mut out);
        out
    }

    fn collect_attributes(
        &self,
        node: NodeId,
        entity_alias: Option<&str>,
        out: &mut Vec<ProjectedAttribute>,
    ) {
        for &child in &self.nodes[node.0].children {
            match self.kind(child) {
                NodeKind::Attribute { name, alias } => out.push(ProjectedAttribute {
                    name: name.clone(),
                    alias: alias.clone(),
                    entity_alias: entity_alias.map(str::to_string),
                }),
                NodeKind::LinkEntity { name, alias } => {
                    let scope = alias.as_deref().unwrap_or(name);
                    self.collect_attributes(child, Some(scope), out);
                }
                _ => {}
            }
        }
    }

    fn collect_links(&self, node: NodeId, out: &mut Vec<LinkedEntity>) {
        for &child in &self.nodes[node.0].children {
            if let NodeKind::LinkEntity { name, alias } = self.kind(child) {
                out.push(LinkedEntity {
                    name: name.clone(),
                    alias: alias.clone(),
                });
            }
            self.collect_links(child, out);
        }
    }
}

impl DocumentTree for QueryDocument {
    type NodeId = NodeId;

    fn enclosing_schema_context(&self, node: NodeId) -> Option<String> {
        match self.kind(self.closest_entity(node)?) {
            NodeKind::Entity { name } | NodeKind::LinkEntity { name, .. } => Some(name.clone()),
            _ => None,
        }
    }

    fn append_value_child(&mut self, node: NodeId, text: &str) {
        self.push(
            node,
            NodeKind::Value {
                text: text.to_string(),
            },
        );
    }

    fn child_count(&self, node: NodeId) -> usize {
        self.nodes[node.0].children.len()
    }

    fn value_children(&self, node: NodeId) -> Vec<String> {
        self.nodes[node.0]
            .children
            .iter()
            .filter_map(|&c| match self.kind(c) {
                NodeKind::Value { text } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn linked_entities(&self, node: NodeId) -> Vec<LinkedEntity> {
        match self.closest_entity(node) {
            Some(id) if id == self.root_entity() => {
                let mut out = Vec::new();
                self.collect_links(self.root_entity(), &mut out);
                out
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (QueryDocument, NodeId, NodeId) {
        let mut doc = QueryDocument::new("account");
        let root = doc.root_entity();
        doc.add_attribute(root, "name", None);
        doc.add_attribute(root, "revenue", Some("rev"));
        let link = doc.add_link_entity(root, "contact", Some("pc"));
        doc.add_attribute(link, "fullname", None);
        let root_filter = doc.add_filter(root);
        let root_cond = doc.add_condition(root_filter, Condition::new("name", "eq", "x"));
        let link_filter = doc.add_filter(link);
        let link_cond = doc.add_condition(link_filter, Condition::new("fullname", "eq", "y"));
        (doc, root_cond, link_cond)
    }

    #[test]
    fn enclosing_context_walks_to_nearest_entity() {
        let (doc, root_cond, link_cond) = sample();
        assert_eq!(doc.enclosing_schema_context(root_cond).as_deref(), Some("account"));
        assert_eq!(doc.enclosing_schema_context(link_cond).as_deref(), Some("contact"));
    }

    #[test]
    fn projection_names_prefix_linked_entities() {
        let (doc, _, _) = sample();
        let names: Vec<_> = doc
            .projected_attributes()
            .iter()
            .map(ProjectedAttribute::projection_name)
            .collect();
        assert_eq!(names, vec!["name", "rev", "pc.fullname"]);
    }

    #[test]
    fn linked_entities_only_visible_from_root_scope() {
        let (doc, root_cond, link_cond) = sample();
        let links = doc.linked_entities(root_cond);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].scope_name(), "pc");
        assert!(doc.linked_entities(link_cond).is_empty());
    }

    #[test]
    fn parse_projection_text() {
        let attr = ProjectedAttribute::parse("pc.fullname");
        assert_eq!(attr.entity_alias.as_deref(), Some("pc"));
        assert_eq!(attr.projection_name(), "pc.fullname");
        assert_eq!(ProjectedAttribute::parse("name").projection_name(), "name");
    }
}
