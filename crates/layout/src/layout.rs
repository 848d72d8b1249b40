//! Layout cells and their reconciliation against the query's attributes.

use serde::Serialize;
use std::fmt;

use qtree_core::{EntityDescriptor, ProjectedAttribute};

/// One column of a result grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    /// Projection name of the column.
    pub name: String,
    /// Zero hides the column.
    pub width: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<ProjectedAttribute>,
}

impl Cell {
    pub fn new(name: impl Into<String>, width: u32) -> Self {
        Cell {
            name: name.into(),
            width,
            attribute: None,
        }
    }

    /// A hidden cell bound to `attribute`.
    pub fn for_attribute(attribute: &ProjectedAttribute) -> Self {
        Cell {
            name: attribute.projection_name(),
            width: 0,
            attribute: Some(attribute.clone()),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.width > 0
    }

    pub fn is_bound(&self) -> bool {
        self.attribute.is_some()
    }
}

/// Ordered result-grid columns for one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub entity_name: String,
    #[serde(skip)]
    pub entity: Option<EntityDescriptor>,
    pub cells: Vec<Cell>,
}

impl Layout {
    pub fn new(entity_name: impl Into<String>, entity: Option<EntityDescriptor>) -> Self {
        Layout {
            entity_name: entity_name.into(),
            entity,
            cells: Vec::new(),
        }
    }

    pub fn cell(&self, name: &str) -> Option<&Cell> {
        self.cells.iter().find(|c| c.name == name)
    }

    pub fn visible_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| c.is_visible())
    }

    /// Find the cell showing `attribute`: first by binding, then by
    /// projection name. A cell found by name is bound to the attribute.
    pub fn cell_for(&mut self, attribute: &ProjectedAttribute) -> Option<&mut Cell> {
        let index = match self
            .cells
            .iter()
            .position(|c| c.attribute.as_ref() == Some(attribute))
        {
            Some(i) => i,
            None => {
                let name = attribute.projection_name();
                let i = self.cells.iter().position(|c| c.name == name)?;
                self.cells[i].attribute = Some(attribute.clone());
                i
            }
        };
        Some(&mut self.cells[index])
    }

    /// Bring the cells in line with the current attribute set.
    ///
    /// Attributes without a cell get a hidden one at the end, unbound cells
    /// are re-bound by projection name when no other cell shows that attribute,
    /// and cells left unbound are removed.
    /// Surviving cells keep their order.
    pub fn reconcile_with_attributes(&mut self, attributes: &[ProjectedAttribute]) {
        for cell in &mut self.cells {
            if cell
                .attribute
                .as_ref()
                .map_or(false, |a| !attributes.contains(a))
            {
                cell.attribute = None;
            }
        }

        for attribute in attributes {
            if self.cell_for(attribute).is_none() {
                self.cells.push(Cell::for_attribute(attribute));
            }
        }

        for i in 0..self.cells.len() {
            if self.cells[i].is_bound() {
                continue;
            }
            let free = attributes.iter().find(|a| {
                a.projection_name() == self.cells[i].name
                    && !self.cells.iter().any(|c| c.attribute.as_ref() == Some(*a))
            });
            self.cells[i].attribute = free.cloned();
        }

        let before = self.cells.len();
        self.cells.retain(Cell::is_bound);
        let pruned = before - self.cells.len();
        if pruned > 0 {
            tracing::debug!(entity = %self.entity_name, pruned, "removed unbound layout cells");
        }
    }

    /// Apply persisted column widths and order.
    ///
    /// Every mapped name gets a cell (bound when an attribute projects to
    /// that name). Cells missing from the map are hidden, never removed.
    /// Mapped cells move into map order; the rest follow in their previous
    /// relative order. A name mapped twice keeps its first width.
    pub fn reconcile_with_widths(
        &mut self,
        widths: &[(String, u32)],
        attributes: &[ProjectedAttribute],
    ) {
        let mut order: Vec<(&str, u32)> = Vec::with_capacity(widths.len());
        for (name, width) in widths {
            if !order.iter().any(|(n, _)| n == name) {
                order.push((name, *width));
            }
        }

        for &(name, width) in &order {
            if self.cell(name).is_none() {
                self.cells.push(Cell {
                    name: name.to_string(),
                    width,
                    attribute: attributes
                        .iter()
                        .find(|a| a.projection_name() == name)
                        .cloned(),
                });
            }
        }

        for cell in &mut self.cells {
            cell.width = order
                .iter()
                .find(|(n, _)| *n == cell.name)
                .map_or(0, |&(_, w)| w);
        }

        let mut rest = std::mem::take(&mut self.cells);
        for &(name, _) in &order {
            if let Some(i) = rest.iter().position(|c| c.name == name) {
                self.cells.push(rest.remove(i));
            }
        }
        self.cells.append(&mut rest);
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{} cells",
            self.entity_name,
            self.visible_cells().count(),
            self.cells.len()
        )
    }
}
