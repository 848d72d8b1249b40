//! Persisted grid layout documents.
//!
//! ```xml
//! <grid name="resultset" object="1" jump="name" select="1" icon="1" preview="1">
//!   <row name="result" id="accountid">
//!     <cell name="name" width="300"/>
//!   </row>
//! </grid>
//! ```

use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use qtree_core::{ProjectedAttribute, SchemaCatalog};

use crate::error::LayoutError;
use crate::layout::{Cell, Layout};

/// Cells and entity code read from a grid document.
#[derive(Debug, Default)]
struct GridDocument {
    object: Option<i32>,
    cells: Vec<Cell>,
}

impl GridDocument {
    /// Keep the first cell for each name.
    fn push_cell(&mut self, cell: Cell) {
        if self.cells.iter().any(|c| c.name == cell.name) {
            tracing::debug!(cell = %cell.name, "ignoring repeated layout cell");
            return;
        }
        self.cells.push(cell);
    }
}

fn read_grid(xml: &str) -> Result<Option<GridDocument>, LayoutError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut grid: Option<GridDocument> = None;
    let mut depth = 0usize;
    let mut in_row = false;
    let mut rows_seen = 0usize;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                depth += 1;
                match (depth, e.name().as_ref()) {
                    (1, b"grid") => grid = Some(read_grid_header(e)?),
                    (2, b"row") if grid.is_some() => {
                        rows_seen += 1;
                        in_row = rows_seen == 1;
                    }
                    (3, b"cell") if in_row => {
                        if let Some(g) = grid.as_mut() {
                            g.push_cell(read_cell(e)?);
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(ref e) => match (depth + 1, e.name().as_ref()) {
                (1, b"grid") => grid = Some(read_grid_header(e)?),
                (3, b"cell") if in_row => {
                    if let Some(g) = grid.as_mut() {
                        g.push_cell(read_cell(e)?);
                    }
                }
                _ => {}
            },
            Event::End(_) => {
                if depth == 2 {
                    in_row = false;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(grid)
}

fn read_grid_header(e: &BytesStart<'_>) -> Result<GridDocument, LayoutError> {
    let mut object = None;
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == b"object" {
            object = attr.unescape_value()?.trim().parse().ok();
        }
    }
    Ok(GridDocument {
        object,
        cells: Vec::new(),
    })
}

fn read_cell(e: &BytesStart<'_>) -> Result<Cell, LayoutError> {
    let mut name = String::new();
    let mut width = None;
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        match attr.key.as_ref() {
            b"name" => name = attr.unescape_value()?.into_owned(),
            b"width" => width = Some(attr.unescape_value()?.into_owned()),
            _ => {}
        }
    }
    let width = match width {
        Some(text) => text
            .trim()
            .parse()
            .map_err(|_| LayoutError::InvalidWidth {
                name: name.clone(),
                value: text.clone(),
            })?,
        None => 0,
    };
    Ok(Cell::new(name, width))
}

/// Read a persisted layout and reconcile it with the query's attributes.
///
/// The grid's `object` code selects the entity; its cells are kept only when
/// that entity is known to the catalog. Otherwise, and when there is no grid
/// at all, the layout starts empty for the query's root entity.
pub fn parse_layout<C: SchemaCatalog>(
    xml: &str,
    catalog: &C,
    root_entity: &str,
    attributes: &[ProjectedAttribute],
) -> Result<Layout, LayoutError> {
    let grid = if xml.trim().is_empty() {
        None
    } else {
        read_grid(xml)?
    };

    let resolved = grid.as_ref().and_then(|g| {
        g.object
            .and_then(|code| catalog.entity_by_object_type_code(code))
    });
    let mut layout = match (resolved, grid) {
        (Some(entity), Some(grid)) => Layout {
            entity_name: entity.logical_name.clone(),
            entity: Some(entity.clone()),
            cells: grid.cells,
        },
        _ => Layout::new(root_entity, catalog.entity(root_entity).cloned()),
    };
    layout.reconcile_with_attributes(attributes);
    Ok(layout)
}

/// Write the visible, bound cells of a layout as a grid document.
pub fn to_xml(layout: &Layout) -> Result<String, LayoutError> {
    let missing = |what| LayoutError::MissingSchema {
        entity: layout.entity_name.clone(),
        missing: what,
    };
    let entity = layout
        .entity
        .as_ref()
        .ok_or_else(|| missing("no entity metadata"))?;
    let primary_id = entity
        .primary_id_attribute
        .as_deref()
        .ok_or_else(|| missing("no primary id attribute"))?;
    let primary_name = entity
        .primary_name_attribute
        .as_deref()
        .ok_or_else(|| missing("no primary name attribute"))?;

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    let object = entity.object_type_code.map(|c| c.to_string());
    let mut grid = BytesStart::new("grid");
    grid.push_attribute(("name", "resultset"));
    if let Some(object) = object.as_deref() {
        grid.push_attribute(("object", object));
    }
    grid.push_attribute(("jump", primary_name));
    grid.push_attribute(("select", "1"));
    grid.push_attribute(("icon", "1"));
    grid.push_attribute(("preview", "1"));
    writer.write_event(Event::Start(grid))?;

    let mut row = BytesStart::new("row");
    row.push_attribute(("name", "result"));
    row.push_attribute(("id", primary_id));
    writer.write_event(Event::Start(row))?;

    for cell in layout.visible_cells() {
        if !cell.is_bound() {
            tracing::warn!(cell = %cell.name, "skipping visible layout cell with no attribute");
            continue;
        }
        let width = cell.width.to_string();
        let mut element = BytesStart::new("cell");
        element.push_attribute(("name", cell.name.as_str()));
        element.push_attribute(("width", width.as_str()));
        writer.write_event(Event::Empty(element))?;
    }

    writer.write_event(Event::End(BytesEnd::new("row")))?;
    writer.write_event(Event::End(BytesEnd::new("grid")))?;

    Ok(String::from_utf8_lossy(&writer.into_inner().into_inner()).into_owned())
}
