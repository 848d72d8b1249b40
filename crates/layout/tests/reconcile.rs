//! Reconciliation scenarios over attribute sets and width maps.

use qtree_core::ProjectedAttribute;
use qtree_layout::{Cell, Layout};

fn attr(name: &str) -> ProjectedAttribute {
    ProjectedAttribute::new(name)
}

fn shape(layout: &Layout) -> Vec<(&str, u32, bool)> {
    layout
        .cells
        .iter()
        .map(|c| (c.name.as_str(), c.width, c.is_bound()))
        .collect()
}

#[test]
fn attribute_set_drops_unbound_and_appends_new() {
    let mut layout = Layout::new("account", None);
    layout.cells.push(Cell {
        attribute: Some(attr("a")),
        ..Cell::new("a", 100)
    });
    layout.cells.push(Cell::new("b", 60));
    layout.cells.push(Cell {
        attribute: Some(attr("c")),
        ..Cell::new("c", 40)
    });

    layout.reconcile_with_attributes(&[attr("a"), attr("c"), attr("d")]);

    assert_eq!(
        shape(&layout),
        vec![("a", 100, true), ("c", 40, true), ("d", 0, true)]
    );
}

#[test]
fn attribute_set_never_binds_two_cells_to_one_attribute() {
    let mut layout = Layout::new("account", None);
    layout.cells.push(Cell::new("name", 100));
    layout.cells.push(Cell::new("name", 50));

    layout.reconcile_with_attributes(&[attr("name")]);

    assert_eq!(shape(&layout), vec![("name", 100, true)]);
}

#[test]
fn attribute_set_is_stable_on_repeat() {
    let attributes = [attr("a"), ProjectedAttribute::parse("pc.fullname")];
    let mut layout = Layout::new("account", None);
    layout.reconcile_with_attributes(&attributes);
    let first = layout.cells.clone();
    layout.reconcile_with_attributes(&attributes);
    assert_eq!(layout.cells, first);
}

#[test]
fn width_map_orders_and_sizes_cells() {
    let mut layout = Layout::new("account", None);
    layout.cells.push(Cell::new("x", 100));
    layout.cells.push(Cell::new("z", 30));

    let attributes = [attr("x"), attr("y"), attr("z")];
    layout.reconcile_with_widths(&[("y".to_string(), 50), ("x".to_string(), 80)], &attributes);

    assert_eq!(
        shape(&layout),
        vec![("y", 50, true), ("x", 80, false), ("z", 0, false)]
    );
}

#[test]
fn width_map_keeps_unmapped_cells_in_relative_order() {
    let mut layout = Layout::new("account", None);
    for name in ["p", "q", "r", "s"] {
        layout.cells.push(Cell::new(name, 10));
    }
    layout.reconcile_with_widths(&[("r".to_string(), 70), ("unknown".to_string(), 20)], &[]);

    let names: Vec<_> = layout.cells.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["r", "unknown", "p", "q", "s"]);
    assert_eq!(layout.cell("unknown").unwrap().attribute, None);
    assert_eq!(layout.to_string(), "account 2/5 cells");
}
