//! qtree-layout: result-grid layout cells for a query.
//!
//! A [`Layout`] is an ordered list of named, sized cells for one entity.
//! It is reconciled against the query's projected attributes and against
//! persisted width maps, and read from or written to the grid XML format.

pub mod error;
pub mod layout;
pub mod xml;

pub use error::LayoutError;
pub use layout::{Cell, Layout};
pub use xml::{parse_layout, to_xml};
