/// Errors raised while reading or writing a layout.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// The layout's entity metadata is missing or incomplete, so the grid
    /// header cannot be written.
    #[error("layout for '{entity}' cannot be written: {missing}")]
    MissingSchema {
        entity: String,
        missing: &'static str,
    },

    /// The persisted layout document is not well-formed.
    #[error("layout XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A cell carries a width that is not a non-negative whole number.
    #[error("cell '{name}' has invalid width '{value}'")]
    InvalidWidth { name: String, value: String },
}
