use std::path::Path;

use qtree_core::ProjectedAttribute;
use qtree_layout::{parse_layout, to_xml};

use crate::{Context, OutputFormat};

pub(crate) fn cmd_layout(
    ctx: &Context,
    entity: &str,
    layout_path: Option<&Path>,
    attributes: &[String],
    widths: Option<&str>,
) {
    let xml = match layout_path {
        Some(path) => std::fs::read_to_string(path).unwrap_or_else(|e| {
            ctx.fail(&format!(
                "error: could not read '{}': {}",
                path.display(),
                e
            ))
        }),
        None => String::new(),
    };
    let projected: Vec<ProjectedAttribute> = attributes
        .iter()
        .map(|a| ProjectedAttribute::parse(a))
        .collect();

    let mut layout = parse_layout(&xml, &ctx.catalog, entity, &projected)
        .unwrap_or_else(|e| ctx.fail(&format!("error: {}", e)));

    if let Some(list) = widths {
        let widths = parse_widths(list).unwrap_or_else(|msg| ctx.fail(&msg));
        layout.reconcile_with_widths(&widths, &projected);
    }

    let written = to_xml(&layout).unwrap_or_else(|e| ctx.fail(&format!("error: {}", e)));

    match ctx.output {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "summary": layout.to_string(),
                "layout": layout,
                "xml": written,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            );
        }
        OutputFormat::Text => {
            println!("{}", written);
            if !ctx.quiet {
                eprintln!("{}", layout);
            }
        }
    }
}

/// Parse `name=width,name=width` into an ordered width map.
fn parse_widths(list: &str) -> Result<Vec<(String, u32)>, String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let (name, width) = entry
                .split_once('=')
                .ok_or_else(|| format!("error: expected name=width, got '{}'", entry))?;
            let width = width
                .trim()
                .parse()
                .map_err(|_| format!("error: invalid width for '{}': '{}'", name.trim(), width))?;
            Ok((name.trim().to_string(), width))
        })
        .collect()
}
