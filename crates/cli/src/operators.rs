use qtree_core::{find_attribute, OperandType, OperatorDescriptor};

use crate::{entity_attributes, Context, OutputFormat};

pub(crate) fn cmd_operators(ctx: &Context, entity: Option<&str>, attribute: Option<&str>) {
    let bound = match (entity, attribute) {
        (Some(entity), Some(attribute)) => {
            let attrs = entity_attributes(ctx, entity).unwrap_or_else(|msg| ctx.fail(&msg));
            match find_attribute(Some(attrs), attribute) {
                Some(attr) => Some(attr),
                None => ctx.fail(&format!(
                    "error: attribute '{}' not found on '{}'",
                    attribute, entity
                )),
            }
        }
        _ => None,
    };
    let operators = ctx.engine.operators_for(bound);

    if ctx.quiet {
        return;
    }
    match ctx.output {
        OutputFormat::Json => {
            let list: Vec<_> = operators
                .iter()
                .map(|op| {
                    serde_json::json!({
                        "symbol": op.symbol,
                        "value": value_shape(op),
                        "multi_valued": op.is_multi_valued,
                        "column_comparison": op.supports_column_comparison,
                        "supported": op.target_supported,
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&list).unwrap_or_default()
            );
        }
        OutputFormat::Text => {
            if let Some(attr) = bound {
                println!("Operators for {} ({})", attr.logical_name, attr.type_display());
            }
            for op in operators {
                let mut flags = Vec::new();
                if op.is_multi_valued {
                    flags.push("multi");
                }
                if op.supports_column_comparison {
                    flags.push("column");
                }
                if !op.target_supported {
                    flags.push("unsupported");
                }
                println!("  {:<40} {:<10} {}", op.symbol, value_shape(op), flags.join(","));
            }
        }
    }
}

fn value_shape(op: &OperatorDescriptor) -> &'static str {
    match op.value_type {
        None => "none",
        Some(OperandType::Polymorphic) => "attribute",
        Some(OperandType::Fixed(t)) => t.name(),
    }
}
