use std::sync::Arc;

use qtree_core::{
    find_attribute, find_operator, DocumentTree, EntityDescriptor, LabelRequest, SchemaCatalog,
    ValueFieldInput,
};
use qtree_resolve::LabelField;

use crate::{site_attributes, ConditionArgs, Context, OutputFormat};

pub(crate) fn cmd_mode(ctx: &Context, args: &ConditionArgs, target: &str, resolve: bool) {
    let site = args.build();
    let attributes = site_attributes(ctx, &site);
    let attribute = find_attribute(attributes, &site.condition.attribute);
    let operator = find_operator(&site.condition.operator);

    let entities: Option<Vec<EntityDescriptor>> = ctx.catalog.entities().map(|names| {
        names
            .iter()
            .filter_map(|n| ctx.catalog.entity(n).cloned())
            .collect()
    });
    let enclosing = site.doc.enclosing_schema_context(site.node);

    let state = ctx.engine.value_field(ValueFieldInput {
        operator,
        attribute,
        value: &site.condition.value,
        child_count: site.doc.child_count(site.node),
        target_override: target,
        enclosing_schema: enclosing.as_deref(),
        entities: entities.as_deref(),
        use_lookup: false,
    });

    let columns: Option<Vec<&str>> = match (operator, attribute, attributes) {
        (Some(op), Some(attr), Some(attrs)) => ctx
            .engine
            .column_comparison_candidates(op, attr, attrs, site.condition.entity_name.is_some())
            .map(|list| list.iter().map(|a| a.logical_name.as_str()).collect()),
        _ => None,
    };

    let label = match (&state.label_request, resolve) {
        (Some(request), true) => resolve_label(ctx, request),
        _ => None,
    };

    if ctx.quiet {
        return;
    }
    match ctx.output {
        OutputFormat::Json => {
            let mut json = serde_json::json!({ "field": state });
            if let Some(columns) = &columns {
                json["value_of_candidates"] = serde_json::json!(columns);
            }
            if let Some(label) = &label {
                json["label"] = serde_json::json!(label);
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            );
        }
        OutputFormat::Text => {
            let mode = serde_json::to_value(state.mode)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            println!("mode: {}", mode);
            println!("value: {}", state.value);
            if let Some(hint) = &state.hint {
                println!("hint: {}", hint);
            }
            for (i, choice) in state.choices.iter().enumerate() {
                let marker = if state.selected == Some(i) { "*" } else { " " };
                println!(" {} {}", marker, choice.label);
            }
            if !state.lookup_targets.is_empty() {
                println!("lookup: {}", state.lookup_targets.join(", "));
            }
            if let Some(label) = &label {
                println!("label: {}", label);
            }
            if let Some(columns) = &columns {
                println!("value of: {}", columns.join(", "));
            }
        }
    }
}

fn resolve_label(ctx: &Context, request: &LabelRequest) -> Option<String> {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::warn!(error = %e, "could not start runtime for label lookup");
            return None;
        }
    };
    let source = Arc::new(ctx.records.clone());
    rt.block_on(async {
        let mut field = LabelField::new(source);
        field.request(request.clone());
        field.settle().await.map(str::to_string)
    })
}
