use qtree_core::{ConditionCheck, DocumentTree, ValidationReport};

use crate::{site_attributes, ConditionArgs, Context, OutputFormat};

pub(crate) fn cmd_check(ctx: &Context, args: &ConditionArgs, strict: bool, save: bool) {
    let mut site = args.build();
    let attributes = site_attributes(ctx, &site);

    let (report, values) = if save {
        let mut condition = site.condition.clone();
        match ctx
            .engine
            .commit(&mut site.doc, site.node, &mut condition, attributes)
        {
            Ok(commit) => {
                tracing::debug!(created = commit.created_values, "condition saved");
                (commit.report, Some(site.doc.value_children(site.node)))
            }
            Err(report) => (report, None),
        }
    } else {
        let values = site.doc.value_children(site.node);
        let report = ctx.engine.validate(&ConditionCheck {
            condition: &site.condition,
            attributes,
            values: &values,
            strict,
        });
        (report, None)
    };

    print_report(ctx, &report, values.as_deref());
    if report.blocks_save() {
        std::process::exit(1);
    }
}

fn print_report(ctx: &Context, report: &ValidationReport, values: Option<&[String]>) {
    let valid = !report.blocks_save();
    match ctx.output {
        OutputFormat::Json => {
            let mut json = serde_json::json!({
                "valid": valid,
                "issues": report.issues,
            });
            if let Some(values) = values {
                json["values"] = serde_json::json!(values);
            }
            let text = serde_json::to_string_pretty(&json)
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
            if valid {
                println!("{}", text);
            } else {
                eprintln!("{}", text);
            }
        }
        OutputFormat::Text => {
            if ctx.quiet {
                return;
            }
            for issue in &report.issues {
                let line = match &issue.help_url {
                    Some(url) => format!("{}\n  see {}", issue, url),
                    None => issue.to_string(),
                };
                if valid {
                    println!("{}", line);
                } else {
                    eprintln!("{}", line);
                }
            }
            if valid {
                if let Some(values) = values {
                    println!("values: {}", values.join(", "));
                }
                if report.is_clean() {
                    println!("ok");
                }
            }
        }
    }
}
