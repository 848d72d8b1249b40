mod check;
mod config;
mod layout;
mod mode;
mod operators;
mod snapshot;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};

use qtree_core::{
    Availability, AttributeDescriptor, Condition, ConditionEngine, DocumentTree, NodeId,
    QueryDocument, SchemaCatalog, StaticCatalog,
};
use qtree_resolve::InMemorySource;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Query condition checking and result layout tools.
#[derive(Parser)]
#[command(name = "qtree", version, about = "Query condition checking and result layout tools")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Path to a qtree.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to a JSON metadata snapshot
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// A condition placed in a one-entity query.
#[derive(Args, Debug)]
pub(crate) struct ConditionArgs {
    /// Root entity of the query
    #[arg(long)]
    entity: String,
    /// Attribute the condition tests
    #[arg(long, default_value = "")]
    attribute: String,
    /// Condition operator (e.g. eq, in, last-x-days)
    #[arg(long, default_value = "")]
    operator: String,
    /// Inline value (comma-separated for multi-valued operators)
    #[arg(long, default_value = "")]
    value: String,
    /// Attribute to compare against instead of a value
    #[arg(long, default_value = "")]
    value_of: String,
    /// Existing value node under the condition (repeatable)
    #[arg(long = "node")]
    nodes: Vec<String>,
    /// Linked entity under the root, as name or name:alias (repeatable)
    #[arg(long = "link")]
    links: Vec<String>,
    /// Linked entity (alias or name) the condition is scoped to
    #[arg(long)]
    scope: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a condition
    Check {
        #[command(flatten)]
        condition: ConditionArgs,
        /// Also check each entry of a pending comma-separated list
        #[arg(long)]
        strict: bool,
        /// Validate strictly and move a comma-separated list into value nodes
        #[arg(long)]
        save: bool,
    },

    /// List operators, optionally only those valid for an attribute
    Operators {
        /// Entity owning the attribute
        #[arg(long, requires = "attribute")]
        entity: Option<String>,
        /// Attribute to filter operators for
        #[arg(long, requires = "entity")]
        attribute: Option<String>,
    },

    /// Show how a condition's value is edited
    Mode {
        #[command(flatten)]
        condition: ConditionArgs,
        /// Explicit target entity for a GUID value
        #[arg(long, default_value = "")]
        target: String,
        /// Resolve the record label of a GUID value from the snapshot
        #[arg(long)]
        resolve: bool,
    },

    /// Reconcile a result layout with the query's attributes and write it
    Layout {
        /// Root entity of the query
        #[arg(long)]
        entity: String,
        /// Persisted layout XML file
        #[arg(long)]
        layout: Option<PathBuf>,
        /// Projected attribute, as name or alias.name (repeatable)
        #[arg(long = "attribute")]
        attributes: Vec<String>,
        /// Column widths in order, as name=width,name=width
        #[arg(long)]
        widths: Option<String>,
    },
}

/// Shared state for a single command run.
pub(crate) struct Context {
    pub engine: ConditionEngine,
    pub catalog: StaticCatalog,
    pub records: InMemorySource,
    pub output: OutputFormat,
    pub quiet: bool,
}

impl Context {
    /// Report `msg` and exit with status 1.
    pub(crate) fn fail(&self, msg: &str) -> ! {
        report_error(msg, self.output, self.quiet);
        process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("QTREE_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn build_context(cli: &Cli) -> Result<Context, String> {
    let config = config::load_config(cli.config.as_deref())?;
    let engine = ConditionEngine::new(config.engine_config()?);
    let (catalog, records) = snapshot::load_snapshot(cli.catalog.as_deref())?;
    Ok(Context {
        engine,
        catalog,
        records,
        output: cli.output,
        quiet: cli.quiet,
    })
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let ctx = match build_context(&cli) {
        Ok(ctx) => ctx,
        Err(msg) => {
            report_error(&format!("error: {}", msg), cli.output, cli.quiet);
            process::exit(1);
        }
    };

    match &cli.command {
        Commands::Check {
            condition,
            strict,
            save,
        } => {
            check::cmd_check(&ctx, condition, *strict, *save);
        }
        Commands::Operators { entity, attribute } => {
            operators::cmd_operators(&ctx, entity.as_deref(), attribute.as_deref());
        }
        Commands::Mode {
            condition,
            target,
            resolve,
        } => {
            mode::cmd_mode(&ctx, condition, target, *resolve);
        }
        Commands::Layout {
            entity,
            layout,
            attributes,
            widths,
        } => {
            layout::cmd_layout(
                &ctx,
                entity,
                layout.as_deref(),
                attributes,
                widths.as_deref(),
            );
        }
    }
}

// ──────────────────────────────────────────────
// Shared helpers
// ──────────────────────────────────────────────

/// A condition inside a freshly built query document.
pub(crate) struct ConditionSite {
    pub doc: QueryDocument,
    pub node: NodeId,
    pub condition: Condition,
}

impl ConditionArgs {
    pub(crate) fn build(&self) -> ConditionSite {
        let mut doc = QueryDocument::new(&self.entity);
        let root = doc.root_entity();
        for link in &self.links {
            let (name, alias) = match link.split_once(':') {
                Some((name, alias)) => (name, Some(alias)),
                None => (link.as_str(), None),
            };
            doc.add_link_entity(root, name, alias);
        }
        let condition = Condition {
            attribute: self.attribute.clone(),
            operator: self.operator.clone(),
            value: self.value.clone(),
            value_of: self.value_of.clone(),
            entity_name: self.scope.clone(),
        };
        let filter = doc.add_filter(root);
        let node = doc.add_condition(filter, condition.clone());
        for text in &self.nodes {
            doc.append_value_child(node, text);
        }
        ConditionSite {
            doc,
            node,
            condition,
        }
    }
}

/// Attributes for the condition's schema, or `None` while they are not loaded.
pub(crate) fn site_attributes<'c>(
    ctx: &'c Context,
    site: &ConditionSite,
) -> Option<&'c [AttributeDescriptor]> {
    let scope = site.condition.entity_name.as_deref();
    match ctx
        .engine
        .schema_attributes(&ctx.catalog, &site.doc, site.node, scope)
    {
        Availability::Ready(attrs) => Some(attrs),
        Availability::NotLoaded => {
            for schema in ctx.catalog.take_load_requests() {
                tracing::warn!(schema = %schema, "no metadata for schema; attribute checks skipped");
            }
            None
        }
    }
}

/// Attributes of a root entity, or an error message when not loaded.
pub(crate) fn entity_attributes<'c>(
    ctx: &'c Context,
    entity: &str,
) -> Result<&'c [AttributeDescriptor], String> {
    ctx.catalog
        .attributes(entity)
        .ready()
        .ok_or_else(|| format!("error: no metadata loaded for entity '{}'", entity))
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{{\"error\": \"{}\"}}", msg.replace('"', "\\\""));
        }
    }
}
