//! CLI binary for PPR graphs: edit the entity store and analyse product lines.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ppr_analysis::error::AnalysisError;
use ppr_analysis::graph::{DirectedGraph, build_from_store, integrity_report};
use ppr_analysis::utilization::{ReachKind, Reachability, UtilizationTarget};
use ppr_analysis::{query, recurrence, utilization};
use ppr_core::config::PprConfig;
use ppr_core::error::StoreError;
use ppr_core::model::{
    AttributeGroup, AttributeValue, Attributes, NodeType, ProductLine, RelationKind,
};
use ppr_core::storage;
use ppr_core::store::{EntityStore, NodeUpdate};
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "ppr", about = "Product-Process-Resource graph analysis")]
struct Cli {
    /// Project root directory (defaults to current directory)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// PPR document to use instead of the configured one under .ppr/
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty PPR document
    Init {
        /// Overwrite an existing document
        #[arg(long)]
        force: bool,
    },

    /// Show document statistics
    Info,

    /// Check both product lines for duplicate names and dangling relations
    Validate,

    /// List nodes
    Nodes {
        /// Only nodes of this type (e.g. "Process", "p1")
        #[arg(short = 't', long = "type")]
        node_type: Option<NodeType>,

        /// Only nodes that take part in this product line
        #[arg(short, long)]
        line: Option<ProductLine>,
    },

    /// Show one node with its attributes and successors
    Node {
        name: String,

        /// Product line: 1 or 2
        #[arg(short, long, default_value = "1")]
        line: ProductLine,
    },

    /// Show the relations from one node to another
    Edge {
        source: String,
        target: String,

        /// Product line: 1 or 2
        #[arg(short, long, default_value = "1")]
        line: ProductLine,
    },

    /// Node count, edge count and density of a product line
    Density {
        /// Product line: 1 or 2
        #[arg(short, long, default_value = "1")]
        line: ProductLine,
    },

    /// Check whether one node reaches another
    HasPath {
        from: String,
        to: String,

        /// Product line: 1 or 2
        #[arg(short, long, default_value = "1")]
        line: ProductLine,
    },

    /// Shortest path between two nodes
    Path {
        from: String,
        to: String,

        /// Product line: 1 or 2
        #[arg(short, long, default_value = "1")]
        line: ProductLine,
    },

    /// Share of resources or processes used by a product line
    Utilization {
        /// Node type to measure: resource, process
        #[arg(short, long, default_value = "resource")]
        target: UtilizationTarget,

        /// Product line: 1 or 2
        #[arg(short, long, default_value = "1")]
        line: ProductLine,
    },

    /// Link a selected product or process to a resource or process
    Reach {
        /// product-resource, product-process, process-process
        kind: ReachKind,
        from: String,
        to: String,

        /// Product line: 1 or 2
        #[arg(short, long, default_value = "1")]
        line: ProductLine,
    },

    /// Strongly connected components of a product line
    Scc {
        /// Product line: 1 or 2
        #[arg(short, long, default_value = "1")]
        line: ProductLine,

        /// Also list single-node components
        #[arg(long)]
        all: bool,
    },

    /// Maximal chains reachable from a start node
    Recurring {
        start: String,

        /// Product line: 1 or 2
        #[arg(short, long, default_value = "1")]
        line: ProductLine,
    },

    /// Add a node
    AddNode {
        name: String,

        /// Product 1, Product 2, Process, Resource
        #[arg(short = 't', long = "type")]
        node_type: NodeType,

        /// Attribute as group.field=value, e.g. engineering.OEE=85 (repeatable)
        #[arg(short, long = "attr")]
        attrs: Vec<String>,
    },

    /// Rename a node, change its type, or set attributes
    UpdateNode {
        name: String,

        #[arg(long)]
        rename: Option<String>,

        #[arg(short = 't', long = "type")]
        node_type: Option<NodeType>,

        /// Attribute as group.field=value (repeatable)
        #[arg(short, long = "attr")]
        attrs: Vec<String>,
    },

    /// Remove a node and every relation that references it
    RemoveNode { name: String },

    /// Add a relation to a product line
    AddRelation {
        source: String,
        /// "Input for", "Outputs", "Executed by", "Connected to"
        relation: RelationKind,
        target: String,

        /// Product line: 1 or 2
        #[arg(short, long, default_value = "1")]
        line: ProductLine,
    },

    /// Remove a relation by id
    RemoveRelation {
        id: Uuid,

        /// Product line: 1 or 2
        #[arg(short, long, default_value = "1")]
        line: ProductLine,
    },

    /// Remove every relation of a node in both product lines, keeping the node
    ClearRelations { name: String },
}

/// Where the document lives and how to treat it for one invocation.
struct Session {
    document: PathBuf,
    config: PprConfig,
    json: bool,
}

impl Session {
    fn open(cli: &Cli) -> Result<Self> {
        let project_root = match &cli.project {
            Some(p) => p.clone(),
            None => std::env::current_dir().context("failed to get current directory")?,
        };
        let config = PprConfig::load(&project_root)?;
        let document = match &cli.file {
            Some(f) => f.clone(),
            None => storage::document_path(&project_root, &config),
        };
        tracing::debug!(
            document = %document.display(),
            integrity = %config.analysis.integrity,
            "opened session"
        );
        Ok(Self {
            document,
            config,
            json: cli.json,
        })
    }

    fn load(&self) -> Result<EntityStore> {
        if !self.document.exists() {
            anyhow::bail!(
                "No PPR document at {}. Run `ppr init` first.",
                self.document.display()
            );
        }
        let store = storage::load_file(&self.document)?;
        tracing::debug!(
            nodes = store.nodes().len(),
            line_1 = store.edges(ProductLine::One).len(),
            line_2 = store.edges(ProductLine::Two).len(),
            "loaded document"
        );
        Ok(store)
    }

    fn save(&self, store: &EntityStore) -> Result<()> {
        if let Some(dir) = self.document.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        storage::save_file(&self.document, store)
    }

    fn graph(&self, store: &EntityStore, line: ProductLine) -> Result<DirectedGraph> {
        Ok(build_from_store(store, line, self.config.analysis.integrity)?)
    }

    fn emit<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let session = Session::open(&cli)?;

    match cli.command {
        Commands::Init { force } => cmd_init(&session, force),
        Commands::Info => cmd_info(&session),
        Commands::Validate => cmd_validate(&session),
        Commands::Nodes { node_type, line } => cmd_nodes(&session, node_type, line),
        Commands::Node { name, line } => cmd_node(&session, &name, line),
        Commands::Edge {
            source,
            target,
            line,
        } => cmd_edge(&session, &source, &target, line),
        Commands::Density { line } => cmd_density(&session, line),
        Commands::HasPath { from, to, line } => cmd_has_path(&session, &from, &to, line),
        Commands::Path { from, to, line } => cmd_path(&session, &from, &to, line),
        Commands::Utilization { target, line } => cmd_utilization(&session, target, line),
        Commands::Reach {
            kind,
            from,
            to,
            line,
        } => cmd_reach(&session, kind, &from, &to, line),
        Commands::Scc { line, all } => cmd_scc(&session, line, all),
        Commands::Recurring { start, line } => cmd_recurring(&session, &start, line),
        Commands::AddNode {
            name,
            node_type,
            attrs,
        } => cmd_add_node(&session, &name, node_type, &attrs),
        Commands::UpdateNode {
            name,
            rename,
            node_type,
            attrs,
        } => cmd_update_node(&session, &name, rename, node_type, &attrs),
        Commands::RemoveNode { name } => cmd_remove_node(&session, &name),
        Commands::AddRelation {
            source,
            relation,
            target,
            line,
        } => cmd_add_relation(&session, &source, relation, &target, line),
        Commands::RemoveRelation { id, line } => cmd_remove_relation(&session, id, line),
        Commands::ClearRelations { name } => cmd_clear_relations(&session, &name),
    }
}

/// Closest existing name to a mistyped one, if any is reasonably similar.
fn closest_name<'a>(wanted: &str, names: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let wanted = wanted.to_lowercase();
    names
        .map(|name| (name, strsim::normalized_levenshtein(&wanted, &name.to_lowercase())))
        .filter(|(_, score)| *score >= 0.5)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(name, _)| name)
}

/// Print a user-facing analysis outcome (unknown node, no path) and swallow
/// it; every other error propagates.
fn report_outcome<T>(
    session: &Session,
    graph: &DirectedGraph,
    result: Result<T, AnalysisError>,
) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(AnalysisError::NotFound { line, name }) => {
            let suggestion = closest_name(&name, graph.nodes().map(|n| n.name.as_str()));
            notice(
                session,
                &format!("Node not found in {}: {}", line, name),
                suggestion,
            )?;
            Ok(None)
        }
        Err(AnalysisError::NoPath { from, to }) => {
            notice(
                session,
                &format!("There is no path between {} and {}", from, to),
                None,
            )?;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Same as [`report_outcome`] for editing operations.
fn report_store_outcome<T>(
    session: &Session,
    store: &EntityStore,
    result: Result<T, StoreError>,
) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(StoreError::NodeNotFound(name)) => {
            let suggestion = closest_name(&name, store.nodes().iter().map(|n| n.name.as_str()));
            notice(session, &format!("Node not found: {}", name), suggestion)?;
            Ok(None)
        }
        Err(StoreError::EdgeNotFound { line, id }) => {
            notice(session, &format!("Relation {} not found in {}", id, line), None)?;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn notice(session: &Session, message: &str, suggestion: Option<&str>) -> Result<()> {
    if session.json {
        return session.emit(&serde_json::json!({
            "message": message,
            "did_you_mean": suggestion,
        }));
    }
    println!("{}", message);
    if let Some(s) = suggestion {
        println!("Did you mean '{}'?", s);
    }
    Ok(())
}

/// Parse `group.field=value`.
fn parse_attr(raw: &str) -> Result<(AttributeGroup, String, AttributeValue)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("attribute '{}' must look like group.field=value", raw))?;
    let (group, field) = key
        .split_once('.')
        .with_context(|| format!("attribute '{}' must look like group.field=value", raw))?;
    let group: AttributeGroup = group.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let field = field.trim();
    if field.is_empty() {
        anyhow::bail!("attribute '{}' has an empty field name", raw);
    }
    Ok((
        group,
        field.to_string(),
        AttributeValue::parse_lenient(value),
    ))
}

fn apply_attrs(attributes: &mut Attributes, attrs: &[String]) -> Result<()> {
    for raw in attrs {
        let (group, field, value) = parse_attr(raw)?;
        attributes.set(group, &field, value);
    }
    Ok(())
}

fn cmd_init(session: &Session, force: bool) -> Result<()> {
    if session.document.exists() && !force {
        anyhow::bail!(
            "PPR document already exists at {}. Use --force to overwrite.",
            session.document.display()
        );
    }
    session.save(&EntityStore::new())?;
    eprintln!(
        "Initialized empty PPR document at {}",
        session.document.display()
    );
    Ok(())
}

#[derive(Serialize)]
struct InfoReport<'a> {
    document: String,
    integrity: String,
    nodes: usize,
    by_type: Vec<(&'a str, usize)>,
    relations: Vec<(&'a str, usize)>,
}

fn cmd_info(session: &Session) -> Result<()> {
    let store = session.load()?;
    let report = InfoReport {
        document: session.document.display().to_string(),
        integrity: session.config.analysis.integrity.to_string(),
        nodes: store.nodes().len(),
        by_type: NodeType::ALL
            .iter()
            .map(|t| (t.label(), store.nodes_of_type(*t).count()))
            .collect(),
        relations: ProductLine::ALL
            .iter()
            .map(|l| (l.key(), store.edges(*l).len()))
            .collect(),
    };

    if session.json {
        return session.emit(&report);
    }

    println!("Document: {}", report.document);
    println!("Integrity: {}", report.integrity);
    println!();
    println!("Nodes: {}", report.nodes);
    for (label, count) in &report.by_type {
        println!("  {}: {}", label, count);
    }
    println!("Relations:");
    for (key, count) in &report.relations {
        println!("  {}: {}", key, count);
    }
    Ok(())
}

fn cmd_validate(session: &Session) -> Result<()> {
    let store = session.load()?;
    let duplicates = store.duplicate_names();
    let reports: Vec<_> = ProductLine::ALL
        .iter()
        .map(|line| integrity_report(&store, *line))
        .collect();

    if session.json {
        return session.emit(&serde_json::json!({
            "duplicate_names": duplicates,
            "lines": reports,
        }));
    }

    let mut issues = 0;
    for name in &duplicates {
        println!("WARN: duplicate node name: {}", name);
        issues += 1;
    }
    for report in &reports {
        for dangling in &report.dangling {
            println!(
                "WARN: {} relation {} ({} -> {}) references missing node(s): {}",
                report.line,
                dangling.id,
                dangling.source,
                dangling.target,
                dangling.missing.join(", ")
            );
            issues += 1;
        }
    }

    if issues == 0 {
        eprintln!("Document is valid. No integrity issues found.");
    } else {
        eprintln!("\nFound {} integrity issue(s).", issues);
    }
    Ok(())
}

fn cmd_nodes(
    session: &Session,
    node_type: Option<NodeType>,
    line: Option<ProductLine>,
) -> Result<()> {
    let store = session.load()?;
    let nodes: Vec<_> = store
        .nodes()
        .iter()
        .filter(|n| node_type.is_none_or(|t| n.node_type == t))
        .filter(|n| line.is_none_or(|l| l.admits(n.node_type)))
        .collect();

    if session.json {
        return session.emit(&nodes);
    }

    for node in &nodes {
        println!("{:<30} {:<10} {}", node.name, node.node_type, node.id);
    }
    eprintln!("{} node(s)", nodes.len());
    Ok(())
}

fn cmd_node(session: &Session, name: &str, line: ProductLine) -> Result<()> {
    let store = session.load()?;
    let graph = session.graph(&store, line)?;
    let Some(node) = report_outcome(session, &graph, query::node_detail(&graph, name))? else {
        return Ok(());
    };
    let successors = graph.successors(name);

    if session.json {
        return session.emit(&serde_json::json!({
            "node": node,
            "successors": successors,
        }));
    }

    println!("Node: {}", node.name);
    println!("Type: {}", node.node_type);
    println!("ID: {}", node.id);
    for group in AttributeGroup::ALL {
        let Some(view) = node.attributes.view(group) else {
            continue;
        };
        let filled: Vec<String> = view
            .fields()
            .into_iter()
            .filter_map(|(field, value)| value.map(|v| format!("{}={}", field, v)))
            .chain(view.extra().iter().map(|(k, v)| format!("{}={}", k, v)))
            .collect();
        if !filled.is_empty() {
            println!("{}: {}", group.label(), filled.join(", "));
        }
    }
    if !successors.is_empty() {
        println!("\nSuccessors ({}): {}", line, successors.join(", "));
    }
    Ok(())
}

fn cmd_edge(session: &Session, source: &str, target: &str, line: ProductLine) -> Result<()> {
    let store = session.load()?;
    let graph = session.graph(&store, line)?;
    for endpoint in [source, target] {
        if report_outcome(session, &graph, query::node_detail(&graph, endpoint))?.is_none() {
            return Ok(());
        }
    }
    let edges = query::edges_between(&graph, source, target);

    if session.json {
        return session.emit(&edges);
    }

    if edges.is_empty() {
        println!("No relation from {} to {} in {}", source, target, line);
    }
    for edge in edges {
        println!(
            "{} --[{}]--> {}  ({})",
            edge.source, edge.relation, edge.target, edge.id
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct DensityReport {
    line: ProductLine,
    nodes: usize,
    edges: usize,
    density: f64,
    empty: bool,
    directed: bool,
}

fn cmd_density(session: &Session, line: ProductLine) -> Result<()> {
    let store = session.load()?;
    let graph = session.graph(&store, line)?;
    let report = DensityReport {
        line,
        nodes: query::node_count(&graph),
        edges: query::edge_count(&graph),
        density: query::density(&graph),
        empty: query::is_empty(&graph),
        directed: query::is_directed(&graph),
    };

    if session.json {
        return session.emit(&report);
    }

    println!("Line: {}", report.line);
    println!("Nodes: {}", report.nodes);
    println!("Edges: {}", report.edges);
    println!("Density: {:.4}", report.density);
    if !graph.skipped().is_empty() {
        eprintln!(
            "{} dangling relation(s) left out of the graph",
            graph.skipped().len()
        );
    }
    Ok(())
}

fn cmd_has_path(session: &Session, from: &str, to: &str, line: ProductLine) -> Result<()> {
    let store = session.load()?;
    let graph = session.graph(&store, line)?;
    let Some(found) = report_outcome(session, &graph, query::has_path(&graph, from, to))? else {
        return Ok(());
    };

    if session.json {
        return session.emit(&serde_json::json!({ "from": from, "to": to, "has_path": found }));
    }
    println!(
        "{} {} {} in {}",
        from,
        if found { "reaches" } else { "does not reach" },
        to,
        line
    );
    Ok(())
}

fn cmd_path(session: &Session, from: &str, to: &str, line: ProductLine) -> Result<()> {
    let store = session.load()?;
    let graph = session.graph(&store, line)?;
    let Some(path) = report_outcome(session, &graph, query::shortest_path(&graph, from, to))?
    else {
        return Ok(());
    };

    if session.json {
        return session.emit(&path);
    }
    println!("{}", path.join(" -> "));
    eprintln!("{} arc(s)", path.len() - 1);
    Ok(())
}

fn cmd_utilization(session: &Session, target: UtilizationTarget, line: ProductLine) -> Result<()> {
    let store = session.load()?;
    let report = utilization::utilization_for(&store, line, target);

    if session.json {
        return session.emit(&report);
    }

    println!(
        "{} utilization in {}: {}/{} ({:.2}%)",
        report.target, report.line, report.used, report.total, report.percentage
    );
    if !report.unused.is_empty() {
        println!("Unused: {}", report.unused.join(", "));
    }
    Ok(())
}

fn cmd_reach(
    session: &Session,
    kind: ReachKind,
    from: &str,
    to: &str,
    line: ProductLine,
) -> Result<()> {
    let store = session.load()?;
    let graph = session.graph(&store, line)?;
    let Some(outcome) = report_outcome(
        session,
        &graph,
        utilization::targeted_reachability(&graph, kind, from, to),
    )?
    else {
        return Ok(());
    };

    if session.json {
        return session.emit(&outcome);
    }

    match outcome {
        Reachability::Reached { path, subgraph } => {
            println!("{}", path.join(" -> "));
            for edge in &subgraph.edges {
                println!("  {} --[{}]--> {}", edge.source, edge.relation, edge.target);
            }
        }
        Reachability::NoPath { from, to } => {
            println!("There is no path between {} and {}", from, to);
        }
    }
    Ok(())
}

fn cmd_scc(session: &Session, line: ProductLine, all: bool) -> Result<()> {
    let store = session.load()?;
    let graph = session.graph(&store, line)?;
    let components: Vec<_> = recurrence::strongly_connected_components(&graph)
        .into_iter()
        .filter(|c| all || c.len() > 1)
        .collect();

    if session.json {
        return session.emit(&components);
    }

    if components.is_empty() {
        println!("No cycles in {}", line);
    }
    for component in &components {
        let names: Vec<&str> = component.iter().map(String::as_str).collect();
        println!("{{{}}}", names.join(", "));
    }
    Ok(())
}

fn cmd_recurring(session: &Session, start: &str, line: ProductLine) -> Result<()> {
    let store = session.load()?;
    let graph = session.graph(&store, line)?;
    let Some(found) = report_outcome(
        session,
        &graph,
        recurrence::recurring_components(&graph, start),
    )?
    else {
        return Ok(());
    };

    if session.json {
        return session.emit(&found);
    }

    if found.is_empty() {
        println!("No recurring components from {}", start);
    }
    for chain in &found {
        println!("{}", chain.join(" -> "));
    }
    Ok(())
}

fn cmd_add_node(session: &Session, name: &str, node_type: NodeType, attrs: &[String]) -> Result<()> {
    let mut store = session.load()?;
    let mut attributes = Attributes::empty_groups();
    apply_attrs(&mut attributes, attrs)?;

    let id = store.create_node(name, node_type, attributes)?;
    session.save(&store)?;
    println!("Added {} node '{}' ({})", node_type, name.trim(), id);
    Ok(())
}

fn cmd_update_node(
    session: &Session,
    name: &str,
    rename: Option<String>,
    node_type: Option<NodeType>,
    attrs: &[String],
) -> Result<()> {
    let mut store = session.load()?;
    let attributes = match store.node(name) {
        Some(node) if !attrs.is_empty() => {
            let mut attributes = node.attributes.clone();
            apply_attrs(&mut attributes, attrs)?;
            Some(attributes)
        }
        _ => None,
    };
    let update = NodeUpdate {
        name: rename,
        node_type,
        attributes,
    };

    let result = store.update_node(name, update);
    if report_store_outcome(session, &store, result)?.is_none() {
        return Ok(());
    }
    session.save(&store)?;
    println!("Updated node '{}'", name);
    Ok(())
}

fn cmd_remove_node(session: &Session, name: &str) -> Result<()> {
    let mut store = session.load()?;
    let result = store.delete_node(name);
    let Some(node) = report_store_outcome(session, &store, result)? else {
        return Ok(());
    };
    session.save(&store)?;
    println!("Removed {} node '{}'", node.node_type, node.name);
    Ok(())
}

fn cmd_add_relation(
    session: &Session,
    source: &str,
    relation: RelationKind,
    target: &str,
    line: ProductLine,
) -> Result<()> {
    let mut store = session.load()?;
    let result = store.create_relation(line, source, relation, target);
    let Some(id) = report_store_outcome(session, &store, result)? else {
        return Ok(());
    };
    session.save(&store)?;
    println!(
        "Added {} relation {} --[{}]--> {} ({})",
        line, source, relation, target, id
    );
    Ok(())
}

fn cmd_remove_relation(session: &Session, id: Uuid, line: ProductLine) -> Result<()> {
    let mut store = session.load()?;
    let result = store.delete_relation(line, id);
    let Some(edge) = report_store_outcome(session, &store, result)? else {
        return Ok(());
    };
    session.save(&store)?;
    println!(
        "Removed {} relation {} --[{}]--> {}",
        line, edge.source, edge.relation, edge.target
    );
    Ok(())
}

fn cmd_clear_relations(session: &Session, name: &str) -> Result<()> {
    let mut store = session.load()?;
    let result = store.delete_relations_touching(name);
    let Some(removed) = report_store_outcome(session, &store, result)? else {
        return Ok(());
    };
    session.save(&store)?;
    println!("Removed {} relation(s) of '{}'", removed, name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_name() {
        let names = ["Laser", "Robot", "Cut"];
        assert_eq!(closest_name("laser", names.iter().copied()), Some("Laser"));
        assert_eq!(closest_name("Robto", names.iter().copied()), Some("Robot"));
        assert_eq!(closest_name("Conveyor", names.iter().copied()), None);
    }

    #[test]
    fn test_parse_attr() {
        let (group, field, value) = parse_attr("engineering.OEE=85").unwrap();
        assert_eq!(group, AttributeGroup::Engineering);
        assert_eq!(field, "OEE");
        assert_eq!(value, AttributeValue::Integer(85));

        let (_, field, value) = parse_attr("sustainable.CO2 footprint=1.5").unwrap();
        assert_eq!(field, "CO2 footprint");
        assert_eq!(value, AttributeValue::Float(1.5));

        assert!(parse_attr("OEE=85").is_err());
        assert!(parse_attr("engineering.OEE").is_err());
        assert!(parse_attr("thermal.temp=3").is_err());
    }

    #[test]
    fn test_cli_parses_line_and_kind() {
        let cli = Cli::try_parse_from([
            "ppr",
            "--json",
            "reach",
            "product-resource",
            "Bracket",
            "Laser",
            "--line",
            "2",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Reach { kind, line, .. } => {
                assert_eq!(kind, ReachKind::ProductToResource);
                assert_eq!(line, ProductLine::Two);
            }
            _ => panic!("expected reach"),
        }
    }

    #[test]
    fn test_missing_relation_is_reported_not_failed() {
        let tmpdir = tempfile::tempdir().unwrap();
        let session = Session {
            document: tmpdir.path().join("plant.json"),
            config: PprConfig::default(),
            json: false,
        };
        let mut store = EntityStore::new();
        store
            .create_node("Cut", NodeType::Process, Attributes::empty_groups())
            .unwrap();
        store
            .create_node("Laser", NodeType::Resource, Attributes::empty_groups())
            .unwrap();
        store
            .create_relation(ProductLine::One, "Cut", RelationKind::ExecutedBy, "Laser")
            .unwrap();
        session.save(&store).unwrap();

        let id = Uuid::new_v4();
        cmd_remove_relation(&session, id, ProductLine::One).unwrap();
        assert_eq!(session.load().unwrap().edges(ProductLine::One).len(), 1);

        let result = store.delete_relation(ProductLine::Two, id);
        assert!(matches!(
            report_store_outcome(&session, &store, result),
            Ok(None)
        ));
    }

    #[test]
    fn test_cli_rejects_unknown_line() {
        assert!(Cli::try_parse_from(["ppr", "density", "--line", "3"]).is_err());
    }
}
