use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use flowlens::highlight::NodeHighlight;
use flowlens::util::format_amount;
use flowlens::{FlowGraph, NodeId, Session, load_dataset};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Dataset directory holding nodes.json and links.json (groups.json and
    /// stories.json are optional)
    #[arg(long, default_value = "data")]
    data: PathBuf,

    /// Collapse nodes under the grouping overlay
    #[arg(long)]
    grouped: bool,

    /// Focus one node by name (exact match first, then fuzzy)
    #[arg(long)]
    focus: Option<String>,

    /// Select a story by its number in the list
    #[arg(long)]
    story: Option<usize>,

    /// Rows shown in the ranking tables
    #[arg(long, default_value_t = 10)]
    top: usize,
}

fn main() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flowlens=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();

    let args = Args::parse();

    let dataset = load_dataset(&args.data)
        .with_context(|| format!("failed to load dataset from {}", args.data.display()))?;
    let mut session = Session::new(dataset).context("dataset failed validation")?;

    session.set_grouped(args.grouped);
    if let Some(number) = args.story {
        match number.checked_sub(1) {
            Some(index) => session.select_story(index),
            None => println!("story numbers start at 1"),
        }
    }
    if let Some(name) = &args.focus
        && session.focus_by_name(name).is_none()
    {
        println!("no node matched {name:?}");
    }

    print_overview(&session);
    match session.selection().single_focus() {
        Some(id) => print_focus(&session, id),
        None => print_endpoints(&session, args.top),
    }
    print_nodes(&session);
    if let Some(story) = session.selected_story() {
        print_story(&session, story);
    }

    Ok(())
}

fn print_overview(session: &Session) {
    let graph = session.graph();
    println!(
        "{} nodes, {} links, {} total flow{}",
        graph.node_count(),
        graph.link_count(),
        format_amount(graph.total_value()),
        if session.is_grouped() { " (grouped)" } else { "" },
    );
    println!();
}

fn print_endpoints(session: &Session, top: usize) {
    let graph = session.graph();

    println!("Sources (money in):");
    for node in graph.sources().into_iter().take(top) {
        println!("  {:<32} {:>12}", node.name, format_amount(graph.outflow(node.id)));
    }

    println!("Sinks (money out):");
    for node in graph.sinks().into_iter().take(top) {
        println!("  {:<32} {:>12}", node.name, format_amount(graph.inflow(node.id)));
    }
    println!();
}

fn print_focus(session: &Session, id: NodeId) {
    let graph = session.graph();
    let Some(node) = graph.node(id) else {
        return;
    };

    println!(
        "Focused: {} (inflow {}, outflow {})",
        node.name,
        format_amount(graph.inflow(id)),
        format_amount(graph.outflow(id)),
    );

    let connections = graph.direct_connections(id);
    if !connections.inflows.is_empty() {
        println!("  From:");
        for (other, value) in &connections.inflows {
            println!("    {:<30} {:>12}", node_name(graph, *other), format_amount(*value));
        }
    }
    if !connections.outflows.is_empty() {
        println!("  To:");
        for (other, value) in &connections.outflows {
            println!("    {:<30} {:>12}", node_name(graph, *other), format_amount(*value));
        }
    }
    println!();
}

fn print_nodes(session: &Session) {
    let snapshot = session.snapshot();

    println!("{:<34} {:>12} {:>12}", "Node", "Inflow", "Outflow");
    for node in &snapshot.nodes {
        let flows = snapshot.flows.get(&node.id).copied().unwrap_or_default();
        let marker = match snapshot.partition.nodes.get(&node.id) {
            Some(NodeHighlight::Focused) => "* ",
            Some(NodeHighlight::Connected) => "+ ",
            Some(NodeHighlight::Dimmed) => ". ",
            _ => "  ",
        };
        println!(
            "{marker}{:<32} {:>12} {:>12}",
            node.name,
            format_amount(flows.inflow),
            format_amount(flows.outflow),
        );
    }
    println!();
}

fn print_story(session: &Session, story: &flowlens::Story) {
    println!("## {}", story.title);
    println!("{}", story.description);
    for chart in &story.charts {
        if let Some(title) = &chart.title {
            println!("{title}:");
        }
        for total in chart.section_totals(session.graph()) {
            println!("  {:<32} {:>12}", total.label, format_amount(total.value));
        }
    }
}

fn node_name<'a>(graph: &'a FlowGraph, id: NodeId) -> &'a str {
    graph.node(id).map(|node| node.name.as_str()).unwrap_or("?")
}
