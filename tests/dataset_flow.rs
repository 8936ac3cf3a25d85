//! End-to-end pass over the shipped healthcare dataset: ingest, validate,
//! group, focus, and pull snapshots the way the dashboard does.

use std::path::Path;

use flowlens::highlight::NodeHighlight;
use flowlens::{NodeId, Session, load_dataset};

fn session() -> Session {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    let dataset = load_dataset(&dir).expect("shipped dataset loads");
    Session::new(dataset).expect("shipped dataset validates")
}

#[test]
fn shipped_dataset_aggregates() {
    let session = session();
    let graph = session.graph();

    assert_eq!(graph.node_count(), 9);
    assert_eq!(graph.link_count(), 23);
    assert_eq!(graph.total_value(), 6400.0);

    // Hospitals: 2,000 in from the three payers, 1,400 out.
    let hospitals = graph.node_by_name("Hospitals").expect("node exists").id;
    assert_eq!(graph.inflow(hospitals), 2000.0);
    assert_eq!(graph.outflow(hospitals), 1400.0);
    assert_eq!(graph.total_flow(hospitals), 2000.0);

    // Payers are pure sources, ordered by outflow.
    let sources = graph
        .sources()
        .iter()
        .map(|node| node.name.clone())
        .collect::<Vec<_>>();
    assert_eq!(sources, ["Employers", "Government", "Individuals"]);
    assert_eq!(graph.outflow(NodeId(1)), 2500.0);

    // Hospitals flow onward, so they are in neither list.
    assert!(graph.sinks().iter().all(|node| node.name != "Hospitals"));
}

#[test]
fn grouping_collapses_payers_and_conserves_flow() {
    let mut session = session();
    let base_total = session.graph().total_value();

    session.set_grouped(true);
    let graph = session.graph();

    // 9 nodes - 5 grouped members + 2 group nodes.
    assert_eq!(graph.node_count(), 6);
    let payers = graph.node_by_name("Payers").expect("group node exists");
    assert_eq!(graph.outflow(payers.id), 5000.0);
    assert_eq!(graph.inflow(payers.id), 0.0);

    // No links run between payers or between the two product makers, so
    // nothing was dropped and the totals still match.
    assert_eq!(graph.total_value(), base_total);
}

#[test]
fn story_selection_drives_the_highlight_partition() {
    let mut session = session();
    session.select_story(1); // "Who pays for healthcare"

    let snapshot = session.snapshot();
    let story = snapshot.story.expect("story selected");
    assert_eq!(story.title, "Who pays for healthcare");

    for id in [1, 2, 3] {
        assert_eq!(snapshot.partition.nodes[&NodeId(id)], NodeHighlight::Focused);
    }
    // Every other node receives payer money directly, so nothing is dimmed.
    for id in [4, 5, 6, 7, 8, 9] {
        assert_eq!(
            snapshot.partition.nodes[&NodeId(id)],
            NodeHighlight::Connected
        );
    }

    let totals = story.charts[0].section_totals(session.graph());
    assert_eq!(totals[0].value, 2500.0);
    assert_eq!(totals[1].value, 1900.0);
    assert_eq!(totals[2].value, 600.0);
}

#[test]
fn focusing_hospitals_shows_direct_connections() {
    let mut session = session();
    let hospitals = session.focus_by_name("Hospitals").expect("resolves");
    assert_eq!(hospitals, NodeId(4));

    let connections = session.graph().direct_connections(hospitals);
    assert_eq!(connections.inflows[0], (NodeId(1), 1000.0));
    assert_eq!(connections.inflows.len(), 3);
    assert_eq!(connections.outflows[0], (NodeId(5), 400.0));
    assert_eq!(connections.outflows.len(), 5);

    // Clicking the focused node again dismisses the selection.
    session.focus_node(hospitals);
    assert!(session.selection().is_idle());
}
