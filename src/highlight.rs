use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::flow::{FlowGraph, NodeId};

/// Focus state the rendering layer consults. Replaced wholesale on every
/// user selection event; cleared on dismiss.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Idle,
    Focused(BTreeSet<NodeId>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeHighlight {
    Neutral,
    Focused,
    Connected,
    Dimmed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkHighlight {
    Neutral,
    Connected,
    Dimmed,
}

/// Classification of every node and link in the active graph under the
/// current selection. Link classes are parallel to `graph.links()`.
#[derive(Clone, Debug)]
pub struct HighlightPartition {
    pub nodes: BTreeMap<NodeId, NodeHighlight>,
    pub links: Vec<LinkHighlight>,
}

impl Selection {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn focused(&self) -> Option<&BTreeSet<NodeId>> {
        match self {
            Self::Idle => None,
            Self::Focused(set) => Some(set),
        }
    }

    /// The focused node when exactly one is focused.
    pub fn single_focus(&self) -> Option<NodeId> {
        match self.focused() {
            Some(set) if set.len() == 1 => set.first().copied(),
            _ => None,
        }
    }

    /// Focuses one node. Clicking the already-focused node clears the
    /// focus; a ref unknown to the active graph also leaves nothing
    /// focused, with a warning.
    pub fn focus(&mut self, graph: &FlowGraph, id: NodeId) {
        if self.single_focus() == Some(id) {
            *self = Self::Idle;
            return;
        }
        if !graph.contains(id) {
            warn!(%id, "focus target not in the active graph");
            *self = Self::Idle;
            return;
        }
        *self = Self::Focused(BTreeSet::from([id]));
    }

    /// Focuses a story's node set. Refs unknown to the active graph are
    /// dropped; an empty remainder clears the focus.
    pub fn focus_set(&mut self, graph: &FlowGraph, ids: &[NodeId]) {
        let mut set = BTreeSet::new();
        for &id in ids {
            if graph.contains(id) {
                set.insert(id);
            } else {
                warn!(%id, "story node not in the active graph, skipping");
            }
        }
        if set.is_empty() {
            warn!("selection resolved to no nodes");
            *self = Self::Idle;
        } else {
            *self = Self::Focused(set);
        }
    }

    pub fn clear(&mut self) {
        *self = Self::Idle;
    }

    /// Drops focused refs the graph no longer contains; back to `Idle` when
    /// none survive. Used after the active graph is swapped.
    pub fn retain_known(&mut self, graph: &FlowGraph) {
        if let Self::Focused(set) = self {
            set.retain(|&id| graph.contains(id));
            if set.is_empty() {
                *self = Self::Idle;
            }
        }
    }

    /// Derives the {focused, connected, dimmed} partition. `Idle` leaves
    /// everything neutral, no dimming.
    pub fn partition(&self, graph: &FlowGraph) -> HighlightPartition {
        let Self::Focused(focused) = self else {
            return HighlightPartition {
                nodes: graph
                    .nodes()
                    .map(|node| (node.id, NodeHighlight::Neutral))
                    .collect(),
                links: vec![LinkHighlight::Neutral; graph.link_count()],
            };
        };

        let mut connected = BTreeSet::new();
        let mut links = Vec::with_capacity(graph.link_count());
        for link in graph.links() {
            let touches = focused.contains(&link.source) || focused.contains(&link.target);
            if touches {
                connected.insert(link.source);
                connected.insert(link.target);
                links.push(LinkHighlight::Connected);
            } else {
                links.push(LinkHighlight::Dimmed);
            }
        }

        let nodes = graph
            .nodes()
            .map(|node| {
                let class = if focused.contains(&node.id) {
                    NodeHighlight::Focused
                } else if connected.contains(&node.id) {
                    NodeHighlight::Connected
                } else {
                    NodeHighlight::Dimmed
                };
                (node.id, class)
            })
            .collect();

        HighlightPartition { nodes, links }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{Link, Node};

    fn graph() -> FlowGraph {
        let nodes = ["A", "B", "C", "D"]
            .iter()
            .enumerate()
            .map(|(i, name)| Node {
                id: NodeId(i as u32 + 1),
                name: name.to_string(),
                notes: None,
            })
            .collect();
        let links = vec![
            Link {
                source: NodeId(1),
                target: NodeId(3),
                value: 100.0,
            },
            Link {
                source: NodeId(2),
                target: NodeId(3),
                value: 50.0,
            },
        ];
        FlowGraph::load(nodes, links).expect("valid dataset")
    }

    #[test]
    fn focus_toggles_off_on_second_click() {
        let graph = graph();
        let mut selection = Selection::default();
        selection.focus(&graph, NodeId(3));
        assert_eq!(selection.single_focus(), Some(NodeId(3)));
        selection.focus(&graph, NodeId(3));
        assert!(selection.is_idle());
    }

    #[test]
    fn focus_moves_to_a_different_node() {
        let graph = graph();
        let mut selection = Selection::default();
        selection.focus(&graph, NodeId(3));
        selection.focus(&graph, NodeId(1));
        assert_eq!(selection.single_focus(), Some(NodeId(1)));
    }

    #[test]
    fn unknown_focus_leaves_nothing_focused() {
        let graph = graph();
        let mut selection = Selection::default();
        selection.focus(&graph, NodeId(1));
        selection.focus(&graph, NodeId(42));
        assert!(selection.is_idle());
    }

    #[test]
    fn partition_classifies_focused_connected_dimmed() {
        let graph = graph();
        let mut selection = Selection::default();
        selection.focus(&graph, NodeId(3));

        let partition = selection.partition(&graph);
        assert_eq!(partition.nodes[&NodeId(3)], NodeHighlight::Focused);
        assert_eq!(partition.nodes[&NodeId(1)], NodeHighlight::Connected);
        assert_eq!(partition.nodes[&NodeId(2)], NodeHighlight::Connected);
        assert_eq!(partition.nodes[&NodeId(4)], NodeHighlight::Dimmed);
        assert_eq!(
            partition.links,
            vec![LinkHighlight::Connected, LinkHighlight::Connected]
        );
    }

    #[test]
    fn idle_partition_is_all_neutral() {
        let graph = graph();
        let partition = Selection::default().partition(&graph);
        assert!(
            partition
                .nodes
                .values()
                .all(|&class| class == NodeHighlight::Neutral)
        );
        assert!(
            partition
                .links
                .iter()
                .all(|&class| class == LinkHighlight::Neutral)
        );
    }

    #[test]
    fn story_focus_keeps_known_refs_only() {
        let graph = graph();
        let mut selection = Selection::default();
        selection.focus_set(&graph, &[NodeId(1), NodeId(2), NodeId(42)]);
        assert_eq!(
            selection.focused(),
            Some(&BTreeSet::from([NodeId(1), NodeId(2)]))
        );

        selection.focus_set(&graph, &[NodeId(42)]);
        assert!(selection.is_idle());
    }

    #[test]
    fn multi_focus_links_between_focused_nodes_stay_connected() {
        let graph = graph();
        let mut selection = Selection::default();
        selection.focus_set(&graph, &[NodeId(1), NodeId(3)]);
        let partition = selection.partition(&graph);
        // Both links touch a focused node.
        assert_eq!(
            partition.links,
            vec![LinkHighlight::Connected, LinkHighlight::Connected]
        );
        assert_eq!(partition.nodes[&NodeId(2)], NodeHighlight::Connected);
    }

    #[test]
    fn retain_known_drops_vanished_refs() {
        let graph = graph();
        let mut selection = Selection::default();
        selection.focus_set(&graph, &[NodeId(1), NodeId(2)]);

        let smaller = FlowGraph::load(
            vec![Node {
                id: NodeId(1),
                name: "A".to_string(),
                notes: None,
            }],
            Vec::new(),
        )
        .expect("valid dataset");

        selection.retain_known(&smaller);
        assert_eq!(selection.focused(), Some(&BTreeSet::from([NodeId(1)])));
    }
}
