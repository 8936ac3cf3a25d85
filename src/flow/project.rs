use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use super::graph::{FlowGraph, Link, Node, NodeId};

#[derive(Clone, Debug)]
pub struct Group {
    pub name: String,
    pub members: Vec<NodeId>,
}

/// A graph collapsed under a group overlay. Group nodes replace their
/// members, internal links vanish, cross-group links merge.
#[derive(Clone, Debug)]
pub struct ProjectedGraph {
    graph: FlowGraph,
    membership: HashMap<NodeId, NodeId>,
    group_ids: BTreeMap<NodeId, String>,
    internal_value: f64,
}

impl ProjectedGraph {
    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    /// Total value of the internal links dropped by the projection.
    /// `graph().total_value() + internal_value()` equals the base total.
    pub fn internal_value(&self) -> f64 {
        self.internal_value
    }

    /// The group node a member was collapsed into, if any.
    pub fn group_of(&self, member: NodeId) -> Option<NodeId> {
        self.membership.get(&member).copied()
    }

    pub fn group_ids(&self) -> impl Iterator<Item = NodeId> {
        self.group_ids.keys().copied()
    }

    pub fn is_group_node(&self, id: NodeId) -> bool {
        self.group_ids.contains_key(&id)
    }
}

/// Collapses `base` under `groups`. Pure: neither input is mutated.
///
/// Group nodes get fresh ids above the highest raw id, so raw ids stay
/// stable across the transform. A member id that does not resolve, or that
/// a second group claims, is skipped with a warning (first group wins).
pub fn project(base: &FlowGraph, groups: &[Group]) -> ProjectedGraph {
    let mut next_id = base.max_node_id().0 + 1;
    let mut membership: HashMap<NodeId, NodeId> = HashMap::new();
    let mut group_ids = BTreeMap::new();
    let mut group_nodes = Vec::with_capacity(groups.len());

    for group in groups {
        let group_id = NodeId(next_id);
        next_id += 1;

        let mut claimed = 0usize;
        for &member in &group.members {
            if !base.contains(member) {
                warn!(group = %group.name, id = %member, "group member not in dataset, skipping");
                continue;
            }
            match membership.entry(member) {
                std::collections::hash_map::Entry::Occupied(_) => {
                    warn!(
                        group = %group.name,
                        id = %member,
                        "node already claimed by another group, keeping first"
                    );
                }
                std::collections::hash_map::Entry::Vacant(entry) => {
                    entry.insert(group_id);
                    claimed += 1;
                }
            }
        }

        if claimed == 0 {
            warn!(group = %group.name, "group has no resolvable members, dropping");
            continue;
        }

        group_ids.insert(group_id, group.name.clone());
        group_nodes.push(Node {
            id: group_id,
            name: group.name.clone(),
            notes: None,
        });
    }

    let mut merged: BTreeMap<(NodeId, NodeId), f64> = BTreeMap::new();
    let mut internal_value = 0.0;

    for link in base.links() {
        let source_group = membership.get(&link.source).copied();
        let target_group = membership.get(&link.target).copied();

        // A link between two members of the same group nets to zero
        // external flow.
        if let (Some(sg), Some(tg)) = (source_group, target_group)
            && sg == tg
        {
            internal_value += link.value;
            continue;
        }

        let source = source_group.unwrap_or(link.source);
        let target = target_group.unwrap_or(link.target);
        *merged.entry((source, target)).or_insert(0.0) += link.value;
    }

    let mut nodes = base
        .nodes()
        .filter(|node| !membership.contains_key(&node.id))
        .cloned()
        .collect::<Vec<_>>();
    nodes.extend(group_nodes);

    let links = merged
        .into_iter()
        .map(|((source, target), value)| Link {
            source,
            target,
            value,
        })
        .collect::<Vec<_>>();

    ProjectedGraph {
        graph: FlowGraph::from_parts(nodes, links),
        membership,
        group_ids,
        internal_value,
    }
}
