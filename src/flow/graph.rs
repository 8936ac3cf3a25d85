use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::error::{Endpoint, ValidationError};

/// Canonical node reference. Dataset-defined (1-based ids in the shipped
/// files); positional indices from legacy link files never survive ingestion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub notes: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
    pub source: NodeId,
    pub target: NodeId,
    pub value: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeFlows {
    pub inflow: f64,
    pub outflow: f64,
}

impl NodeFlows {
    /// Headline flow through a node: max of the two sides, so a pure
    /// pass-through node is not double-counted.
    pub fn total(self) -> f64 {
        self.inflow.max(self.outflow)
    }
}

#[derive(Clone, Debug, Default)]
pub struct DirectConnections {
    pub inflows: Vec<(NodeId, f64)>,
    pub outflows: Vec<(NodeId, f64)>,
}

/// The canonical node/link dataset. Immutable once loaded; every derived
/// view (projection, highlight partition, snapshot) reads from it.
#[derive(Clone, Debug, Default)]
pub struct FlowGraph {
    nodes: BTreeMap<NodeId, Node>,
    links: Vec<Link>,
}

impl FlowGraph {
    /// Validates and installs a dataset. Atomic: the first violation aborts
    /// the whole load and no graph is produced.
    pub fn load(nodes: Vec<Node>, links: Vec<Link>) -> Result<Self, ValidationError> {
        let mut seen_names = HashSet::with_capacity(nodes.len());
        for node in &nodes {
            if !seen_names.insert(node.name.as_str()) {
                return Err(ValidationError::DuplicateName {
                    name: node.name.clone(),
                });
            }
        }

        let mut known_ids = HashSet::with_capacity(nodes.len());
        for node in &nodes {
            if !known_ids.insert(node.id) {
                return Err(ValidationError::DuplicateId { id: node.id });
            }
        }

        for link in &links {
            if !known_ids.contains(&link.source) {
                return Err(ValidationError::DanglingReference {
                    endpoint: Endpoint::Source,
                    id: link.source,
                });
            }
            if !known_ids.contains(&link.target) {
                return Err(ValidationError::DanglingReference {
                    endpoint: Endpoint::Target,
                    id: link.target,
                });
            }
            if !link.value.is_finite() || link.value < 0.0 {
                return Err(ValidationError::InvalidValue {
                    source_id: link.source,
                    target_id: link.target,
                    value: link.value,
                });
            }
        }

        Ok(Self::from_parts(nodes, links))
    }

    /// Assembles a graph from parts that are already known to satisfy the
    /// load invariants (projection output, test fixtures).
    pub(crate) fn from_parts(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        let nodes = nodes
            .into_iter()
            .map(|node| (node.id, node))
            .collect::<BTreeMap<_, _>>();
        Self { nodes, links }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.values().find(|node| node.name == name)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn total_value(&self) -> f64 {
        self.links.iter().map(|link| link.value).sum()
    }

    pub fn inflow(&self, id: NodeId) -> f64 {
        self.links
            .iter()
            .filter(|link| link.target == id)
            .map(|link| link.value)
            .sum()
    }

    pub fn outflow(&self, id: NodeId) -> f64 {
        self.links
            .iter()
            .filter(|link| link.source == id)
            .map(|link| link.value)
            .sum()
    }

    pub fn total_flow(&self, id: NodeId) -> f64 {
        self.inflow(id).max(self.outflow(id))
    }

    /// Both flow sides for every node in one pass over the link set.
    pub fn flows_by_node(&self) -> BTreeMap<NodeId, NodeFlows> {
        let mut flows = self
            .nodes
            .keys()
            .map(|&id| (id, NodeFlows::default()))
            .collect::<BTreeMap<_, _>>();

        for link in &self.links {
            if let Some(entry) = flows.get_mut(&link.source) {
                entry.outflow += link.value;
            }
            if let Some(entry) = flows.get_mut(&link.target) {
                entry.inflow += link.value;
            }
        }

        flows
    }

    /// Nodes that only emit flow, ranked by descending outflow.
    pub fn sources(&self) -> Vec<&Node> {
        self.ranked_endpoints(|flows| flows.inflow == 0.0 && flows.outflow > 0.0, |f| f.outflow)
    }

    /// Nodes that only receive flow, ranked by descending inflow.
    pub fn sinks(&self) -> Vec<&Node> {
        self.ranked_endpoints(|flows| flows.outflow == 0.0 && flows.inflow > 0.0, |f| f.inflow)
    }

    fn ranked_endpoints(
        &self,
        keep: impl Fn(NodeFlows) -> bool,
        rank: impl Fn(NodeFlows) -> f64,
    ) -> Vec<&Node> {
        let flows = self.flows_by_node();
        let mut ranked = self
            .nodes
            .values()
            .filter_map(|node| {
                let node_flows = flows.get(&node.id).copied().unwrap_or_default();
                keep(node_flows).then(|| (rank(node_flows), node))
            })
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id)));
        ranked.into_iter().map(|(_, node)| node).collect()
    }

    /// One-hop neighbors of a focused node, each side ranked by descending
    /// value. Replaces the global sources/sinks view while a single node is
    /// focused.
    pub fn direct_connections(&self, id: NodeId) -> DirectConnections {
        let mut connections = DirectConnections::default();
        for link in &self.links {
            if link.target == id {
                connections.inflows.push((link.source, link.value));
            }
            if link.source == id {
                connections.outflows.push((link.target, link.value));
            }
        }
        connections
            .inflows
            .sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        connections
            .outflows
            .sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        connections
    }

    /// Total flow into a node set. Links from inside the set count too; the
    /// story charts in the original dashboard sum them that way.
    pub fn inflow_to_set(&self, set: &BTreeSet<NodeId>) -> f64 {
        self.links
            .iter()
            .filter(|link| set.contains(&link.target))
            .map(|link| link.value)
            .sum()
    }

    pub fn outflow_from_set(&self, set: &BTreeSet<NodeId>) -> f64 {
        self.links
            .iter()
            .filter(|link| set.contains(&link.source))
            .map(|link| link.value)
            .sum()
    }

    pub fn max_node_id(&self) -> NodeId {
        self.nodes.keys().next_back().copied().unwrap_or_default()
    }
}
