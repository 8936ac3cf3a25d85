use std::collections::BTreeMap;

use crate::flow::{FlowGraph, Group, Link, Node, NodeFlows, NodeId, ProjectedGraph, project};
use crate::highlight::HighlightPartition;
use crate::story::Story;

/// Which graph the dashboard is looking at. A tagged variant rather than an
/// `is_grouped` flag: consumers match instead of branching everywhere, and
/// the base dataset rides along untouched while the projection is active.
#[derive(Clone, Debug)]
pub enum FlowView {
    Raw(FlowGraph),
    Projected {
        base: FlowGraph,
        projected: ProjectedGraph,
    },
}

impl Default for FlowView {
    fn default() -> Self {
        Self::Raw(FlowGraph::default())
    }
}

impl FlowView {
    /// The graph consumers should read: the projection when grouping is on,
    /// the raw store otherwise.
    pub fn active(&self) -> &FlowGraph {
        match self {
            Self::Raw(graph) => graph,
            Self::Projected { projected, .. } => projected.graph(),
        }
    }

    pub fn base(&self) -> &FlowGraph {
        match self {
            Self::Raw(graph) => graph,
            Self::Projected { base, .. } => base,
        }
    }

    pub fn projected(&self) -> Option<&ProjectedGraph> {
        match self {
            Self::Raw(_) => None,
            Self::Projected { projected, .. } => Some(projected),
        }
    }

    pub fn is_grouped(&self) -> bool {
        matches!(self, Self::Projected { .. })
    }

    /// Rebuilds the view with grouping on or off. The base dataset is moved,
    /// never re-validated or mutated.
    pub fn with_grouping(self, groups: &[Group], grouped: bool) -> Self {
        let base = match self {
            Self::Raw(graph) => graph,
            Self::Projected { base, .. } => base,
        };
        if grouped {
            let projected = project(&base, groups);
            Self::Projected { base, projected }
        } else {
            Self::Raw(base)
        }
    }
}

/// Everything the rendering layer pulls after a state change: the active
/// node/link sets, per-node flows, the highlight partition, and the selected
/// story's panel content. Derived on demand; holding one does not pin the
/// session.
#[derive(Clone, Debug)]
pub struct ViewSnapshot<'a> {
    pub nodes: Vec<&'a Node>,
    pub links: &'a [Link],
    pub flows: BTreeMap<NodeId, NodeFlows>,
    pub partition: HighlightPartition,
    pub story: Option<&'a Story>,
    pub grouped: bool,
}
