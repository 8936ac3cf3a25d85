mod graph;
mod project;

pub use graph::{DirectConnections, FlowGraph, Link, Node, NodeFlows, NodeId};
pub use project::{Group, ProjectedGraph, project};
