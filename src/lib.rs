pub mod error;
pub mod flow;
pub mod highlight;
pub mod ingest;
pub mod session;
pub mod story;
pub mod util;
pub mod view;

pub use error::ValidationError;
pub use flow::{DirectConnections, FlowGraph, Group, Link, Node, NodeFlows, NodeId, project};
pub use highlight::{HighlightPartition, LinkHighlight, NodeHighlight, Selection};
pub use ingest::{Dataset, load_dataset};
pub use session::Session;
pub use story::{Story, StoryChart};
pub use view::{FlowView, ViewSnapshot};
