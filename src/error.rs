use crate::flow::NodeId;

/// Fatal dataset problems. A `load` that hits one of these installs nothing.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("duplicate node name: {name:?}")]
    DuplicateName { name: String },

    #[error("duplicate node id: {id}")]
    DuplicateId { id: NodeId },

    #[error("link {endpoint} references unknown node id {id}")]
    DanglingReference { endpoint: Endpoint, id: NodeId },

    #[error("link {source_id} -> {target_id} has invalid value {value}")]
    InvalidValue {
        source_id: NodeId,
        target_id: NodeId,
        value: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Target,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}
