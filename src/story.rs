use std::collections::BTreeSet;

use crate::flow::{FlowGraph, NodeId};

/// Externally authored narrative entry. Selecting a story focuses its node
/// set; the rest is display content.
#[derive(Clone, Debug)]
pub struct Story {
    pub title: String,
    pub description: String,
    pub nodes: Vec<NodeId>,
    pub charts: Vec<StoryChart>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartDirection {
    In,
    Out,
}

#[derive(Clone, Debug)]
pub struct ChartSection {
    pub label: String,
    pub nodes: Vec<NodeId>,
}

#[derive(Clone, Debug)]
pub struct StoryChart {
    pub title: Option<String>,
    pub direction: ChartDirection,
    pub sections: Vec<ChartSection>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SectionTotal {
    pub label: String,
    pub value: f64,
}

impl StoryChart {
    /// Per-section flow totals over the given graph's link set.
    pub fn section_totals(&self, graph: &FlowGraph) -> Vec<SectionTotal> {
        self.sections
            .iter()
            .map(|section| {
                let set = section.nodes.iter().copied().collect::<BTreeSet<_>>();
                let value = match self.direction {
                    ChartDirection::In => graph.inflow_to_set(&set),
                    ChartDirection::Out => graph.outflow_from_set(&set),
                };
                SectionTotal {
                    label: section.label.clone(),
                    value,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{Link, Node};

    #[test]
    fn section_totals_follow_chart_direction() {
        let nodes = vec![
            Node {
                id: NodeId(1),
                name: "Employers".to_string(),
                notes: None,
            },
            Node {
                id: NodeId(2),
                name: "Hospitals".to_string(),
                notes: None,
            },
            Node {
                id: NodeId(3),
                name: "Physicians".to_string(),
                notes: None,
            },
        ];
        let links = vec![
            Link {
                source: NodeId(1),
                target: NodeId(2),
                value: 1000.0,
            },
            Link {
                source: NodeId(2),
                target: NodeId(3),
                value: 400.0,
            },
        ];
        let graph = FlowGraph::load(nodes, links).expect("valid dataset");

        let chart = StoryChart {
            title: None,
            direction: ChartDirection::In,
            sections: vec![
                ChartSection {
                    label: "Hospitals".to_string(),
                    nodes: vec![NodeId(2)],
                },
                ChartSection {
                    label: "Downstream".to_string(),
                    nodes: vec![NodeId(3)],
                },
            ],
        };
        assert_eq!(
            chart.section_totals(&graph),
            vec![
                SectionTotal {
                    label: "Hospitals".to_string(),
                    value: 1000.0
                },
                SectionTotal {
                    label: "Downstream".to_string(),
                    value: 400.0
                },
            ]
        );

        let out = StoryChart {
            direction: ChartDirection::Out,
            ..chart
        };
        assert_eq!(out.section_totals(&graph)[0].value, 400.0);
    }
}
