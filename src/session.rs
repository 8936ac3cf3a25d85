use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use tracing::warn;

use crate::error::ValidationError;
use crate::flow::{FlowGraph, Group, NodeId};
use crate::highlight::Selection;
use crate::ingest::Dataset;
use crate::story::Story;
use crate::view::{FlowView, ViewSnapshot};

/// The owned application state for one dashboard session: the flow view,
/// the grouping overlay, the story list, and the current selection. Every
/// state change goes through a method here; the rendering layer only ever
/// pulls `snapshot()`.
pub struct Session {
    view: FlowView,
    groups: Vec<Group>,
    stories: Vec<Story>,
    selection: Selection,
    selected_story: Option<usize>,
}

impl Session {
    /// Validates the dataset and installs it. Fails atomically: on error no
    /// session exists at all.
    pub fn new(dataset: Dataset) -> Result<Self, ValidationError> {
        let graph = FlowGraph::load(dataset.nodes, dataset.links)?;
        Ok(Self {
            view: FlowView::Raw(graph),
            groups: dataset.groups,
            stories: dataset.stories,
            selection: Selection::Idle,
            selected_story: None,
        })
    }

    pub fn graph(&self) -> &FlowGraph {
        self.view.active()
    }

    pub fn view(&self) -> &FlowView {
        &self.view
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_story(&self) -> Option<&Story> {
        self.selected_story.and_then(|index| self.stories.get(index))
    }

    pub fn is_grouped(&self) -> bool {
        self.view.is_grouped()
    }

    /// Switches between the raw and projected views. The active node set
    /// changes wholesale, so the selection resets with it.
    pub fn set_grouped(&mut self, grouped: bool) {
        if grouped == self.view.is_grouped() {
            return;
        }
        let view = std::mem::take(&mut self.view);
        self.view = view.with_grouping(&self.groups, grouped);
        self.selection.clear();
        self.selected_story = None;
    }

    pub fn focus_node(&mut self, id: NodeId) {
        self.selected_story = None;
        self.selection.focus(self.view.active(), id);
    }

    /// Resolves a display name to a node and focuses it: exact match first,
    /// then the best fuzzy match, the way the dashboard's search box works.
    pub fn focus_by_name(&mut self, name: &str) -> Option<NodeId> {
        let id = self.resolve_name(name);
        match id {
            Some(id) => self.focus_node(id),
            None => warn!(name, "no node matches that name"),
        }
        id
    }

    pub fn resolve_name(&self, name: &str) -> Option<NodeId> {
        let graph = self.view.active();
        if let Some(node) = graph.node_by_name(name) {
            return Some(node.id);
        }

        let matcher = SkimMatcherV2::default();
        graph
            .nodes()
            .filter_map(|node| fuzzy_match_score(&matcher, &node.name, name).map(|s| (s, node.id)))
            .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(&a.1)))
            .map(|(_, id)| id)
    }

    pub fn select_story(&mut self, index: usize) {
        let Some(story) = self.stories.get(index) else {
            warn!(index, "no story at that index");
            self.selected_story = None;
            self.selection.clear();
            return;
        };
        self.selected_story = Some(index);
        self.selection.focus_set(self.view.active(), &story.nodes);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.selected_story = None;
    }

    /// The renderer pull contract: recomputed from current state on every
    /// call, so a superseded re-render just derives the same view again.
    pub fn snapshot(&self) -> ViewSnapshot<'_> {
        let graph = self.view.active();
        ViewSnapshot {
            nodes: graph.nodes().collect(),
            links: graph.links(),
            flows: graph.flows_by_node(),
            partition: self.selection.partition(graph),
            story: self.selected_story(),
            grouped: self.view.is_grouped(),
        }
    }
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}
