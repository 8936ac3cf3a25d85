use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::flow::{Group, Link, Node, NodeId};
use crate::story::{ChartDirection, ChartSection, Story, StoryChart};

/// A fully materialized dataset directory: the required node/link files plus
/// the optional grouping and story configs. Values arrive as the currency
/// strings the CSV converter emits; everything is resolved to canonical ids
/// and plain magnitudes here, before the store ever sees it.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub groups: Vec<Group>,
    pub stories: Vec<Story>,
}

pub fn load_dataset(dir: &Path) -> Result<Dataset> {
    let nodes_path = dir.join("nodes.json");
    let nodes_raw = std::fs::read_to_string(&nodes_path)
        .with_context(|| format!("failed to read {}", nodes_path.display()))?;
    let nodes = parse_nodes(&nodes_raw)
        .with_context(|| format!("failed to parse {}", nodes_path.display()))?;

    let links_path = dir.join("links.json");
    let links_raw = std::fs::read_to_string(&links_path)
        .with_context(|| format!("failed to read {}", links_path.display()))?;
    let links = parse_links(&links_raw)
        .with_context(|| format!("failed to parse {}", links_path.display()))?;

    let groups = match read_optional(&dir.join("groups.json"))? {
        Some(raw) => parse_groups(&raw).context("failed to parse groups.json")?,
        None => Vec::new(),
    };
    let stories = match read_optional(&dir.join("stories.json"))? {
        Some(raw) => parse_stories(&raw).context("failed to parse stories.json")?,
        None => Vec::new(),
    };

    Ok(Dataset {
        nodes,
        links,
        groups,
        stories,
    })
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
    }
}

// The CSV-to-JSON converter stringifies every cell; hand-written configs use
// plain numbers. Both spellings show up in shipped data files.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum RawRef {
    Number(u32),
    Text(String),
}

impl RawRef {
    fn resolve(&self) -> Option<NodeId> {
        match self {
            Self::Number(id) => Some(NodeId(*id)),
            Self::Text(text) => text.trim().parse().ok().map(NodeId),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

impl RawAmount {
    fn resolve(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => parse_amount(text),
        }
    }
}

/// Accepts the currency spellings observed in the data files: "1,000",
/// "$1,000.5B", "200M". The unit suffix is display noise; the magnitude is
/// what the engine stores.
fn parse_amount(raw: &str) -> Option<f64> {
    let mut text = raw.trim().strip_prefix('$').unwrap_or(raw.trim());
    text = text
        .strip_suffix(['B', 'b', 'M', 'm'])
        .unwrap_or(text)
        .trim();
    let cleaned = text.replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "ID")]
    id: RawRef,
    #[serde(default, rename = "Notes")]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLink {
    #[serde(rename = "From ID")]
    from: RawRef,
    #[serde(rename = "To ID")]
    to: RawRef,
    #[serde(rename = "Amount (B$)")]
    amount: RawAmount,
}

pub fn parse_nodes(raw: &str) -> Result<Vec<Node>> {
    let records: Vec<RawNode> = serde_json::from_str(raw).context("invalid node records")?;
    let mut nodes = Vec::with_capacity(records.len());
    let mut seen_ids = std::collections::HashSet::with_capacity(records.len());

    for record in records {
        let Some(id) = record.id.resolve() else {
            warn!(name = %record.name, "node record has an unparseable id, dropping");
            continue;
        };
        if !seen_ids.insert(id) {
            warn!(name = %record.name, %id, "node record reuses an id, dropping");
            continue;
        }
        let notes = record
            .notes
            .map(|notes| notes.trim().to_string())
            .filter(|notes| !notes.is_empty());
        nodes.push(Node {
            id,
            name: record.name.trim().to_string(),
            notes,
        });
    }

    Ok(nodes)
}

/// Record-level tolerance: a link whose refs or amount do not parse is
/// dropped with a warning. Structural strictness (dangling ids, negative
/// values) stays with `FlowGraph::load`.
pub fn parse_links(raw: &str) -> Result<Vec<Link>> {
    let records: Vec<RawLink> = serde_json::from_str(raw).context("invalid link records")?;
    let mut links = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let (Some(source), Some(target)) = (record.from.resolve(), record.to.resolve()) else {
            warn!(index, "link record has an unparseable endpoint, dropping");
            continue;
        };
        let Some(value) = record.amount.resolve() else {
            warn!(index, %source, %target, "link record has an unparseable amount, dropping");
            continue;
        };
        if value == 0.0 {
            debug!(index, %source, %target, "zero-value link filtered");
            continue;
        }
        links.push(Link {
            source,
            target,
            value,
        });
    }

    Ok(links)
}

#[derive(Debug, Deserialize)]
struct RawGroupFile {
    groups: Vec<RawGroup>,
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    name: String,
    nodes: Vec<RawRef>,
}

pub fn parse_groups(raw: &str) -> Result<Vec<Group>> {
    let file: RawGroupFile = serde_json::from_str(raw).context("invalid group config")?;
    Ok(file
        .groups
        .into_iter()
        .map(|group| Group {
            members: resolve_refs(&group.nodes, &group.name),
            name: group.name,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct RawStoryFile {
    stories: Vec<RawStory>,
}

#[derive(Debug, Deserialize)]
struct RawStory {
    title: String,
    #[serde(default)]
    description: String,
    nodes: Vec<RawRef>,
    #[serde(default, rename = "barCharts")]
    bar_charts: Vec<RawStoryChart>,
}

#[derive(Debug, Deserialize)]
struct RawStoryChart {
    #[serde(default)]
    title: Option<String>,
    direction: String,
    sections: Vec<RawChartSection>,
}

#[derive(Debug, Deserialize)]
struct RawChartSection {
    label: String,
    nodes: Vec<RawRef>,
}

pub fn parse_stories(raw: &str) -> Result<Vec<Story>> {
    let file: RawStoryFile = serde_json::from_str(raw).context("invalid story config")?;
    let mut stories = Vec::with_capacity(file.stories.len());

    for story in file.stories {
        let mut charts = Vec::with_capacity(story.bar_charts.len());
        for chart in story.bar_charts {
            let direction = match chart.direction.as_str() {
                "in" => ChartDirection::In,
                "out" => ChartDirection::Out,
                other => {
                    warn!(story = %story.title, direction = %other, "unknown chart direction, dropping chart");
                    continue;
                }
            };
            charts.push(StoryChart {
                title: chart.title,
                direction,
                sections: chart
                    .sections
                    .into_iter()
                    .map(|section| ChartSection {
                        nodes: resolve_refs(&section.nodes, &section.label),
                        label: section.label,
                    })
                    .collect(),
            });
        }

        stories.push(Story {
            nodes: resolve_refs(&story.nodes, &story.title),
            title: story.title,
            description: story.description,
            charts,
        });
    }

    Ok(stories)
}

fn resolve_refs(refs: &[RawRef], owner: &str) -> Vec<NodeId> {
    refs.iter()
        .filter_map(|raw| {
            let id = raw.resolve();
            if id.is_none() {
                warn!(owner = %owner, "unparseable node ref, dropping");
            }
            id
        })
        .collect()
}
