//! Hierarchical auto-layout of a project diagram.
//!
//! Project nodes are ranked by dependency depth and positioned with
//! `dagre_rust`; each node's box is its rendered footprint. When dagre
//! yields no positions the longest-path ranking in [`ranking`] places the
//! nodes rank by rank instead. Area nodes are carried through untouched.

mod ranking;

use crate::config::{CardMetrics, LayoutConfig};
use crate::diagram::{DiagramEdge, DiagramNode, HandleSide, Point, Size};
use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use ranking::{compute_ranks, order_ranks};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutDirection {
    TopToBottom,
    LeftToRight,
}

impl LayoutDirection {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "vertical" | "tb" | "td" | "toptobottom" => Some(Self::TopToBottom),
            "horizontal" | "lr" | "lefttoright" => Some(Self::LeftToRight),
            _ => None,
        }
    }

    fn rankdir(self) -> &'static str {
        match self {
            Self::TopToBottom => "tb",
            Self::LeftToRight => "lr",
        }
    }

    fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftToRight)
    }

    /// Preferred `(target, source)` handle sides for nodes laid out in this direction.
    pub fn handle_sides(self) -> (HandleSide, HandleSide) {
        match self {
            Self::TopToBottom => (HandleSide::Top, HandleSide::Bottom),
            Self::LeftToRight => (HandleSide::Left, HandleSide::Right),
        }
    }
}

/// Converts a layout-engine center to the canvas' top-left anchor.
pub fn anchor_from_center(center: Point, size: Size) -> Point {
    Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0)
}

/// Returns `nodes` with new positions for every project node; `edges` are only read.
pub fn layout_nodes(
    nodes: &[DiagramNode],
    edges: &[DiagramEdge],
    direction: LayoutDirection,
    config: &LayoutConfig,
    metrics: &CardMetrics,
) -> Vec<DiagramNode> {
    let node_ids: Vec<String> = nodes
        .iter()
        .filter(|node| !node.is_area())
        .map(|node| node.id.clone())
        .collect();
    let sizes: HashMap<String, Size> = nodes
        .iter()
        .filter(|node| !node.is_area())
        .map(|node| (node.id.clone(), node.size(metrics)))
        .collect();
    let dependencies = layout_dependencies(&node_ids, edges);

    let centers = match assign_centers_dagre(&node_ids, &dependencies, &sizes, direction, config) {
        Some(centers) => centers,
        None => {
            debug!("dagre produced no positions; using ranked fallback");
            assign_centers_ranked(&node_ids, &dependencies, &sizes, direction, config)
        }
    };

    let (target_side, source_side) = direction.handle_sides();
    nodes
        .iter()
        .map(|node| {
            let mut node = node.clone();
            if let (Some(center), Some(size)) = (centers.get(&node.id), sizes.get(&node.id)) {
                node.position = anchor_from_center(*center, *size);
                node.target_position = Some(target_side);
                node.source_position = Some(source_side);
            }
            node
        })
        .collect()
}

/// Distinct, non-self-loop edges between laid-out nodes, in edge order.
fn layout_dependencies(node_ids: &[String], edges: &[DiagramEdge]) -> Vec<(String, String)> {
    let set: HashSet<&str> = node_ids.iter().map(String::as_str).collect();
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    edges
        .iter()
        .filter(|edge| edge.source != edge.target)
        .filter(|edge| set.contains(edge.source.as_str()) && set.contains(edge.target.as_str()))
        .filter(|edge| seen.insert((edge.source.as_str(), edge.target.as_str())))
        .map(|edge| (edge.source.clone(), edge.target.clone()))
        .collect()
}

fn assign_centers_dagre(
    node_ids: &[String],
    dependencies: &[(String, String)],
    sizes: &HashMap<String, Size>,
    direction: LayoutDirection,
    config: &LayoutConfig,
) -> Option<HashMap<String, Point>> {
    if node_ids.is_empty() {
        return None;
    }

    let mut dagre_graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
        DagreGraph::new(Some(GraphOption {
            directed: Some(true),
            multigraph: Some(false),
            compound: Some(false),
        }));

    let mut graph_config = DagreConfig::default();
    graph_config.rankdir = Some(direction.rankdir().to_string());
    graph_config.nodesep = Some(config.node_spacing);
    graph_config.ranksep = Some(config.rank_spacing);
    graph_config.marginx = Some(config.margin);
    graph_config.marginy = Some(config.margin);
    dagre_graph.set_graph(graph_config);

    for node_id in node_ids {
        let size = sizes.get(node_id).copied().unwrap_or_default();
        let mut node = DagreNode::default();
        node.width = size.width as f32;
        node.height = size.height as f32;
        dagre_graph.set_node(node_id.clone(), Some(node));
    }
    for (from, to) in dependencies {
        let _ = dagre_graph.set_edge(from, to, Some(DagreEdge::default()), None);
    }

    dagre_layout::run_layout(&mut dagre_graph);

    let mut centers = HashMap::new();
    for node_id in node_ids {
        let Some(dagre_node) = dagre_graph.node(node_id) else {
            continue;
        };
        if !dagre_node.x.is_finite() || !dagre_node.y.is_finite() {
            continue;
        }
        centers.insert(
            node_id.clone(),
            Point::new(f64::from(dagre_node.x), f64::from(dagre_node.y)),
        );
    }
    if centers.len() == node_ids.len() {
        Some(centers)
    } else {
        None
    }
}

fn assign_centers_ranked(
    node_ids: &[String],
    dependencies: &[(String, String)],
    sizes: &HashMap<String, Size>,
    direction: LayoutDirection,
    config: &LayoutConfig,
) -> HashMap<String, Point> {
    let ranks = compute_ranks(node_ids, dependencies);
    let max_rank = ranks.values().copied().max().unwrap_or(0);
    let mut rank_nodes: Vec<Vec<String>> = vec![Vec::new(); max_rank + 1];
    for node_id in node_ids {
        let rank = ranks.get(node_id).copied().unwrap_or(0);
        rank_nodes[rank].push(node_id.clone());
    }
    order_ranks(&mut rank_nodes, dependencies, config.order_passes);

    let horizontal = direction.is_horizontal();
    // (main, cross) extents: main runs across ranks, cross along a rank.
    let extents = |id: &String| {
        let size = sizes.get(id).copied().unwrap_or_default();
        if horizontal {
            (size.width, size.height)
        } else {
            (size.height, size.width)
        }
    };
    let node_gap = f64::from(config.node_spacing);
    let rank_gap = f64::from(config.rank_spacing);
    let margin = f64::from(config.margin);

    let widest_rank = rank_nodes
        .iter()
        .map(|bucket| {
            let cross: f64 = bucket.iter().map(|id| extents(id).1).sum();
            cross + node_gap * bucket.len().saturating_sub(1) as f64
        })
        .fold(0.0, f64::max);

    let mut centers = HashMap::new();
    let mut main_cursor = margin;
    for bucket in &rank_nodes {
        let rank_main = bucket.iter().map(|id| extents(id).0).fold(0.0, f64::max);
        let rank_cross: f64 = bucket.iter().map(|id| extents(id).1).sum::<f64>()
            + node_gap * bucket.len().saturating_sub(1) as f64;
        let mut cross_cursor = margin + (widest_rank - rank_cross) / 2.0;
        for id in bucket {
            let (_, cross) = extents(id);
            let main_center = main_cursor + rank_main / 2.0;
            let cross_center = cross_cursor + cross / 2.0;
            let center = if horizontal {
                Point::new(main_center, cross_center)
            } else {
                Point::new(cross_center, main_center)
            };
            centers.insert(id.clone(), center);
            cross_cursor += cross + node_gap;
        }
        main_cursor += rank_main + rank_gap;
    }
    centers
}
