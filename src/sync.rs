//! One-directional synchronization between a project record and the canvas.
//!
//! Each pass compares before writing and reports whether it changed
//! anything; a pass that finds the two sides equal writes nothing, so
//! alternating passes always reach a fixed point.

use crate::canvas::Canvas;
use crate::diagram::{DiagramEdge, DiagramNode, NodeData, project_data};
use crate::model::{Project, ProjectLink, ProjectNode};
use log::{debug, warn};

const MAX_PASSES: usize = 8;

/// Domain nodes to canvas: appends missing nodes, patches changed data and
/// drops nodes that left the domain. Area nodes are not part of the diff.
pub fn sync_nodes_to_canvas(domain: &[ProjectNode], canvas_nodes: &mut Vec<DiagramNode>) -> bool {
    let missing: Vec<DiagramNode> = domain
        .iter()
        .filter(|node| !canvas_nodes.iter().any(|n| !n.is_area() && n.id == node.id))
        .map(DiagramNode::project)
        .collect();
    let mut changed = 0usize;
    for canvas_node in canvas_nodes.iter_mut().filter(|n| !n.is_area()) {
        let Some(node) = domain.iter().find(|node| node.id == canvas_node.id) else {
            continue;
        };
        let data = NodeData::ProjectNode(project_data(node));
        if canvas_node.data != data {
            canvas_node.data = data;
            // The old footprint no longer matches the content.
            canvas_node.measured = None;
            changed += 1;
        }
    }
    let before = canvas_nodes.len();
    canvas_nodes.retain(|n| n.is_area() || domain.iter().any(|node| node.id == n.id));
    let removed = before - canvas_nodes.len();
    let added = missing.len();
    canvas_nodes.extend(missing);

    if added + changed + removed == 0 {
        return false;
    }
    debug!("nodes -> canvas: {added} added, {changed} changed, {removed} removed");
    true
}

/// Canvas nodes to domain: rebuilds the node list from canvas positions and
/// data, writing only when it differs from the current list.
pub fn sync_canvas_to_domain(canvas_nodes: &[DiagramNode], domain: &mut Vec<ProjectNode>) -> bool {
    let current: Vec<ProjectNode> = canvas_nodes
        .iter()
        .filter_map(DiagramNode::to_project_node)
        .collect();
    if *domain == current {
        return false;
    }
    debug!("canvas -> nodes: {} nodes", current.len());
    *domain = current;
    true
}

pub fn sync_links_to_canvas(links: &[ProjectLink], edges: &mut Vec<DiagramEdge>) -> bool {
    if links_equal(links, edges) {
        return false;
    }
    debug!("links -> canvas: {} edges", links.len());
    *edges = links.iter().map(DiagramEdge::from_link).collect();
    true
}

pub fn sync_canvas_to_links(edges: &[DiagramEdge], links: &mut Vec<ProjectLink>) -> bool {
    if links_equal(links, edges) {
        return false;
    }
    debug!("canvas -> links: {} links", edges.len());
    *links = edges.iter().map(DiagramEdge::to_link).collect();
    true
}

fn links_equal(links: &[ProjectLink], edges: &[DiagramEdge]) -> bool {
    links.len() == edges.len() && links.iter().zip(edges).all(|(link, edge)| *link == edge.to_link())
}

/// Which side was edited last, and so is authoritative for the next pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Domain,
    Canvas,
}

/// Runs alternating passes starting from `origin` until neither side
/// changes. Returns the number of passes that changed state.
pub fn reconcile(project: &mut Project, canvas: &mut Canvas, origin: Origin) -> usize {
    let mut changes = 0;
    let mut side = origin;
    let mut idle_passes = 0;
    for _ in 0..MAX_PASSES {
        let changed = match side {
            Origin::Domain => {
                let nodes = sync_nodes_to_canvas(&project.nodes, &mut canvas.nodes);
                let links = sync_links_to_canvas(&project.links, &mut canvas.edges);
                nodes || links
            }
            Origin::Canvas => {
                let nodes = sync_canvas_to_domain(&canvas.nodes, &mut project.nodes);
                let links = sync_canvas_to_links(&canvas.edges, &mut project.links);
                nodes || links
            }
        };
        if changed {
            changes += 1;
            idle_passes = 0;
        } else {
            idle_passes += 1;
            if idle_passes == 2 {
                break;
            }
        }
        side = match side {
            Origin::Domain => Origin::Canvas,
            Origin::Canvas => Origin::Domain,
        };
    }
    let dangling = project.dangling_links().len();
    if dangling > 0 {
        warn!("project {} has {dangling} dangling links", project.id);
    }
    changes
}
