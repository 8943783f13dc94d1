//! Headless diagram canvas: owns the editable node/edge lists and the
//! viewport, and applies gesture events to them.

use crate::config::CardMetrics;
use crate::diagram::{DiagramEdge, DiagramNode, HandleSide, Point, Size};
use crate::model::new_id;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

const MIN_ZOOM: f64 = 0.5;

/// Pan/zoom transform plus pane size; screen = diagram * zoom + (x, y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
            width,
            height,
        }
    }

    /// Diagram-space point shown at the middle of the pane.
    pub fn center(&self) -> Point {
        let scale = 1.0 / self.zoom;
        Point::new(
            -self.x * scale + self.width * scale / 2.0,
            -self.y * scale + self.height * scale / 2.0,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeChange {
    Position {
        id: String,
        position: Point,
        dragging: bool,
    },
    Dimensions {
        id: String,
        size: Size,
    },
    Select {
        id: String,
        selected: bool,
    },
    Remove {
        id: String,
    },
    Add {
        node: DiagramNode,
    },
    Reset {
        node: DiagramNode,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum EdgeChange {
    Select { id: String, selected: bool },
    Remove { id: String },
    Add { edge: DiagramEdge },
    Reset { edge: DiagramEdge },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub source: String,
    pub source_handle: Option<HandleSide>,
    pub target: String,
    pub target_handle: Option<HandleSide>,
}

impl Connection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            source_handle: None,
            target: target.into(),
            target_handle: None,
        }
    }

    pub fn with_handles(mut self, source: HandleSide, target: HandleSide) -> Self {
        self.source_handle = Some(source);
        self.target_handle = Some(target);
        self
    }

    fn edge_id(&self) -> String {
        format!(
            "edge-{}{}-{}{}",
            self.source,
            self.source_handle.map(HandleSide::as_str).unwrap_or(""),
            self.target,
            self.target_handle.map(HandleSide::as_str).unwrap_or("")
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<DiagramEdge>,
    pub viewport: Viewport,
}

impl Canvas {
    pub fn new(nodes: Vec<DiagramNode>, edges: Vec<DiagramEdge>, viewport: Viewport) -> Self {
        Self {
            nodes,
            edges,
            viewport,
        }
    }

    pub fn node(&self, id: &str) -> Option<&DiagramNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut DiagramNode> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&DiagramEdge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    pub fn selected_node_ids(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|node| node.selected)
            .map(|node| node.id.clone())
            .collect()
    }

    pub fn apply_node_changes(&mut self, changes: Vec<NodeChange>) {
        for change in changes {
            match change {
                NodeChange::Position {
                    id,
                    position,
                    dragging,
                } => {
                    if let Some(node) = self.node_mut(&id) {
                        if node.draggable {
                            node.position = position;
                            node.dragging = dragging;
                        }
                    }
                }
                NodeChange::Dimensions { id, size } => {
                    if let Some(node) = self.node_mut(&id) {
                        node.measured = Some(size);
                    }
                }
                NodeChange::Select { id, selected } => {
                    if let Some(node) = self.node_mut(&id) {
                        node.selected = selected;
                    }
                }
                NodeChange::Remove { id } => {
                    self.nodes.retain(|node| node.id != id);
                    // Removing a node drops the edges attached to it.
                    self.edges
                        .retain(|edge| edge.source != id && edge.target != id);
                }
                NodeChange::Add { node } => {
                    if self.node(&node.id).is_none() {
                        self.nodes.push(node);
                    }
                }
                NodeChange::Reset { node } => match self.node_mut(&node.id) {
                    Some(slot) => *slot = node,
                    None => self.nodes.push(node),
                },
            }
        }
    }

    pub fn apply_edge_changes(&mut self, changes: Vec<EdgeChange>) {
        for change in changes {
            match change {
                EdgeChange::Select { id, selected } => {
                    if let Some(edge) = self.edges.iter_mut().find(|edge| edge.id == id) {
                        edge.selected = selected;
                    }
                }
                EdgeChange::Remove { id } => self.edges.retain(|edge| edge.id != id),
                EdgeChange::Add { edge } => {
                    if self.edge(&edge.id).is_none() {
                        self.edges.push(edge);
                    }
                }
                EdgeChange::Reset { edge } => {
                    match self.edges.iter_mut().find(|slot| slot.id == edge.id) {
                        Some(slot) => *slot = edge,
                        None => self.edges.push(edge),
                    }
                }
            }
        }
    }

    /// Adds an edge for a connect gesture. Any handle may act as source or
    /// target; repeating an identical connection adds nothing.
    pub fn connect(&mut self, connection: Connection) -> Option<String> {
        for end in [&connection.source, &connection.target] {
            match self.node(end) {
                Some(node) if node.connectable => {}
                _ => {
                    warn!("rejected connection to non-connectable node `{end}`");
                    return None;
                }
            }
        }
        let base = connection.edge_id();
        let mut id = base.clone();
        let mut suffix = 1;
        while self.edges.iter().any(|edge| edge.id == id) {
            id = format!("{base}-{suffix}");
            suffix += 1;
        }
        let handle = |side: Option<HandleSide>| side.map(|s| s.as_str().to_string());
        let edge = DiagramEdge {
            id: id.clone(),
            source: connection.source,
            target: connection.target,
            source_handle: handle(connection.source_handle),
            target_handle: handle(connection.target_handle),
            selected: false,
        };
        let exists = self.edges.iter().any(|other| {
            other.source == edge.source
                && other.target == edge.target
                && other.source_handle == edge.source_handle
                && other.target_handle == edge.target_handle
        });
        if exists {
            debug!("connection {id} already present");
            return None;
        }
        debug!("connected {} -> {}", edge.source, edge.target);
        self.edges.push(edge);
        Some(id)
    }

    /// Id of the project node a double-click opens for editing.
    pub fn double_click(&self, id: &str) -> Option<String> {
        self.node(id)
            .filter(|node| !node.is_area())
            .map(|node| node.id.clone())
    }

    /// Wraps the selected project nodes in a new area node drawn beneath all others.
    pub fn selection_end(&mut self, selected: &[String], metrics: &CardMetrics, padding: f64) -> Option<String> {
        let (min, max) = self.bounds(
            self.nodes
                .iter()
                .filter(|node| !node.is_area() && selected.contains(&node.id)),
            metrics,
        )?;
        let id = format!("area-{}", new_id());
        let area = DiagramNode::area(
            id.clone(),
            Point::new(min.x - padding, min.y - padding),
            Size::new(max.x - min.x + 2.0 * padding, max.y - min.y + 2.0 * padding),
        );
        debug!("created {id} around {} nodes", selected.len());
        self.nodes.insert(0, area);
        Some(id)
    }

    /// Top-left and bottom-right corners enclosing `nodes` at their rendered size.
    pub fn bounds<'a>(
        &self,
        nodes: impl Iterator<Item = &'a DiagramNode>,
        metrics: &CardMetrics,
    ) -> Option<(Point, Point)> {
        let mut bounds: Option<(Point, Point)> = None;
        for node in nodes {
            let size = node.size(metrics);
            let far = Point::new(node.position.x + size.width, node.position.y + size.height);
            bounds = Some(match bounds {
                None => (node.position, far),
                Some((min, max)) => (
                    Point::new(min.x.min(node.position.x), min.y.min(node.position.y)),
                    Point::new(max.x.max(far.x), max.y.max(far.y)),
                ),
            });
        }
        bounds
    }

    pub fn viewport_center(&self) -> Point {
        self.viewport.center()
    }

    /// Centers every node in the pane, leaving `padding` (fraction of the bounds) around them.
    pub fn fit_view(&mut self, metrics: &CardMetrics, padding: f64, max_zoom: f64) {
        let Some((min, max)) = self.bounds(self.nodes.iter(), metrics) else {
            return;
        };
        let width = (max.x - min.x).max(1.0);
        let height = (max.y - min.y).max(1.0);
        let x_zoom = self.viewport.width / (width * (1.0 + padding));
        let y_zoom = self.viewport.height / (height * (1.0 + padding));
        let zoom = x_zoom.min(y_zoom).clamp(MIN_ZOOM, max_zoom.max(MIN_ZOOM));
        let center = Point::new(min.x + width / 2.0, min.y + height / 2.0);
        self.viewport.zoom = zoom;
        self.viewport.x = self.viewport.width / 2.0 - center.x * zoom;
        self.viewport.y = self.viewport.height / 2.0 - center.y * zoom;
    }
}
