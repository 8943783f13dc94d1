//! Generic graph representation edited by the canvas, and its mapping to
//! project records.

use crate::config::CardMetrics;
use crate::footprint::footprint;
use crate::model::{ExpertiseAreas, Project, ProjectLink, ProjectNode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// One of the four connection handles of a node card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleSide {
    Top,
    Bottom,
    Left,
    Right,
}

impl HandleSide {
    pub const ALL: [HandleSide; 4] = [Self::Top, Self::Bottom, Self::Left, Self::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|side| side.as_str() == token)
    }

    /// Anchor point of this handle on a box at `position` with `size`.
    pub fn anchor(self, position: Point, size: Size) -> Point {
        match self {
            Self::Top => Point::new(position.x + size.width / 2.0, position.y),
            Self::Bottom => Point::new(position.x + size.width / 2.0, position.y + size.height),
            Self::Left => Point::new(position.x, position.y + size.height / 2.0),
            Self::Right => Point::new(position.x + size.width, position.y + size.height / 2.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectNodeData {
    pub name: String,
    pub description: String,
    pub expertise_areas: ExpertiseAreas,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaData {
    pub size: Size,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeData {
    ProjectNode(ProjectNodeData),
    Area(AreaData),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramNode {
    pub id: String,
    pub position: Point,
    pub data: NodeData,
    pub draggable: bool,
    pub connectable: bool,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub dragging: bool,
    /// Footprint reported by the rendering surface, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_position: Option<HandleSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_position: Option<HandleSide>,
}

impl DiagramNode {
    pub fn project(node: &ProjectNode) -> Self {
        Self {
            id: node.id.clone(),
            position: Point::new(node.x, node.y),
            data: NodeData::ProjectNode(project_data(node)),
            draggable: true,
            connectable: true,
            selected: false,
            dragging: false,
            measured: None,
            source_position: None,
            target_position: None,
        }
    }

    pub fn area(id: impl Into<String>, position: Point, size: Size) -> Self {
        Self {
            id: id.into(),
            position,
            data: NodeData::Area(AreaData { size }),
            draggable: false,
            connectable: false,
            selected: false,
            dragging: false,
            measured: Some(size),
            source_position: None,
            target_position: None,
        }
    }

    pub fn is_area(&self) -> bool {
        matches!(self.data, NodeData::Area(_))
    }

    pub fn project_data(&self) -> Option<&ProjectNodeData> {
        match &self.data {
            NodeData::ProjectNode(data) => Some(data),
            NodeData::Area(_) => None,
        }
    }

    /// Rendered footprint: the measured box when known and non-empty,
    /// otherwise derived from content.
    pub fn size(&self, metrics: &CardMetrics) -> Size {
        if let Some(size) = self.measured.filter(|size| size.width > 0.0 && size.height > 0.0) {
            return size;
        }
        match &self.data {
            NodeData::ProjectNode(data) => footprint(
                &data.name,
                &data.description,
                &data.expertise_areas,
                metrics,
            ),
            NodeData::Area(area) => area.size,
        }
    }

    pub fn to_project_node(&self) -> Option<ProjectNode> {
        let data = self.project_data()?;
        Some(ProjectNode {
            id: self.id.clone(),
            name: data.name.clone(),
            description: data.description.clone(),
            expertise_areas: data.expertise_areas,
            x: self.position.x,
            y: self.position.y,
        })
    }
}

pub fn project_data(node: &ProjectNode) -> ProjectNodeData {
    ProjectNodeData {
        name: node.name.clone(),
        description: node.description.clone(),
        expertise_areas: node.expertise_areas,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default)]
    pub selected: bool,
}

impl DiagramEdge {
    pub fn from_link(link: &ProjectLink) -> Self {
        Self {
            id: link.id.clone(),
            source: link.source.clone(),
            target: link.target.clone(),
            source_handle: link.source_handle.clone(),
            target_handle: link.target_handle.clone(),
            selected: false,
        }
    }

    pub fn to_link(&self) -> ProjectLink {
        ProjectLink {
            id: self.id.clone(),
            source: self.source.clone(),
            target: self.target.clone(),
            source_handle: self.source_handle.clone(),
            target_handle: self.target_handle.clone(),
        }
    }
}

pub fn to_diagram(project: &Project) -> (Vec<DiagramNode>, Vec<DiagramEdge>) {
    let nodes = project.nodes.iter().map(DiagramNode::project).collect();
    let edges = project.links.iter().map(DiagramEdge::from_link).collect();
    (nodes, edges)
}

/// Inverse of [`to_diagram`]. Area nodes have no record and are skipped.
pub fn from_diagram(nodes: &[DiagramNode], edges: &[DiagramEdge]) -> (Vec<ProjectNode>, Vec<ProjectLink>) {
    let nodes = nodes.iter().filter_map(DiagramNode::to_project_node).collect();
    let links = edges.iter().map(DiagramEdge::to_link).collect();
    (nodes, links)
}
