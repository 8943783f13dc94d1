use crate::canvas::Canvas;
use crate::config::CardMetrics;
use crate::layout::LayoutDirection;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub direction: String,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub kind: String,
    pub label: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub source_position: Option<String>,
    pub target_position: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
}

impl LayoutDump {
    pub fn from_canvas(canvas: &Canvas, direction: LayoutDirection, metrics: &CardMetrics) -> Self {
        let nodes = canvas
            .nodes
            .iter()
            .map(|node| {
                let size = node.size(metrics);
                NodeDump {
                    id: node.id.clone(),
                    kind: if node.is_area() { "area" } else { "projectNode" }.to_string(),
                    label: node.project_data().map(|data| data.name.clone()),
                    x: node.position.x,
                    y: node.position.y,
                    width: size.width,
                    height: size.height,
                    source_position: node.source_position.map(|side| side.as_str().to_string()),
                    target_position: node.target_position.map(|side| side.as_str().to_string()),
                }
            })
            .collect();

        let edges = canvas
            .edges
            .iter()
            .map(|edge| EdgeDump {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                source_handle: edge.source_handle.clone(),
                target_handle: edge.target_handle.clone(),
            })
            .collect();

        LayoutDump {
            direction: format!("{direction:?}"),
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(
    path: &Path,
    canvas: &Canvas,
    direction: LayoutDirection,
    metrics: &CardMetrics,
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_canvas(canvas, direction, metrics);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Viewport;
    use crate::diagram::{DiagramNode, Point, Size};

    #[test]
    fn dump_tags_area_nodes() {
        let area = DiagramNode::area("area-1", Point::new(1.0, 2.0), Size::new(30.0, 40.0));
        let canvas = Canvas::new(vec![area], Vec::new(), Viewport::new(100.0, 100.0));
        let dump = LayoutDump::from_canvas(&canvas, LayoutDirection::TopToBottom, &CardMetrics::default());
        assert_eq!(dump.nodes[0].kind, "area");
        assert_eq!(dump.nodes[0].label, None);
        assert_eq!((dump.nodes[0].width, dump.nodes[0].height), (30.0, 40.0));
        assert_eq!(dump.direction, "TopToBottom");
    }
}
