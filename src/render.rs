use crate::canvas::Canvas;
use crate::config::{CardMetrics, Config};
#[cfg(feature = "png")]
use crate::config::RenderConfig;
use crate::diagram::{DiagramEdge, DiagramNode, HandleSide, NodeData, Point};
use crate::footprint::card_layout;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const HANDLE_RADIUS: f64 = 4.0;
const CHIP_RADIUS: f64 = 16.0;

/// Draws the canvas in diagram space: areas beneath edges, edges beneath cards.
pub fn render_svg(canvas: &Canvas, theme: &Theme, config: &Config) -> String {
    let metrics = &config.card;
    let padding = config.render.padding;
    let (min, max) = canvas
        .bounds(canvas.nodes.iter(), metrics)
        .unwrap_or((Point::default(), Point::default()));
    let offset = Point::new(padding - min.x, padding - min.y);
    let width = (max.x - min.x + 2.0 * padding).max(200.0);
    let height = (max.y - min.y + 2.0 * padding).max(200.0);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        config.render.background
    ));
    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
        theme.line_color
    ));
    svg.push_str("</defs>");
    svg.push_str(&format!("<g transform=\"translate({:.2} {:.2})\">", offset.x, offset.y));

    for node in canvas.nodes.iter().filter(|node| node.is_area()) {
        let size = node.size(metrics);
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"10\" ry=\"10\" fill=\"{}\" stroke=\"{}\" stroke-dasharray=\"6 4\" stroke-width=\"1.2\"/>",
            node.position.x,
            node.position.y,
            size.width,
            size.height,
            theme.area_background,
            theme.area_border
        ));
    }

    for edge in &canvas.edges {
        let Some(points) = edge_points(canvas, edge, metrics) else {
            continue;
        };
        let stroke = if edge.selected { &theme.handle_color } else { &theme.line_color };
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.4\" marker-end=\"url(#arrow)\" />",
            points_to_path(&points),
            stroke
        ));
    }

    for node in canvas.nodes.iter().filter(|node| !node.is_area()) {
        svg.push_str(&card_svg(node, theme, metrics));
    }

    svg.push_str("</g></svg>");
    svg
}

/// Orthogonal route between the handles an edge uses: out of the source
/// handle, across at the midpoint, into the target handle.
fn edge_points(canvas: &Canvas, edge: &DiagramEdge, metrics: &CardMetrics) -> Option<Vec<Point>> {
    let source = canvas.node(&edge.source)?;
    let target = canvas.node(&edge.target)?;
    let source_side = edge
        .source_handle
        .as_deref()
        .and_then(HandleSide::from_token)
        .or(source.source_position)
        .unwrap_or(HandleSide::Bottom);
    let target_side = edge
        .target_handle
        .as_deref()
        .and_then(HandleSide::from_token)
        .or(target.target_position)
        .unwrap_or(HandleSide::Top);
    let start = source_side.anchor(source.position, source.size(metrics));
    let end = target_side.anchor(target.position, target.size(metrics));

    let points = match source_side {
        HandleSide::Top | HandleSide::Bottom => {
            let mid_y = (start.y + end.y) / 2.0;
            vec![start, Point::new(start.x, mid_y), Point::new(end.x, mid_y), end]
        }
        HandleSide::Left | HandleSide::Right => {
            let mid_x = (start.x + end.x) / 2.0;
            vec![start, Point::new(mid_x, start.y), Point::new(mid_x, end.y), end]
        }
    };
    Some(points)
}

fn points_to_path(points: &[Point]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    d.push_str(&format!("M {:.2} {:.2}", points[0].x, points[0].y));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.x, point.y));
    }
    d
}

fn card_svg(node: &DiagramNode, theme: &Theme, metrics: &CardMetrics) -> String {
    let NodeData::ProjectNode(data) = &node.data else {
        return String::new();
    };
    let layout = card_layout(&data.name, &data.description, &data.expertise_areas, metrics);
    let size = node.measured.unwrap_or(layout.size);
    let Point { x, y } = node.position;

    let mut out = String::new();
    let border = if node.selected { &theme.handle_color } else { &theme.card_border };
    out.push_str(&format!(
        "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"4\" ry=\"4\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
        size.width, size.height, theme.card_background, border
    ));

    let text_x = x + metrics.header_padding;
    let mut line_top = y + metrics.header_padding;
    let title_step = metrics.title_font_size * metrics.title_line_height;
    out.push_str(&text_lines_svg(
        text_x,
        line_top,
        &layout.title_lines,
        metrics.title_font_size,
        title_step,
        &theme.title_color,
        &metrics.font_family,
    ));
    line_top += layout.title_lines.len() as f64 * title_step;
    let subtitle_step = metrics.subtitle_font_size * metrics.subtitle_line_height;
    out.push_str(&text_lines_svg(
        text_x,
        line_top,
        &layout.subtitle_lines,
        metrics.subtitle_font_size,
        subtitle_step,
        &theme.subtitle_color,
        &metrics.font_family,
    ));

    let mut chip_y = y + layout.header_height + metrics.content_padding;
    for row in &layout.chip_rows {
        let mut chip_x = x + metrics.content_padding;
        for (label, width) in row {
            out.push_str(&format!(
                "<rect x=\"{chip_x:.2}\" y=\"{chip_y:.2}\" width=\"{width:.2}\" height=\"{:.2}\" rx=\"{CHIP_RADIUS}\" ry=\"{CHIP_RADIUS}\" fill=\"{}\"/>",
                metrics.chip_height, theme.chip_background
            ));
            let label_x = chip_x + width / 2.0;
            let label_y = chip_y + metrics.chip_height / 2.0 + metrics.chip_font_size * 0.35;
            out.push_str(&format!(
                "<text x=\"{label_x:.2}\" y=\"{label_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
                escape_xml(&metrics.font_family),
                metrics.chip_font_size,
                theme.chip_text_color,
                escape_xml(label)
            ));
            chip_x += width + metrics.chip_gap;
        }
        chip_y += metrics.chip_height + metrics.chip_gap;
    }

    for side in HandleSide::ALL {
        let anchor = side.anchor(node.position, size);
        out.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{HANDLE_RADIUS}\" fill=\"{}\"/>",
            anchor.x, anchor.y, theme.handle_color
        ));
    }
    out
}

fn text_lines_svg(
    x: f64,
    top: f64,
    lines: &[String],
    font_size: f64,
    line_step: f64,
    fill: &str,
    font_family: &str,
) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let start_y = top + font_size;
    let mut text = String::new();
    text.push_str(&format!(
        "<text x=\"{x:.2}\" y=\"{start_y:.2}\" font-family=\"{}\" font-size=\"{font_size}\" fill=\"{fill}\">",
        escape_xml(font_family)
    ));
    for (idx, line) in lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_step };
        text.push_str(&format!("<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>", escape_xml(line)));
    }
    text.push_str("</text>");
    text
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, font_family: &str) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = font_family
        .split(',')
        .next()
        .map(str::trim)
        .unwrap_or("Roboto")
        .to_string();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .unwrap_or(usvg::Size::from_wh(800.0, 600.0).unwrap());

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Viewport;
    use crate::diagram::to_diagram;
    use crate::model::{ExpertiseArea, ExpertiseAreas, Project, ProjectLink, ProjectNode};

    fn canvas() -> Canvas {
        let mut project = Project::new("Web", "site");
        for (id, name, y) in [("a", "Auth & <Login>", 0.0), ("b", "Billing", 300.0)] {
            project.nodes.push(ProjectNode {
                id: id.into(),
                name: name.into(),
                description: "work".into(),
                expertise_areas: ExpertiseAreas::with(&[ExpertiseArea::Qa, ExpertiseArea::DevOps]),
                x: 0.0,
                y,
            });
        }
        project.links.push(ProjectLink::new("l1", "a", "b"));
        let (nodes, edges) = to_diagram(&project);
        Canvas::new(nodes, edges, Viewport::new(800.0, 600.0))
    }

    #[test]
    fn render_svg_draws_cards_chips_and_edges() {
        let config = Config::default();
        let svg = render_svg(&canvas(), &config.theme, &config);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Auth &amp; &lt;Login&gt;"));
        assert!(svg.contains(">QA</text>"));
        assert!(svg.contains(">DevOps</text>"));
        assert_eq!(svg.matches("marker-end").count(), 1);
    }

    #[test]
    fn areas_are_drawn_before_cards() {
        let config = Config::default();
        let mut canvas = canvas();
        canvas
            .selection_end(&["a".to_string()], &config.card, 100.0)
            .unwrap();
        let svg = render_svg(&canvas, &config.theme, &config);
        let area = svg.find("stroke-dasharray").unwrap();
        let card = svg.find("Billing").unwrap();
        assert!(area < card);
    }

    #[test]
    fn edges_to_missing_nodes_are_skipped() {
        let config = Config::default();
        let mut canvas = canvas();
        canvas.edges.push(DiagramEdge::from_link(&ProjectLink::new("l2", "a", "ghost")));
        let svg = render_svg(&canvas, &config.theme, &config);
        assert_eq!(svg.matches("marker-end").count(), 1);
    }

    #[test]
    fn quoted_font_family_stays_inside_attribute() {
        let mut config = Config::default();
        config.card.font_family = "\"Open Sans\", sans-serif".to_string();
        let svg = render_svg(&canvas(), &config.theme, &config);
        assert!(svg.contains("font-family=\"&quot;Open Sans&quot;, sans-serif\""));
        assert!(!svg.contains("font-family=\"\"Open"));
    }
}
