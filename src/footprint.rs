use crate::config::CardMetrics;
use crate::diagram::Size;
use crate::model::ExpertiseAreas;
use crate::text_metrics::{text_width, wrap_line};

/// Lines and box of one node card, as the renderer draws it.
#[derive(Debug, Clone, PartialEq)]
pub struct CardLayout {
    pub title_lines: Vec<String>,
    pub subtitle_lines: Vec<String>,
    /// Chip rows, each a list of `(label, width)`.
    pub chip_rows: Vec<Vec<(String, f64)>>,
    pub header_height: f64,
    pub size: Size,
}

/// Rendered size of a node card from its content alone.
pub fn footprint(name: &str, description: &str, areas: &ExpertiseAreas, metrics: &CardMetrics) -> Size {
    card_layout(name, description, areas, metrics).size
}

pub fn card_layout(
    name: &str,
    description: &str,
    areas: &ExpertiseAreas,
    metrics: &CardMetrics,
) -> CardLayout {
    let fast = metrics.fast_text_metrics;
    let family = metrics.font_family.as_str();
    let header_inner = (metrics.max_width - 2.0 * metrics.header_padding).max(1.0);
    let content_inner = (metrics.max_width - 2.0 * metrics.content_padding).max(1.0);

    let title_lines = wrap_text(name, header_inner, metrics.title_font_size, family, fast);
    let subtitle_lines = wrap_text(description, header_inner, metrics.subtitle_font_size, family, fast);
    let widest = |lines: &[String], size: f64| {
        lines
            .iter()
            .map(|line| text_width(line, size, family, fast))
            .fold(0.0, f64::max)
    };
    let title_width = widest(&title_lines, metrics.title_font_size);
    let subtitle_width = widest(&subtitle_lines, metrics.subtitle_font_size);

    let mut chip_rows: Vec<Vec<(String, f64)>> = Vec::new();
    let mut row_width = 0.0;
    let mut widest_row: f64 = 0.0;
    for area in areas.active() {
        let label = area.label();
        let width =
            text_width(&label, metrics.chip_font_size, family, fast) + 2.0 * metrics.chip_padding_x;
        let next_width = if row_width > 0.0 {
            row_width + metrics.chip_gap + width
        } else {
            width
        };
        match chip_rows.last_mut() {
            Some(row) if next_width <= content_inner => {
                row.push((label, width));
                row_width = next_width;
            }
            _ => {
                chip_rows.push(vec![(label, width)]);
                row_width = width;
            }
        }
        widest_row = widest_row.max(row_width);
    }

    if title_lines.is_empty() && subtitle_lines.is_empty() && chip_rows.is_empty() {
        return CardLayout {
            title_lines,
            subtitle_lines,
            chip_rows,
            header_height: 0.0,
            size: Size::new(metrics.default_width, metrics.default_height),
        };
    }

    let header_height = 2.0 * metrics.header_padding
        + title_lines.len() as f64 * metrics.title_font_size * metrics.title_line_height
        + subtitle_lines.len() as f64 * metrics.subtitle_font_size * metrics.subtitle_line_height;
    let rows = chip_rows.len() as f64;
    let chips_height = if chip_rows.is_empty() {
        0.0
    } else {
        rows * metrics.chip_height + (rows - 1.0) * metrics.chip_gap
    };
    let content_height = metrics.content_padding + metrics.content_padding_bottom + chips_height;

    let width = (title_width.max(subtitle_width) + 2.0 * metrics.header_padding)
        .max(widest_row + 2.0 * metrics.content_padding)
        .min(metrics.max_width);

    CardLayout {
        title_lines,
        subtitle_lines,
        chip_rows,
        header_height,
        size: Size::new(width, header_height + content_height),
    }
}

fn wrap_text(text: &str, max_width: f64, font_size: f64, family: &str, fast: bool) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    wrap_line(trimmed, max_width, font_size, family, fast)
}
