use crate::error::{PlannerError, Result};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_spacing: f32,
    pub rank_spacing: f32,
    pub margin: f32,
    /// Distance kept between a marquee selection's bounding box and its area node.
    pub area_padding: f64,
    pub order_passes: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_spacing: 50.0,
            rank_spacing: 50.0,
            margin: 8.0,
            area_padding: 100.0,
            order_passes: 4,
        }
    }
}

/// Box model of a node card, used to size nodes without a rendering surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardMetrics {
    pub max_width: f64,
    pub header_padding: f64,
    pub title_font_size: f64,
    pub title_line_height: f64,
    pub subtitle_font_size: f64,
    pub subtitle_line_height: f64,
    pub content_padding: f64,
    pub content_padding_bottom: f64,
    pub chip_height: f64,
    pub chip_padding_x: f64,
    pub chip_font_size: f64,
    pub chip_gap: f64,
    pub default_width: f64,
    pub default_height: f64,
    pub font_family: String,
    pub fast_text_metrics: bool,
}

impl Default for CardMetrics {
    fn default() -> Self {
        Self {
            max_width: 800.0,
            header_padding: 16.0,
            title_font_size: 24.0,
            title_line_height: 1.334,
            subtitle_font_size: 16.0,
            subtitle_line_height: 1.5,
            content_padding: 16.0,
            content_padding_bottom: 24.0,
            chip_height: 32.0,
            chip_padding_x: 12.0,
            chip_font_size: 13.0,
            chip_gap: 16.0,
            default_width: 50.0,
            default_height: 50.0,
            font_family: "Roboto, Helvetica, Arial, sans-serif".to_string(),
            fast_text_metrics: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
    pub fit_padding: f64,
    pub fit_max_zoom: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            fit_padding: 1.0,
            fit_max_zoom: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub padding: f64,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            padding: 24.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".planr"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub card: CardMetrics,
    pub canvas: CanvasConfig,
    pub render: RenderConfig,
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::light();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        let card = CardMetrics {
            font_family: theme.font_family.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            card,
            canvas: CanvasConfig::default(),
            render,
            storage: StorageConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    font_family: Option<String>,
    data_dir: Option<PathBuf>,
    node_spacing: Option<f32>,
    rank_spacing: Option<f32>,
    area_padding: Option<f64>,
    order_passes: Option<usize>,
    fast_text_metrics: Option<bool>,
    card_max_width: Option<f64>,
    canvas_width: Option<f64>,
    canvas_height: Option<f64>,
    render_width: Option<f32>,
    render_height: Option<f32>,
    background: Option<String>,
}

/// Loads defaults, overridden by a JSON/JSON5 file when `path` is given.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile =
        json5::from_str(contents).map_err(|err| PlannerError::Config(err.to_string()))?;

    if let Some(name) = parsed.theme.as_deref() {
        config.theme = Theme::by_name(name)
            .ok_or_else(|| PlannerError::Config(format!("unknown theme `{name}`")))?;
        config.render.background = config.theme.background.clone();
    }
    if let Some(v) = parsed.font_family {
        config.theme.font_family = v.clone();
        config.card.font_family = v;
    }
    if let Some(v) = parsed.data_dir {
        config.storage.data_dir = v;
    }
    if let Some(v) = parsed.node_spacing {
        config.layout.node_spacing = v;
    }
    if let Some(v) = parsed.rank_spacing {
        config.layout.rank_spacing = v;
    }
    if let Some(v) = parsed.area_padding {
        config.layout.area_padding = v;
    }
    if let Some(v) = parsed.order_passes {
        config.layout.order_passes = v;
    }
    if let Some(v) = parsed.fast_text_metrics {
        config.card.fast_text_metrics = v;
    }
    if let Some(v) = parsed.card_max_width {
        config.card.max_width = v;
    }
    if let Some(v) = parsed.canvas_width {
        config.canvas.width = v;
    }
    if let Some(v) = parsed.canvas_height {
        config.canvas.height = v;
    }
    if let Some(v) = parsed.render_width {
        config.render.width = v;
    }
    if let Some(v) = parsed.render_height {
        config.render.height = v;
    }
    if let Some(v) = parsed.background {
        config.render.background = v;
    }
    Ok(config)
}
