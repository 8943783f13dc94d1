use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub card_background: String,
    pub card_border: String,
    pub title_color: String,
    pub subtitle_color: String,
    pub chip_background: String,
    pub chip_text_color: String,
    pub handle_color: String,
    pub line_color: String,
    pub area_background: String,
    pub area_border: String,
    pub background: String,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            font_family: "Roboto, Helvetica, Arial, sans-serif".to_string(),
            card_background: "#FFFFFF".to_string(),
            card_border: "#D0D7DE".to_string(),
            title_color: "rgba(0, 0, 0, 0.87)".to_string(),
            subtitle_color: "rgba(0, 0, 0, 0.6)".to_string(),
            chip_background: "rgba(0, 0, 0, 0.08)".to_string(),
            chip_text_color: "rgba(0, 0, 0, 0.87)".to_string(),
            handle_color: "#1A192B".to_string(),
            line_color: "#B1B1B7".to_string(),
            area_background: "rgba(25, 118, 210, 0.08)".to_string(),
            area_border: "#1976D2".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            font_family: "Roboto, Helvetica, Arial, sans-serif".to_string(),
            card_background: "#1E1E1E".to_string(),
            card_border: "#3A3A3A".to_string(),
            title_color: "#FFFFFF".to_string(),
            subtitle_color: "rgba(255, 255, 255, 0.7)".to_string(),
            chip_background: "rgba(255, 255, 255, 0.16)".to_string(),
            chip_text_color: "#FFFFFF".to_string(),
            handle_color: "#E0E0E0".to_string(),
            line_color: "#777777".to_string(),
            area_background: "rgba(144, 202, 249, 0.08)".to_string(),
            area_border: "#90CAF9".to_string(),
            background: "#121212".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "light" | "default" => Some(Self::light()),
            "dark" => Some(Self::dark()),
            _ => None,
        }
    }
}
