use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Width of `text` in px, measured with the calibrated table (`fast`) or a system font.
pub fn text_width(text: &str, font_size: f64, font_family: &str, fast: bool) -> f64 {
    if text.is_empty() || font_size <= 0.0 {
        return 0.0;
    }
    if fast {
        return fallback_text_width(text, font_size);
    }
    measure_text_width(text, font_size, font_family)
        .unwrap_or_else(|| fallback_text_width(text, font_size))
}

pub fn measure_text_width(text: &str, font_size: f64, font_family: &str) -> Option<f64> {
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

pub fn fallback_text_width(text: &str, font_size: f64) -> f64 {
    text.chars().map(char_width_factor).sum::<f64>() * font_size
}

/// Greedy word wrap against `max_width`; a single over-long word keeps its own line.
pub fn wrap_line(text: &str, max_width: f64, font_size: f64, font_family: &str, fast: bool) -> Vec<String> {
    if text_width(text, font_size, font_family, fast) <= max_width {
        return vec![text.to_string()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width(&candidate, font_size, font_family, fast) > max_width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub(crate) fn char_width_factor(ch: char) -> f64 {
    // Em-relative advances of a Roboto-like sans face.
    match ch {
        ' ' => 0.248,
        '.' | ',' | ':' | ';' | '|' | '!' | '\'' => 0.24,
        '(' | ')' | '[' | ']' | '{' | '}' => 0.33,
        'i' | 'j' | 'l' => 0.24,
        'f' | 't' | 'r' => 0.35,
        'I' => 0.27,
        'm' | 'w' => 0.85,
        'M' | 'W' => 0.87,
        'A'..='Z' => 0.65,
        'a'..='z' => 0.55,
        '0'..='9' => 0.56,
        '@' | '#' | '%' | '&' => 0.9,
        _ if ch.is_ascii() => 0.5,
        _ => 1.0,
    }
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<String, Option<FontFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f64, font_family: &str) -> Option<f64> {
        let key = font_family.trim().to_string();
        if !self.cache.contains_key(&key) {
            let face = self.load_face(font_family);
            self.cache.insert(key.clone(), face);
        }
        let face = self.cache.get(&key)?.as_ref()?;
        Some(face.measure_width(text, font_size))
    }

    fn load_face(&mut self, font_family: &str) -> Option<FontFace> {
        let names: Vec<String> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|name| !name.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" | "system-ui" => Family::SansSerif,
                "monospace" => Family::Monospace,
                _ => Family::Name(name.as_str()),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| FontFace::parse(data, index))
            .flatten()
    }
}

/// Advance widths extracted once from a parsed face.
struct FontFace {
    units_per_em: f64,
    advances: HashMap<char, u16>,
}

impl FontFace {
    fn parse(data: &[u8], index: u32) -> Option<Self> {
        let face = Face::parse(data, index).ok()?;
        let mut advances = HashMap::new();
        for byte in 0x20u8..0x7f {
            let ch = byte as char;
            if let Some(glyph) = face.glyph_index(ch) {
                advances.insert(ch, face.glyph_hor_advance(glyph).unwrap_or(0));
            }
        }
        Some(Self {
            units_per_em: f64::from(face.units_per_em().max(1)),
            advances,
        })
    }

    fn measure_width(&self, text: &str, font_size: f64) -> f64 {
        let scale = font_size / self.units_per_em;
        text.chars()
            .map(|ch| match self.advances.get(&ch) {
                Some(advance) if *advance > 0 => f64::from(*advance) * scale,
                _ => char_width_factor(ch) * font_size,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_width_scales_with_font_size() {
        let w16 = fallback_text_width("Planner", 16.0);
        let w32 = fallback_text_width("Planner", 32.0);
        assert!((w32 - w16 * 2.0).abs() < 1e-9);
    }

    #[test]
    fn empty_text_has_no_width() {
        assert_eq!(text_width("", 16.0, "sans-serif", true), 0.0);
    }

    #[test]
    fn wrap_keeps_short_text_on_one_line() {
        assert_eq!(wrap_line("short", 1000.0, 16.0, "sans-serif", true).len(), 1);
    }

    #[test]
    fn wrap_splits_long_text() {
        let lines = wrap_line(
            "a description that is clearly too long for a narrow card",
            120.0,
            16.0,
            "sans-serif",
            true,
        );
        assert!(lines.len() > 1, "expected wrapping, got {lines:?}");
    }
}
