//! Font loading and text measurement using `ttf-parser`.
//!
//! Without a loaded face, widths come from a Helvetica-like heuristic so that
//! layout stays deterministic across machines.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// A loaded font face with metrics.
#[derive(Clone)]
pub struct FontData {
    /// Raw font bytes (kept alive for ttf-parser's zero-copy API).
    pub bytes: Vec<u8>,
    pub units_per_em: f32,
    pub ascender: f32,
    pub descender: f32,
    pub line_gap: f32,
}

impl FontData {
    fn synthetic() -> Self {
        Self {
            bytes: Vec::new(),
            units_per_em: 1000.0,
            ascender: 750.0,
            descender: -250.0,
            line_gap: 0.0,
        }
    }
}

/// Manages loaded fonts.
pub struct FontManager {
    fonts: HashMap<FontKey, FontData>,
    default_key: FontKey,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: String,
    pub bold: bool,
    pub italic: bool,
}

impl FontKey {
    pub fn new(family: &str, bold: bool, italic: bool) -> Self {
        Self {
            family: family.to_string(),
            bold,
            italic,
        }
    }
}

impl FontManager {
    /// A manager holding synthetic Helvetica metrics for every variant.
    pub fn new() -> Self {
        let mut fonts = HashMap::new();
        for (bold, italic) in [(false, false), (true, false), (false, true), (true, true)] {
            fonts.insert(FontKey::new("Helvetica", bold, italic), FontData::synthetic());
        }
        Self {
            fonts,
            default_key: FontKey::new("Helvetica", false, false),
        }
    }

    /// Load a TTF/OTF font from bytes, replacing any entry for the same key.
    pub fn load_font(&mut self, family: &str, bold: bool, italic: bool, bytes: Vec<u8>) -> Result<()> {
        let face = ttf_parser::Face::parse(&bytes, 0)
            .map_err(|e| Error::Font(format!("Failed to parse font: {e}")))?;

        let data = FontData {
            units_per_em: face.units_per_em() as f32,
            ascender: face.ascender() as f32,
            descender: face.descender() as f32,
            line_gap: face.line_gap() as f32,
            bytes,
        };

        log::debug!("loaded font {family} (bold={bold}, italic={italic})");
        self.fonts.insert(FontKey::new(family, bold, italic), data);
        Ok(())
    }

    /// Get font data for a key, falling back to the default.
    pub fn get(&self, key: &FontKey) -> Option<&FontData> {
        self.fonts
            .get(key)
            .or_else(|| self.fonts.get(&self.default_key))
    }

    /// Measure the width of a string at a given font size (in px).
    /// If we have actual font bytes, we parse glyph advances. Otherwise we
    /// use an average character width heuristic (0.5 × font_size per char).
    pub fn measure_text_width(&self, text: &str, font_size: f32, bold: bool, italic: bool, family: &str) -> f32 {
        let key = FontKey::new(family, bold, italic);
        let heuristic = || {
            // Bold is ~10 % wider.
            let avg = if bold { 0.55 } else { 0.5 };
            text.chars().count() as f32 * font_size * avg
        };

        let Some(data) = self.get(&key).filter(|d| !d.bytes.is_empty()) else {
            return heuristic();
        };

        // Parse the font and sum horizontal advances
        match ttf_parser::Face::parse(&data.bytes, 0) {
            Ok(face) => {
                let scale = font_size / data.units_per_em;
                text.chars()
                    .map(|ch| match face.glyph_index(ch) {
                        Some(gid) => face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale,
                        None => font_size * 0.5,
                    })
                    .sum()
            }
            Err(_) => heuristic(),
        }
    }

    /// Measure the line height in px.
    pub fn line_height_px(&self, font_size: f32, line_height_factor: f32) -> f32 {
        font_size * line_height_factor
    }
}

impl Default for FontManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Word-wrap text to fit within `max_width` pixels. Returns a vec of lines.
/// Embedded `\n` always starts a new line.
pub fn wrap_text(
    text: &str,
    font_size: f32,
    bold: bool,
    italic: bool,
    family: &str,
    max_width: f32,
    fonts: &FontManager,
) -> Vec<String> {
    if max_width <= 0.0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        for word in &words {
            let candidate = if current_line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current_line, word)
            };
            let w = fonts.measure_text_width(&candidate, font_size, bold, italic, family);
            if w > max_width && !current_line.is_empty() {
                lines.push(current_line);
                current_line = word.to_string();
            } else {
                current_line = candidate;
            }
        }
        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_text_width() {
        let mgr = FontManager::default();
        let w = mgr.measure_text_width("Hello", 16.0, false, false, "Helvetica");
        // 5 chars × 16 × 0.5 = 40
        assert!((w - 40.0).abs() < 0.1);
    }

    #[test]
    fn unknown_family_uses_default_metrics() {
        let mgr = FontManager::default();
        let a = mgr.measure_text_width("Resume", 12.0, false, false, "Garamond");
        let b = mgr.measure_text_width("Resume", 12.0, false, false, "Helvetica");
        assert_eq!(a, b);
    }

    #[test]
    fn word_wrap_basic() {
        let mgr = FontManager::default();
        let lines = wrap_text("Hello world foo bar", 16.0, false, false, "Helvetica", 60.0, &mgr);
        assert!(lines.len() >= 2, "Expected wrapping, got {:?}", lines);
    }

    #[test]
    fn newline_forces_break() {
        let mgr = FontManager::default();
        let lines = wrap_text("one\ntwo", 16.0, false, false, "Helvetica", 1000.0, &mgr);
        assert_eq!(lines, ["one", "two"]);
    }

    #[test]
    fn infinite_width_never_wraps() {
        let mgr = FontManager::default();
        let lines = wrap_text("Jan 2020 - Present", 12.0, false, false, "Helvetica", f32::INFINITY, &mgr);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn garbage_font_bytes_rejected() {
        let mut mgr = FontManager::default();
        let err = mgr.load_font("Broken", false, false, vec![0, 1, 2, 3]);
        assert!(matches!(err, Err(Error::Font(_))));
    }
}
