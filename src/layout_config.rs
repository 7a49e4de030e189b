//! Composed layout – the intermediate representation between pagination and
//! rendering. This is the "frozen" structure that encodes exactly what goes
//! on each page.
//!
//! All lengths are unscaled CSS pixels relative to the page's top-left
//! corner; the display scale is carried alongside and applied only by
//! consumers that draw on screen.

use serde::{Deserialize, Serialize};

use crate::geometry::MM_TO_PX;
use crate::Result;

/// Every page of the current preview, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedLayout {
    /// Document title embedded in the PDF metadata.
    #[serde(default = "ComposedLayout::default_title")]
    pub title: String,
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    /// Printable height per page; page `i` shows content from `i × slice`.
    pub slice_height_px: f32,
    /// On-screen scale; 1.0 for export.
    pub scale: f32,
    /// Ordered list of pages.
    pub pages: Vec<ComposedPage>,
}

/// One page element of the preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedPage {
    /// Element id used to locate the page at export time.
    pub id: String,
    pub index: usize,
    /// Content offset shown at the top of the printable area.
    pub offset_px: f32,
    /// "Page i of N" indicator; preview only.
    pub badge: Option<String>,
    pub boxes: Vec<LayoutBox>,
}

/// A positioned rectangle with optional content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,

    /// Background and border edges, already clipped to the page window.
    pub fills: Vec<FilledRect>,
    pub text: Option<TextContent>,

    /// Children (nested boxes)
    pub children: Vec<LayoutBox>,
}

/// Solid rectangle in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilledRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    /// Lines visible on this page.
    pub lines: Vec<TextLine>,
    pub font_family: String,
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    pub color: [f32; 4],
    pub line_height: f32,
    pub underline: bool,
    /// List bullet/number, positioned in the gutter left of the box.
    pub list_marker: Option<TextLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    /// X offset within the layout box (for alignment)
    pub x_offset: f32,
    /// Y offset of the line top from the box top
    pub y_offset: f32,
    /// Measured width, used for underlines.
    #[serde(default)]
    pub width: f32,
}

/// Band of a page that shows content: the full page width between the top
/// and bottom margins. Nothing is drawn outside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintableArea {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PrintableArea {
    /// How much of the vertical span `[top, top + height)` falls inside the
    /// area.
    pub fn visible_height(&self, top: f32, height: f32) -> f32 {
        ((top + height).min(self.y + self.height) - top.max(self.y)).max(0.0)
    }
}

impl ComposedLayout {
    fn default_title() -> String {
        "Resume".to_string()
    }

    pub fn margin_px(&self) -> f32 {
        self.margin_mm * MM_TO_PX
    }

    /// The clip applied to every page when it is drawn.
    pub fn printable_area(&self) -> PrintableArea {
        PrintableArea {
            x: 0.0,
            y: self.margin_px(),
            width: self.page_width_px(),
            height: self.slice_height_px,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page_width_px(&self) -> f32 {
        self.page_width_mm * MM_TO_PX
    }

    pub fn page_height_px(&self) -> f32 {
        self.page_height_mm * MM_TO_PX
    }

    /// Page footprint on screen after scaling.
    pub fn display_size_px(&self) -> (f32, f32) {
        (
            self.page_width_px() * self.scale,
            self.page_height_px() * self.scale,
        )
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl ComposedPage {
    /// 1-based page number.
    pub fn page_number(&self) -> usize {
        self.index + 1
    }

    /// The page as captured for export: same content, no indicator.
    pub fn without_badge(&self) -> ComposedPage {
        ComposedPage {
            badge: None,
            ..self.clone()
        }
    }
}

impl LayoutBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            fills: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Whether the box or any descendant draws something.
    pub fn is_visible(&self) -> bool {
        !self.fills.is_empty()
            || self.text.as_ref().is_some_and(|t| !t.lines.is_empty() || t.list_marker.is_some())
            || self.children.iter().any(LayoutBox::is_visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ComposedLayout {
        let mut b = LayoutBox::new(37.8, 37.8, 718.2, 24.0);
        b.text = Some(TextContent {
            lines: vec![TextLine {
                text: "Ada Lovelace".into(),
                x_offset: 0.0,
                y_offset: 0.0,
                width: 96.0,
            }],
            font_family: "Helvetica".into(),
            font_size: 24.0,
            bold: true,
            italic: false,
            color: [0.0, 0.0, 0.0, 1.0],
            line_height: 32.0,
            underline: false,
            list_marker: None,
        });
        ComposedLayout {
            title: "Resume".into(),
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 10.0,
            slice_height_px: 1047.06,
            scale: 0.5,
            pages: vec![ComposedPage {
                id: "resume-preview".into(),
                index: 0,
                offset_px: 0.0,
                badge: Some("Page 1 of 1".into()),
                boxes: vec![b],
            }],
        }
    }

    #[test]
    fn json_roundtrip() {
        let layout = sample();
        let back = ComposedLayout::from_json(&layout.to_json()).unwrap();
        assert_eq!(back, layout);
    }

    #[test]
    fn missing_title_gets_default() {
        let json = r#"{"page_width_mm":210,"page_height_mm":297,"margin_mm":10,
                       "slice_height_px":1047,"scale":1,"pages":[]}"#;
        let layout = ComposedLayout::from_json(json).unwrap();
        assert_eq!(layout.title, "Resume");
    }

    #[test]
    fn display_size_applies_scale() {
        let (w, h) = sample().display_size_px();
        assert!((w - 210.0 * 3.78 * 0.5).abs() < 1e-3);
        assert!((h - 297.0 * 3.78 * 0.5).abs() < 1e-3);
    }

    #[test]
    fn printable_area_sits_between_the_margins() {
        let area = sample().printable_area();
        assert!((area.y - 37.8).abs() < 1e-3);
        assert!((area.height - 1047.06).abs() < 1e-3);
        assert!((area.width - 210.0 * 3.78).abs() < 1e-3);

        // A line crossing the bottom edge is only partly visible.
        let bottom = area.y + area.height;
        assert!((area.visible_height(bottom - 10.0, 24.0) - 10.0).abs() < 1e-3);
        assert_eq!(area.visible_height(bottom, 24.0), 0.0);
        assert_eq!(area.visible_height(area.y - 24.0, 24.0), 0.0);
        assert!((area.visible_height(area.y + 5.0, 24.0) - 24.0).abs() < 1e-3);
    }

    #[test]
    fn without_badge_keeps_content() {
        let page = &sample().pages[0];
        let captured = page.without_badge();
        assert!(captured.badge.is_none());
        assert_eq!(captured.boxes, page.boxes);
        assert_eq!(captured.id, page.id);
    }
}
