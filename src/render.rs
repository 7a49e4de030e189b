//! PDF renderer – draws composed pages into PDF bytes using `printpdf`
//! (v0.8 ops-based API).
//!
//! Layout coordinates are CSS pixels from the page's top-left corner; they
//! are converted to points here, with the y axis flipped for PDF.

use printpdf::*;

use crate::error::{Error, Result};
use crate::export::PageCapture;
use crate::geometry::MM_TO_PX;
use crate::layout_config::*;

/// Points per CSS pixel at the preview's mm-to-px ratio.
const PX_TO_PT: f32 = 72.0 / 25.4 / MM_TO_PX;

const BADGE_FONT_PX: f32 = 12.0;
const BADGE_INSET_PX: f32 = 6.0;
const BADGE_COLOR: [f32; 4] = [0.420, 0.447, 0.502, 1.0];

fn pt(px: f32) -> Pt {
    Pt(px * PX_TO_PT)
}

fn rgb(c: [f32; 4]) -> Color {
    Color::Rgb(Rgb {
        r: c[0],
        g: c[1],
        b: c[2],
        icc_profile: None,
    })
}

/// Collects pages as PDF pages and assembles the document on
/// [`finish`](PageCapture::finish).
pub struct PdfCapture {
    title: String,
    page_width_mm: f32,
    page_height_mm: f32,
    /// Clip for page content; the badge is drawn outside it.
    clip: Option<PrintableArea>,
    pages: Vec<PdfPage>,
}

impl PdfCapture {
    pub fn new(title: &str, page_width_mm: f32, page_height_mm: f32) -> Self {
        Self {
            title: title.to_string(),
            page_width_mm,
            page_height_mm,
            clip: None,
            pages: Vec::new(),
        }
    }

    /// A capture sized for the layout's pages, clipping content to the
    /// printable area so nothing spills into the margins.
    pub fn for_layout(layout: &ComposedLayout) -> Self {
        let mut capture = Self::new(&layout.title, layout.page_width_mm, layout.page_height_mm);
        capture.clip = Some(layout.printable_area());
        capture
    }

    fn page_height_px(&self) -> f32 {
        self.page_height_mm * MM_TO_PX
    }

    fn page_width_px(&self) -> f32 {
        self.page_width_mm * MM_TO_PX
    }

    fn page_ops(&self, page: &ComposedPage) -> Vec<Op> {
        let page_height = self.page_height_px();
        let mut ops = Vec::new();

        if let Some(area) = &self.clip {
            ops.push(Op::SaveGraphicsState);
            ops.push(Op::DrawPolygon {
                polygon: rect_polygon(area.x, area.y, area.width, area.height, page_height, PaintMode::Clip),
            });
        }
        for lbox in &page.boxes {
            render_box(&mut ops, lbox, page_height);
        }
        if self.clip.is_some() {
            ops.push(Op::RestoreGraphicsState);
        }

        if let Some(badge) = &page.badge {
            render_badge(&mut ops, badge, self.page_width_px(), page_height);
        }
        ops
    }
}

impl PageCapture for PdfCapture {
    fn capture(&mut self, page: &ComposedPage) -> Result<()> {
        let ops = self.page_ops(page);
        self.pages.push(PdfPage::new(
            Mm(self.page_width_mm),
            Mm(self.page_height_mm),
            ops,
        ));
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>> {
        if self.pages.is_empty() {
            return Err(Error::Capture("no pages were captured".to_string()));
        }
        let mut doc = PdfDocument::new(&self.title);
        doc.with_pages(std::mem::take(&mut self.pages));
        let bytes = doc.save(&PdfSaveOptions::default(), &mut Vec::new());
        log::debug!("assembled PDF '{}' ({} bytes)", self.title, bytes.len());
        Ok(bytes)
    }
}

/// Render every page of a layout, as shown, into PDF bytes.
pub fn render_pdf(layout: &ComposedLayout) -> Result<Vec<u8>> {
    let mut capture = PdfCapture::for_layout(layout);
    for page in &layout.pages {
        capture.capture(page)?;
    }
    capture.finish()
}

/// Convert a UTF-8 string to raw Windows-1252 bytes then wrap in a String so
/// printpdf writes the bytes unchanged into the PDF stream (builtin fonts use
/// WinAnsiEncoding, so each glyph is one byte 0x00–0xFF).
fn to_winlatin(s: &str) -> String {
    let bytes: Vec<u8> = s
        .chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80, // euro
            '\u{201A}' => 0x82, // single low-9 quote
            '\u{201E}' => 0x84, // double low-9 quote
            '\u{2026}' => 0x85, // ellipsis
            '\u{2018}' => 0x91, // left single quote
            '\u{2019}' => 0x92, // right single quote
            '\u{201C}' => 0x93, // left double quote
            '\u{201D}' => 0x94, // right double quote
            '\u{2022}' => 0x95, // bullet
            '\u{2013}' => 0x96, // en-dash
            '\u{2014}' => 0x97, // em-dash
            '\u{2122}' => 0x99, // trademark
            '\u{00A0}' => 0x20, // non-breaking space -> space
            c if (c as u32) < 256 => c as u8,
            _ => b'?',
        })
        .collect();
    // SAFETY: intentionally non-UTF-8 for 0x80-0x9F range; printpdf passes
    // these bytes straight to the PDF stream, decoded by WinAnsiEncoding.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}

/// Axis-aligned rectangle given in page px from the top-left corner.
fn rect_polygon(x: f32, y: f32, width: f32, height: f32, page_height: f32, mode: PaintMode) -> Polygon {
    // PDF origin is bottom-left.
    let x1 = x;
    let x2 = x + width;
    let y1 = page_height - y - height;
    let y2 = page_height - y;
    let corner = |x: f32, y: f32| LinePoint {
        p: Point { x: pt(x), y: pt(y) },
        bezier: false,
    };

    Polygon {
        rings: vec![PolygonRing {
            points: vec![corner(x1, y1), corner(x2, y1), corner(x2, y2), corner(x1, y2)],
        }],
        mode,
        winding_order: WindingOrder::NonZero,
    }
}

fn fill_rect(ops: &mut Vec<Op>, rect: &FilledRect, page_height: f32) {
    ops.push(Op::SetFillColor {
        col: rgb(rect.color),
    });
    ops.push(Op::DrawPolygon {
        polygon: rect_polygon(rect.x, rect.y, rect.width, rect.height, page_height, PaintMode::Fill),
    });
}

fn builtin_font(bold: bool, italic: bool) -> BuiltinFont {
    match (bold, italic) {
        (true, true) => BuiltinFont::HelveticaBoldOblique,
        (true, false) => BuiltinFont::HelveticaBold,
        (false, true) => BuiltinFont::HelveticaOblique,
        (false, false) => BuiltinFont::Helvetica,
    }
}

/// Write one line with its top-left corner at (`x`, `top`) in page px.
#[allow(clippy::too_many_arguments)]
fn write_line(
    ops: &mut Vec<Op>,
    text: &str,
    x: f32,
    top: f32,
    font_size: f32,
    line_height: f32,
    font: BuiltinFont,
    color: [f32; 4],
    page_height: f32,
) {
    // Baseline ≈ top of line + ascender (approx 0.75 × font_size)
    let baseline = page_height - top - font_size * 0.75;

    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point {
            x: pt(x),
            y: pt(baseline),
        },
    });
    ops.push(Op::SetFontSizeBuiltinFont {
        size: pt(font_size),
        font,
    });
    ops.push(Op::SetLineHeight {
        lh: pt(line_height),
    });
    ops.push(Op::SetFillColor { col: rgb(color) });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(to_winlatin(text))],
        font,
    });
    ops.push(Op::EndTextSection);
}

/// Recursively render a LayoutBox and its children into PDF ops.
fn render_box(ops: &mut Vec<Op>, lbox: &LayoutBox, page_height: f32) {
    for rect in &lbox.fills {
        fill_rect(ops, rect, page_height);
    }

    if let Some(text) = &lbox.text {
        let font = builtin_font(text.bold, text.italic);
        // Half-leading puts the glyphs in the middle of the line box.
        let leading = ((text.line_height - text.font_size) / 2.0).max(0.0);

        for tline in &text.lines {
            if tline.text.is_empty() {
                continue;
            }
            let x = lbox.x + tline.x_offset;
            let top = lbox.y + tline.y_offset + leading;
            write_line(
                ops,
                &tline.text,
                x,
                top,
                text.font_size,
                text.line_height,
                font,
                text.color,
                page_height,
            );

            if text.underline {
                let underline_y = page_height - top - text.font_size * 0.85;
                ops.push(Op::SetOutlineThickness { pt: Pt(0.5) });
                ops.push(Op::SetOutlineColor {
                    col: rgb(text.color),
                });
                ops.push(Op::DrawLine {
                    line: Line {
                        points: vec![
                            LinePoint {
                                p: Point {
                                    x: pt(x),
                                    y: pt(underline_y),
                                },
                                bezier: false,
                            },
                            LinePoint {
                                p: Point {
                                    x: pt(x + tline.width),
                                    y: pt(underline_y),
                                },
                                bezier: false,
                            },
                        ],
                        is_closed: false,
                    },
                });
            }
        }

        if let Some(marker) = &text.list_marker {
            write_line(
                ops,
                &marker.text,
                lbox.x + marker.x_offset,
                lbox.y + marker.y_offset + leading,
                text.font_size,
                text.line_height,
                BuiltinFont::Helvetica,
                text.color,
                page_height,
            );
        }
    }

    for child in &lbox.children {
        render_box(ops, child, page_height);
    }
}

/// Page indicator in the bottom-right corner, inside the margin.
fn render_badge(ops: &mut Vec<Op>, badge: &str, page_width: f32, page_height: f32) {
    let width = badge.chars().count() as f32 * BADGE_FONT_PX * 0.5;
    write_line(
        ops,
        badge,
        page_width - BADGE_INSET_PX - width,
        page_height - BADGE_INSET_PX - BADGE_FONT_PX,
        BADGE_FONT_PX,
        BADGE_FONT_PX,
        BuiltinFont::Helvetica,
        BADGE_COLOR,
        page_height,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(index: usize, badge: Option<&str>) -> ComposedPage {
        let mut b = LayoutBox::new(37.8, 37.8, 300.0, 24.0);
        b.fills.push(FilledRect {
            x: 37.8,
            y: 37.8,
            width: 300.0,
            height: 24.0,
            color: [0.9, 0.9, 0.9, 1.0],
        });
        b.text = Some(TextContent {
            lines: vec![TextLine {
                text: "Caf\u{e9} \u{2013} R&D".into(),
                x_offset: 0.0,
                y_offset: 0.0,
                width: 100.0,
            }],
            font_family: "Helvetica".into(),
            font_size: 16.0,
            bold: false,
            italic: false,
            color: [0.0, 0.0, 0.0, 1.0],
            line_height: 24.0,
            underline: true,
            list_marker: None,
        });
        ComposedPage {
            id: crate::compositor::page_element_id(index),
            index,
            offset_px: 0.0,
            badge: badge.map(str::to_string),
            boxes: vec![b],
        }
    }

    #[test]
    fn renders_pdf_header() {
        let bytes = render_pdf(&two_page_layout()).unwrap();
        assert!(bytes.len() > 100, "PDF should have content");
        // PDF magic number
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    fn two_page_layout() -> ComposedLayout {
        ComposedLayout {
            title: "Resume".into(),
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 10.0,
            slice_height_px: 1047.06,
            scale: 1.0,
            pages: vec![page(0, Some("Page 1 of 2")), page(1, Some("Page 2 of 2"))],
        }
    }

    #[test]
    fn content_is_clipped_to_the_printable_area() {
        let layout = two_page_layout();
        let capture = PdfCapture::for_layout(&layout);
        let ops = capture.page_ops(&layout.pages[0]);

        assert!(matches!(ops[0], Op::SaveGraphicsState));
        let Op::DrawPolygon { polygon } = &ops[1] else {
            panic!("expected the clip path second, got {:?}", ops[1]);
        };
        assert!(matches!(polygon.mode, PaintMode::Clip));

        // Clip spans the printable band: bottom edge at the bottom margin,
        // top edge at the top margin, in PDF points.
        let ys: Vec<f32> = polygon.rings[0].points.iter().map(|p| p.p.y.0).collect();
        let margin_pt = 10.0 * 72.0 / 25.4;
        let page_pt = 297.0 * 72.0 / 25.4;
        let low = ys.iter().cloned().fold(f32::MAX, f32::min);
        let high = ys.iter().cloned().fold(f32::MIN, f32::max);
        assert!((high - (page_pt - margin_pt)).abs() < 0.01);
        assert!((low - (page_pt - margin_pt - 1047.06 * PX_TO_PT)).abs() < 0.01);

        // Content sits inside the save/restore pair; the badge comes after.
        let restore = ops
            .iter()
            .position(|op| matches!(op, Op::RestoreGraphicsState))
            .unwrap();
        let fill = ops
            .iter()
            .position(|op| matches!(op, Op::DrawPolygon { polygon } if matches!(polygon.mode, PaintMode::Fill)))
            .unwrap();
        assert!(1 < fill && fill < restore);
        assert!(ops[restore..]
            .iter()
            .any(|op| matches!(op, Op::WriteTextBuiltinFont { .. })));
    }

    #[test]
    fn bare_capture_draws_without_a_clip() {
        let capture = PdfCapture::new("Resume", 210.0, 297.0);
        let ops = capture.page_ops(&page(0, None));
        assert!(!ops.iter().any(|op| matches!(op, Op::SaveGraphicsState)));
    }

    #[test]
    fn finish_without_pages_is_an_error() {
        let mut capture = PdfCapture::new("Resume", 210.0, 297.0);
        assert!(matches!(capture.finish(), Err(Error::Capture(_))));
    }

    #[test]
    fn winlatin_maps_typographic_characters() {
        let s = to_winlatin("\u{2022}\u{2013}\u{4e2d}");
        assert_eq!(s.as_bytes(), &[0x95, 0x96, b'?']);
    }

    #[test]
    fn px_to_pt_matches_a4() {
        let width_pt = 210.0 * MM_TO_PX * PX_TO_PT;
        assert!((width_pt - 595.28).abs() < 0.01);
    }
}
