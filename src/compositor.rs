//! Page compositor – places the continuous content block on each page,
//! shifted up by the page's offset and clipped to its printable window.
//!
//! Boxes keep their full geometry; what gets clipped is what they draw.
//! Fills are cut at the window edges. Text lines cannot be cut here, so a
//! line is placed on every page its box overlaps and the renderer clips it
//! to the printable area: a line crossing a page boundary shows its top part
//! on one page and the rest on the next.

use std::ops::Range;

use crate::geometry::PageGeometry;
use crate::layout::{BoxContent, PositionedBox};
use crate::layout_config::{ComposedLayout, ComposedPage, FilledRect, LayoutBox, TextContent, TextLine};
use crate::pagination::PageWindow;
use crate::probe::ContentBlock;
use crate::style::{self, Color};

/// Element id of the page at `index`. The first page keeps the bare id so a
/// single-page preview is addressed the same way as before pagination.
pub fn page_element_id(index: usize) -> String {
    if index == 0 {
        "resume-preview".to_string()
    } else {
        format!("resume-preview-page-{}", index + 1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComposeOptions {
    /// Draw the "Page i of N" indicator on each page.
    pub show_badges: bool,
    pub title: String,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            show_badges: true,
            title: "Resume".to_string(),
        }
    }
}

/// Build every page of the document from its windows.
pub fn compose(
    block: &ContentBlock,
    windows: &[PageWindow],
    geometry: &PageGeometry,
    scale: f32,
    options: &ComposeOptions,
) -> ComposedLayout {
    let slice = geometry.printable_height_px();
    let margin = geometry.margin_px();
    let total = windows.len();

    let pages = windows
        .iter()
        .map(|window| {
            let range = window.visible_range(slice);
            let boxes = match &block.root {
                Some(root) => root
                    .children
                    .iter()
                    .filter_map(|b| clip_box(b, &range, margin))
                    .collect(),
                None => Vec::new(),
            };
            ComposedPage {
                id: page_element_id(window.index),
                index: window.index,
                offset_px: window.offset,
                badge: options
                    .show_badges
                    .then(|| format!("Page {} of {}", window.page_number(), total)),
                boxes,
            }
        })
        .collect::<Vec<_>>();

    log::debug!(
        "composed {} page(s), slice {:.1}px, scale {:.3}",
        pages.len(),
        slice,
        scale
    );

    ComposedLayout {
        title: options.title.clone(),
        page_width_mm: geometry.width_mm(),
        page_height_mm: geometry.height_mm(),
        margin_mm: geometry.margin_mm(),
        slice_height_px: slice,
        scale,
        pages,
    }
}

/// Clip a rectangle in content coordinates to the window and move it to
/// page coordinates.
fn clip_rect(
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    color: Color,
    range: &Range<f32>,
    margin: f32,
) -> Option<FilledRect> {
    let top = y.max(range.start);
    let bottom = (y + height).min(range.end);
    if bottom <= top || width <= 0.0 {
        return None;
    }
    Some(FilledRect {
        x: margin + x,
        y: margin + top - range.start,
        width,
        height: bottom - top,
        color: color.to_array(),
    })
}

fn box_fills(pbox: &PositionedBox, range: &Range<f32>, margin: f32) -> Vec<FilledRect> {
    let s = &pbox.style;
    let mut fills = Vec::new();

    if !s.background_color.is_transparent() {
        fills.extend(clip_rect(
            pbox.x,
            pbox.y,
            pbox.width,
            pbox.height,
            s.background_color,
            range,
            margin,
        ));
    }

    if s.has_border() && !s.border_color.is_transparent() {
        let c = s.border_color;
        let (x, y, w, h) = (pbox.x, pbox.y, pbox.width, pbox.height);
        let edges = [
            (x, y, w, s.border_top),
            (x, y + h - s.border_bottom, w, s.border_bottom),
            (x, y, s.border_left, h),
            (x + w - s.border_right, y, s.border_right, h),
        ];
        for (ex, ey, ew, eh) in edges {
            if ew > 0.0 && eh > 0.0 {
                fills.extend(clip_rect(ex, ey, ew, eh, c, range, margin));
            }
        }
    }

    fills
}

/// Whether a line box starting at `top` shows any part inside the window.
fn overlaps(top: f32, height: f32, range: &Range<f32>) -> bool {
    top < range.end && top + height > range.start
}

fn box_text(pbox: &PositionedBox, range: &Range<f32>) -> Option<TextContent> {
    let s = &pbox.style;
    let top_inset = s.padding_top + s.border_top;
    let left_inset = s.padding_left + s.border_left;

    let mut lines = Vec::new();
    let mut line_height = s.font_size * s.line_height;
    if let BoxContent::Text(block) = &pbox.content {
        line_height = block.line_height;
        let content_width = pbox.width - s.horizontal_insets();
        for (i, (text, width)) in block.lines.iter().zip(&block.line_widths).enumerate() {
            let y_offset = top_inset + i as f32 * block.line_height;
            if text.is_empty() || !overlaps(pbox.y + y_offset, line_height, range) {
                continue;
            }
            let align = match s.text_align {
                style::TextAlign::Left => 0.0,
                style::TextAlign::Center => ((content_width - width) / 2.0).max(0.0),
                style::TextAlign::Right => (content_width - width).max(0.0),
            };
            lines.push(TextLine {
                text: text.clone(),
                x_offset: left_inset + align,
                y_offset,
                width: *width,
            });
        }
    }

    let list_marker = pbox
        .list_marker
        .as_ref()
        .filter(|_| overlaps(pbox.y + top_inset, line_height, range))
        .map(|marker| {
            let gutter = s.font_size * (0.5 * marker.chars().count() as f32 + 0.5);
            TextLine {
                text: marker.clone(),
                x_offset: -gutter,
                y_offset: top_inset,
                width: 0.0,
            }
        });

    if lines.is_empty() && list_marker.is_none() {
        return None;
    }

    Some(TextContent {
        lines,
        font_family: s.font_family.clone(),
        font_size: s.font_size,
        bold: s.font_weight == style::FontWeight::Bold,
        italic: s.font_style == style::FontStyle::Italic,
        color: s.color.to_array(),
        line_height,
        underline: s.text_decoration == style::TextDecoration::Underline,
        list_marker,
    })
}

/// Recursively place a box on the page, or `None` when nothing of it is
/// visible in the window.
fn clip_box(pbox: &PositionedBox, range: &Range<f32>, margin: f32) -> Option<LayoutBox> {
    if pbox.bottom() <= range.start || pbox.y >= range.end {
        return None;
    }

    let mut lb = LayoutBox::new(
        margin + pbox.x,
        margin + pbox.y - range.start,
        pbox.width,
        pbox.height,
    );
    lb.fills = box_fills(pbox, range, margin);
    lb.text = box_text(pbox, range);
    lb.children = pbox
        .children
        .iter()
        .filter_map(|c| clip_box(c, range, margin))
        .collect();

    lb.is_visible().then_some(lb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;
    use crate::fonts::FontManager;
    use crate::geometry::MarginSize;
    use crate::layout::compute_layout;
    use crate::pagination::paginate;
    use crate::style::build_styled_tree;

    fn block_for(html: &str, geometry: &PageGeometry) -> ContentBlock {
        let styled = build_styled_tree(&parse_html(html), None);
        let fonts = FontManager::default();
        let root = compute_layout(&styled, geometry.content_width_px(), &fonts).unwrap();
        ContentBlock {
            width: geometry.content_width_px(),
            height: root.height,
            root: Some(root),
        }
    }

    /// (text, top, line height) of every line drawn in the box tree.
    fn all_lines(b: &LayoutBox, out: &mut Vec<(String, f32, f32)>) {
        if let Some(t) = &b.text {
            for l in &t.lines {
                out.push((l.text.clone(), b.y + l.y_offset, t.line_height));
            }
        }
        for c in &b.children {
            all_lines(c, out);
        }
    }

    #[test]
    fn page_ids() {
        assert_eq!(page_element_id(0), "resume-preview");
        assert_eq!(page_element_id(1), "resume-preview-page-2");
        assert_eq!(page_element_id(4), "resume-preview-page-5");
    }

    #[test]
    fn every_line_is_shown_in_full_exactly_once() {
        let geometry = PageGeometry::a4(MarginSize::Small);
        let html: String = (0..120).map(|i| format!("<p>Line number {i}</p>")).collect();
        let block = block_for(&html, &geometry);
        let slice = geometry.printable_height_px();
        let windows = paginate(block.height, slice).unwrap();
        assert!(windows.len() >= 2);

        let layout = compose(&block, &windows, &geometry, 1.0, &ComposeOptions::default());
        let area = layout.printable_area();
        let mut shown = vec![0.0f32; 120];
        let mut heights = vec![0.0f32; 120];
        let mut split = 0;
        for page in &layout.pages {
            let mut lines = Vec::new();
            for b in &page.boxes {
                all_lines(b, &mut lines);
            }
            for (text, top, height) in &lines {
                let visible = area.visible_height(*top, *height);
                assert!(visible > 0.0, "{text} placed on page {} but not visible", page.index);
                if visible < *height - 0.01 {
                    split += 1;
                }
                let i: usize = text.trim_start_matches("Line number ").parse().unwrap();
                shown[i] += visible;
                heights[i] = *height;
            }
        }
        for i in 0..120 {
            assert!(
                (shown[i] - heights[i]).abs() < 0.01,
                "line {i}: {} of {} px shown",
                shown[i],
                heights[i]
            );
        }
        // 1047.06px slices do not divide evenly into lines, so some line
        // crosses a boundary and is shown in two parts.
        assert!(split >= 2);
    }

    #[test]
    fn last_line_on_a_page_is_cut_at_the_bottom_margin() {
        let geometry = PageGeometry::a4(MarginSize::Small);
        let html: String = (0..120).map(|i| format!("<p>Line number {i}</p>")).collect();
        let block = block_for(&html, &geometry);
        let windows = paginate(block.height, geometry.printable_height_px()).unwrap();
        let layout = compose(&block, &windows, &geometry, 1.0, &ComposeOptions::default());
        let area = layout.printable_area();

        let mut lines = Vec::new();
        for b in &layout.pages[0].boxes {
            all_lines(b, &mut lines);
        }
        let (_, top, height) = lines
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .cloned()
            .unwrap();
        // The last line on the page is the one the clip cuts.
        assert!(top < area.y + area.height);
        assert!(top + height > area.y + area.height);
        assert!(area.visible_height(top, height) < height);
    }

    #[test]
    fn pages_are_shifted_by_their_offset() {
        let geometry = PageGeometry::a4(MarginSize::Medium);
        let html: String = (0..100).map(|i| format!("<p>Row {i}</p>")).collect();
        let block = block_for(&html, &geometry);
        let windows = paginate(block.height, geometry.printable_height_px()).unwrap();
        let layout = compose(&block, &windows, &geometry, 1.0, &ComposeOptions::default());

        let second = &layout.pages[1];
        assert_eq!(second.offset_px, geometry.printable_height_px());
        assert_eq!(second.id, "resume-preview-page-2");
        // The first row drawn on page two starts within one line of the top.
        let first_box = &second.boxes[0];
        assert!(first_box.y < geometry.margin_px() + 24.0);
    }

    #[test]
    fn badges_follow_options() {
        let geometry = PageGeometry::default();
        let block = block_for("<p>Hi</p>", &geometry);
        let windows = paginate(block.height, geometry.printable_height_px()).unwrap();

        let with = compose(&block, &windows, &geometry, 0.5, &ComposeOptions::default());
        assert_eq!(with.pages[0].badge.as_deref(), Some("Page 1 of 1"));
        assert_eq!(with.scale, 0.5);

        let options = ComposeOptions {
            show_badges: false,
            ..ComposeOptions::default()
        };
        let without = compose(&block, &windows, &geometry, 0.5, &options);
        assert!(without.pages[0].badge.is_none());
    }

    #[test]
    fn backgrounds_are_clipped_to_the_window() {
        let geometry = PageGeometry::a4(MarginSize::Small);
        let slice = geometry.printable_height_px();
        // A tall grey block straddling the first page break.
        let html = format!(
            r#"<div class="bg-gray-200" style="height: {}px"></div>"#,
            slice * 1.5
        );
        let block = block_for(&html, &geometry);
        let windows = paginate(block.height, slice).unwrap();
        assert_eq!(windows.len(), 2);
        let layout = compose(&block, &windows, &geometry, 1.0, &ComposeOptions::default());

        let first = &layout.pages[0].boxes[0].fills[0];
        assert!((first.height - slice).abs() < 0.01);
        let second = &layout.pages[1].boxes[0].fills[0];
        assert!((second.y - geometry.margin_px()).abs() < 0.01);
        assert!((second.height - slice * 0.5).abs() < 0.5);
    }

    #[test]
    fn empty_block_gives_blank_pages() {
        let geometry = PageGeometry::default();
        let block = ContentBlock::empty(geometry.content_width_px());
        let windows = paginate(0.0, geometry.printable_height_px()).unwrap();
        let layout = compose(&block, &windows, &geometry, 1.0, &ComposeOptions::default());
        assert_eq!(layout.pages.len(), 1);
        assert!(layout.pages[0].boxes.is_empty());
    }
}
