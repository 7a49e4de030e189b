//! Layout engine – uses Taffy to compute flexbox layout from a styled DOM
//! tree, then converts the result into a tree of positioned boxes.
//!
//! Everything is laid out as one continuous block at a fixed content width;
//! splitting into pages happens later, on the finished geometry.

use std::collections::HashMap;
use taffy::prelude::*;

use crate::dom::Tag;
use crate::error::{Error, Result};
use crate::fonts::{wrap_text, FontManager};
use crate::style::{self, ComputedStyle, FontStyle as CssFontStyle, FontWeight, StyledNode};

/// Marks a `<br>` inside an inline run. U+2028 never survives whitespace
/// normalisation, so it cannot be confused with source newlines.
const LINE_BREAK: char = '\u{2028}';

// ---------------------------------------------------------------------------
// Layout tree
// ---------------------------------------------------------------------------

/// A positioned box in content coordinates (origin = top-left of the content
/// area, before page splitting).
#[derive(Debug, Clone)]
pub struct PositionedBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub style: ComputedStyle,
    pub content: BoxContent,
    /// Bullet or number drawn in the gutter left of a list item.
    pub list_marker: Option<String>,
    pub children: Vec<PositionedBox>,
}

impl PositionedBox {
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoxContent {
    None,
    Text(TextBlock),
}

/// Wrapped lines of a text leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    /// Measured width of each line, for alignment.
    pub line_widths: Vec<f32>,
    /// Line advance in px.
    pub line_height: f32,
}

// ---------------------------------------------------------------------------
// Inline runs
// ---------------------------------------------------------------------------

struct InlineRun {
    text: String,
    style: ComputedStyle,
}

fn collect_runs(node: &StyledNode, out: &mut Vec<InlineRun>) {
    match node {
        StyledNode::Text { text, style } => out.push(InlineRun {
            text: text.clone(),
            style: style.clone(),
        }),
        StyledNode::Element {
            tag: Tag::Br,
            style,
            ..
        } => out.push(InlineRun {
            text: LINE_BREAK.to_string(),
            style: style.clone(),
        }),
        StyledNode::Element { children, .. } => {
            for child in children {
                collect_runs(child, out);
            }
        }
    }
}

/// Collapse whitespace runs to single spaces, turning line-break markers
/// into `\n`.
fn normalize_text(raw: &str) -> String {
    raw.split(LINE_BREAK)
        .map(|segment| segment.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

fn same_typography(a: &ComputedStyle, b: &ComputedStyle) -> bool {
    a.font_size == b.font_size
        && a.font_weight == b.font_weight
        && a.font_style == b.font_style
        && a.font_family == b.font_family
        && a.color == b.color
        && a.text_decoration == b.text_decoration
        && a.text_transform == b.text_transform
}

/// Block box properties with the text properties of its content.
fn with_typography(block: &ComputedStyle, text: &ComputedStyle) -> ComputedStyle {
    let mut s = block.clone();
    s.font_size = text.font_size;
    s.font_weight = text.font_weight;
    s.font_style = text.font_style;
    s.font_family = text.font_family.clone();
    s.color = text.color;
    s.text_decoration = text.text_decoration;
    s.text_transform = text.text_transform;
    s.line_height = text.line_height;
    s
}

fn is_blank_text(node: &StyledNode) -> bool {
    matches!(node, StyledNode::Text { text, .. } if text.trim().is_empty())
}

fn node_style(node: &StyledNode) -> &ComputedStyle {
    match node {
        StyledNode::Element { style, .. } | StyledNode::Text { style, .. } => style,
    }
}

/// Border-box width of an element given its parent's content width.
fn outer_width(style: &ComputedStyle, parent_width: f32) -> f32 {
    let w = match style.width {
        style::Dimension::Px(w) => w,
        style::Dimension::Percent(p) => parent_width * p / 100.0,
        style::Dimension::Auto => parent_width - style.margin_left - style.margin_right,
    };
    w.max(0.0)
}

// ---------------------------------------------------------------------------
// Build Taffy tree from styled nodes
// ---------------------------------------------------------------------------

struct LayoutBuilder<'a> {
    taffy: TaffyTree<()>,
    fonts: &'a FontManager,
    node_styles: HashMap<NodeId, ComputedStyle>,
    node_content: HashMap<NodeId, BoxContent>,
    node_markers: HashMap<NodeId, String>,
}

fn layout_err(e: impl std::fmt::Display) -> Error {
    Error::Layout(e.to_string())
}

impl<'a> LayoutBuilder<'a> {
    fn new(fonts: &'a FontManager) -> Self {
        Self {
            taffy: TaffyTree::new(),
            fonts,
            node_styles: HashMap::new(),
            node_content: HashMap::new(),
            node_markers: HashMap::new(),
        }
    }

    /// Return true when every child is a text node or a display:inline element
    /// (no block-level children).
    fn all_inline(children: &[StyledNode]) -> bool {
        children.iter().all(|c| match c {
            StyledNode::Text { .. } => true,
            StyledNode::Element {
                style,
                children: gc,
                ..
            } => {
                matches!(
                    style.display,
                    style::Display::Inline | style::Display::InlineBlock
                ) && Self::all_inline(gc)
            }
        })
    }

    fn measure(&self, text: &str, style: &ComputedStyle) -> f32 {
        self.fonts.measure_text_width(
            text,
            style.font_size,
            style.font_weight == FontWeight::Bold,
            style.font_style == CssFontStyle::Italic,
            &style.font_family,
        )
    }

    /// Unwrapped width of a node's text, including its insets and margins.
    fn natural_width(&self, node: &StyledNode) -> f32 {
        let mut runs = Vec::new();
        collect_runs(node, &mut runs);
        let style = node_style(node);
        let text_width = runs
            .iter()
            .map(|r| {
                let text = r.style.text_transform.apply(&normalize_text(&r.text));
                self.measure(&text, &r.style)
            })
            .sum::<f32>();
        text_width + style.horizontal_insets() + style.margin_left + style.margin_right
    }

    /// Build a node. `parent_width` is the parent's content width; `fill`
    /// says whether the parent stretches this node across that width.
    fn build_node(
        &mut self,
        styled: &StyledNode,
        parent_width: f32,
        fill: bool,
    ) -> Result<Option<NodeId>> {
        match styled {
            StyledNode::Text { text, style } => {
                let text = normalize_text(text);
                if text.is_empty() {
                    return Ok(None);
                }
                self.build_text_leaf(&text, style, parent_width, fill).map(Some)
            }
            StyledNode::Element {
                tag,
                style,
                children,
            } => self.build_element_node(tag, style, children, parent_width, fill),
        }
    }

    fn build_text_leaf(
        &mut self,
        text: &str,
        style: &ComputedStyle,
        parent_width: f32,
        fill: bool,
    ) -> Result<NodeId> {
        let bold = style.font_weight == FontWeight::Bold;
        let italic = style.font_style == CssFontStyle::Italic;
        let line_height = self.fonts.line_height_px(style.font_size, style.line_height);
        let text = style.text_transform.apply(text);

        let max_w = if style.no_wrap {
            f32::INFINITY
        } else {
            (outer_width(style, parent_width) - style.horizontal_insets()).max(1.0)
        };
        let lines = wrap_text(
            &text,
            style.font_size,
            bold,
            italic,
            &style.font_family,
            max_w,
            self.fonts,
        );
        let line_widths: Vec<f32> = lines.iter().map(|l| self.measure(l, style)).collect();
        let text_width = line_widths.iter().copied().fold(0.0f32, f32::max);
        let text_height = lines.len() as f32 * line_height;

        let width = match style.width {
            style::Dimension::Auto if fill => taffy::Dimension::Auto,
            style::Dimension::Auto => {
                taffy::Dimension::Length(text_width + style.horizontal_insets())
            }
            other => dim_to_taffy(other),
        };

        let taffy_style = Style {
            size: Size {
                width,
                height: taffy::Dimension::Length(text_height + style.vertical_insets()),
            },
            flex_shrink: if style.no_wrap { 0.0 } else { 1.0 },
            margin: margin_rect(style),
            padding: padding_rect(style),
            border: border_rect(style),
            ..Default::default()
        };

        let node = self.taffy.new_leaf(taffy_style).map_err(layout_err)?;
        self.node_styles.insert(node, style.clone());
        self.node_content.insert(
            node,
            BoxContent::Text(TextBlock {
                lines,
                line_widths,
                line_height,
            }),
        );
        Ok(node)
    }

    /// Mixed-style inline content: every word becomes its own leaf inside a
    /// wrapping flex row, so each keeps its own font.
    fn build_inline_flow(
        &mut self,
        runs: &[InlineRun],
        block: &ComputedStyle,
        parent_width: f32,
    ) -> Result<NodeId> {
        let inner_width = (outer_width(block, parent_width) - block.horizontal_insets()).max(1.0);
        let space = self.measure(" ", block);

        let mut words = Vec::new();
        for run in runs {
            if run.text.contains(LINE_BREAK) {
                let spacer = self
                    .taffy
                    .new_leaf(Style {
                        size: Size {
                            width: taffy::Dimension::Percent(1.0),
                            height: taffy::Dimension::Length(0.0),
                        },
                        ..Default::default()
                    })
                    .map_err(layout_err)?;
                words.push(spacer);
                continue;
            }
            for word in run.text.split_whitespace() {
                words.push(self.build_text_leaf(word, &run.style, inner_width, false)?);
            }
        }

        let mut ts = computed_to_taffy(block);
        ts.display = taffy::Display::Flex;
        ts.flex_direction = taffy::FlexDirection::Row;
        ts.flex_wrap = taffy::FlexWrap::Wrap;
        ts.justify_content = Some(match block.text_align {
            style::TextAlign::Left => taffy::JustifyContent::Start,
            style::TextAlign::Center => taffy::JustifyContent::Center,
            style::TextAlign::Right => taffy::JustifyContent::End,
        });
        ts.align_items = Some(taffy::AlignItems::Start);
        ts.gap = Size {
            width: LengthPercentage::Length(space),
            height: LengthPercentage::Length(0.0),
        };

        let node = self
            .taffy
            .new_with_children(ts, &words)
            .map_err(layout_err)?;
        self.node_styles.insert(node, block.clone());
        Ok(node)
    }

    fn build_element_node(
        &mut self,
        tag: &Tag,
        style: &ComputedStyle,
        children: &[StyledNode],
        parent_width: f32,
        fill: bool,
    ) -> Result<Option<NodeId>> {
        if style.display == style::Display::None {
            return Ok(None);
        }

        // Non-flex elements whose children are all inline flow their text
        // as one paragraph.
        let has_text = children.iter().any(|c| !is_blank_text(c));
        if style.display != style::Display::Flex && has_text && Self::all_inline(children) {
            let mut runs = Vec::new();
            for child in children {
                collect_runs(child, &mut runs);
            }
            let mut visible = runs.iter().filter(|r| !r.text.trim().is_empty());
            let uniform = match visible.next() {
                Some(first) => visible.all(|r| same_typography(&first.style, &r.style)),
                None => true,
            };
            if uniform {
                let raw: String = runs.iter().map(|r| r.text.as_str()).collect();
                let text = normalize_text(&raw);
                if !text.trim().is_empty() {
                    let typography = runs
                        .iter()
                        .find(|r| !r.text.trim().is_empty())
                        .map(|r| with_typography(style, &r.style))
                        .unwrap_or_else(|| style.clone());
                    return self
                        .build_text_leaf(&text, &typography, parent_width, fill)
                        .map(Some);
                }
            } else {
                return self.build_inline_flow(&runs, style, parent_width).map(Some);
            }
        }

        let my_width = outer_width(style, parent_width);
        let inner_width = (my_width - style.horizontal_insets()).max(0.0);

        let is_row = style.display == style::Display::Flex
            && style.flex_direction == style::FlexDirection::Row;
        let content_children: Vec<&StyledNode> =
            children.iter().filter(|c| !is_blank_text(c)).collect();

        // In a single-line row the wrapping children share what the
        // nowrap ones leave over; in a wrapping row each may take a full line.
        let child_build_width = if is_row && style.flex_wrap == style::FlexWrap::NoWrap {
            let count = content_children.len().max(1);
            let gap_total = style.gap * count.saturating_sub(1) as f32;
            let reserved: f32 = content_children
                .iter()
                .filter(|c| node_style(c).no_wrap)
                .map(|c| self.natural_width(c))
                .sum();
            let wrapping = content_children
                .iter()
                .filter(|c| !node_style(c).no_wrap)
                .count()
                .max(1);
            ((inner_width - gap_total - reserved) / wrapping as f32).max(1.0)
        } else {
            inner_width
        };
        let child_fill = !is_row && style.align_items == style::AlignItems::Stretch;

        let mut child_nodes = Vec::new();
        let mut list_counter = 0u32;

        for child in content_children {
            let marker = match child {
                StyledNode::Element { tag: Tag::Li, .. } => {
                    list_counter += 1;
                    Some(if *tag == Tag::Ol {
                        format!("{list_counter}.")
                    } else {
                        "\u{2022}".to_string()
                    })
                }
                _ => None,
            };

            if let Some(child_id) = self.build_node(child, child_build_width, child_fill)? {
                if let Some(marker) = marker {
                    self.node_markers.insert(child_id, marker);
                }
                child_nodes.push(child_id);
            }
        }

        let mut ts = computed_to_taffy(style);
        if !fill && style.display != style::Display::Flex && style.width == style::Dimension::Auto
        {
            ts.size.width = taffy::Dimension::Length(my_width);
        }
        let node = self
            .taffy
            .new_with_children(ts, &child_nodes)
            .map_err(layout_err)?;
        self.node_styles.insert(node, style.clone());
        Ok(Some(node))
    }

    /// Extract positioned boxes after layout computation.
    fn extract(&self, node: NodeId, offset_x: f32, offset_y: f32) -> Result<PositionedBox> {
        let layout = self.taffy.layout(node).map_err(layout_err)?;
        let style = self.node_styles.get(&node).cloned().unwrap_or_default();
        let content = self
            .node_content
            .get(&node)
            .cloned()
            .unwrap_or(BoxContent::None);

        let x = offset_x + layout.location.x;
        let y = offset_y + layout.location.y;

        let children = self
            .taffy
            .children(node)
            .map_err(layout_err)?
            .iter()
            .map(|&child| self.extract(child, x, y))
            .collect::<Result<Vec<_>>>()?;

        Ok(PositionedBox {
            x,
            y,
            width: layout.size.width,
            height: layout.size.height,
            style,
            content,
            list_marker: self.node_markers.get(&node).cloned(),
            children,
        })
    }
}

fn margin_rect(s: &ComputedStyle) -> Rect<LengthPercentageAuto> {
    Rect {
        top: LengthPercentageAuto::Length(s.margin_top),
        right: LengthPercentageAuto::Length(s.margin_right),
        bottom: LengthPercentageAuto::Length(s.margin_bottom),
        left: LengthPercentageAuto::Length(s.margin_left),
    }
}

fn padding_rect(s: &ComputedStyle) -> Rect<LengthPercentage> {
    Rect {
        top: LengthPercentage::Length(s.padding_top),
        right: LengthPercentage::Length(s.padding_right),
        bottom: LengthPercentage::Length(s.padding_bottom),
        left: LengthPercentage::Length(s.padding_left),
    }
}

fn border_rect(s: &ComputedStyle) -> Rect<LengthPercentage> {
    Rect {
        top: LengthPercentage::Length(s.border_top),
        right: LengthPercentage::Length(s.border_right),
        bottom: LengthPercentage::Length(s.border_bottom),
        left: LengthPercentage::Length(s.border_left),
    }
}

fn computed_to_taffy(s: &ComputedStyle) -> Style {
    let mut ts = Style::default();

    // Display / layout mode
    match s.display {
        style::Display::Flex => {
            ts.display = taffy::Display::Flex;
            ts.flex_direction = match s.flex_direction {
                style::FlexDirection::Row => taffy::FlexDirection::Row,
                style::FlexDirection::Column => taffy::FlexDirection::Column,
            };
            ts.flex_wrap = match s.flex_wrap {
                style::FlexWrap::NoWrap => taffy::FlexWrap::NoWrap,
                style::FlexWrap::Wrap => taffy::FlexWrap::Wrap,
            };
            ts.justify_content = Some(match s.justify_content {
                style::JustifyContent::Start => taffy::JustifyContent::Start,
                style::JustifyContent::End => taffy::JustifyContent::End,
                style::JustifyContent::Center => taffy::JustifyContent::Center,
                style::JustifyContent::SpaceBetween => taffy::JustifyContent::SpaceBetween,
                style::JustifyContent::SpaceAround => taffy::JustifyContent::SpaceAround,
                style::JustifyContent::SpaceEvenly => taffy::JustifyContent::SpaceEvenly,
            });
            ts.align_items = Some(match s.align_items {
                style::AlignItems::Start => taffy::AlignItems::Start,
                style::AlignItems::End => taffy::AlignItems::End,
                style::AlignItems::Center => taffy::AlignItems::Center,
                style::AlignItems::Stretch => taffy::AlignItems::Stretch,
            });
        }
        style::Display::Block | style::Display::ListItem | style::Display::InlineBlock => {
            // Use flex column for block-level elements (vertical stacking)
            ts.display = taffy::Display::Flex;
            ts.flex_direction = taffy::FlexDirection::Column;
        }
        style::Display::Inline => {
            ts.display = taffy::Display::Flex;
            ts.flex_direction = taffy::FlexDirection::Row;
            ts.flex_wrap = taffy::FlexWrap::Wrap;
        }
        style::Display::None => {
            ts.display = taffy::Display::None;
        }
    }

    // Sizing
    ts.size = Size {
        width: dim_to_taffy(s.width),
        height: dim_to_taffy(s.height),
    };
    // Allow flex/shrink items to compress below their natural content size
    if s.flex_shrink > 0.0 || s.flex_grow > 0.0 {
        ts.min_size.width = taffy::Dimension::Length(0.0);
    }

    // Flex properties
    ts.flex_grow = s.flex_grow;
    ts.flex_shrink = s.flex_shrink;

    ts.margin = margin_rect(s);
    ts.padding = padding_rect(s);
    ts.border = border_rect(s);

    // Gap
    ts.gap = Size {
        width: LengthPercentage::Length(s.gap),
        height: LengthPercentage::Length(s.gap),
    };

    ts
}

fn dim_to_taffy(d: style::Dimension) -> taffy::Dimension {
    match d {
        style::Dimension::Auto => taffy::Dimension::Auto,
        style::Dimension::Px(v) => taffy::Dimension::Length(v),
        style::Dimension::Percent(v) => taffy::Dimension::Percent(v / 100.0),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Lay out a styled tree as one continuous block `content_width` px wide.
///
/// The returned root sits at the origin; its height is the total content
/// height, trailing margins included.
pub fn compute_layout(
    styled_nodes: &[StyledNode],
    content_width: f32,
    fonts: &FontManager,
) -> Result<PositionedBox> {
    if !content_width.is_finite() || content_width <= 0.0 {
        return Err(Error::InvalidGeometry(format!(
            "content width must be positive, got {content_width}"
        )));
    }
    let mut builder = LayoutBuilder::new(fonts);

    // Wrap all nodes in a root flex-column container
    let mut child_ids = Vec::new();
    for node in styled_nodes.iter().filter(|n| !is_blank_text(n)) {
        if let Some(id) = builder.build_node(node, content_width, true)? {
            child_ids.push(id);
        }
    }

    let root_style = Style {
        display: taffy::Display::Flex,
        flex_direction: taffy::FlexDirection::Column,
        size: Size {
            width: taffy::Dimension::Length(content_width),
            height: taffy::Dimension::Auto,
        },
        ..Default::default()
    };

    let root = builder
        .taffy
        .new_with_children(root_style, &child_ids)
        .map_err(layout_err)?;

    builder
        .taffy
        .compute_layout(
            root,
            Size {
                width: AvailableSpace::Definite(content_width),
                height: AvailableSpace::MaxContent,
            },
        )
        .map_err(layout_err)?;

    let root_box = builder.extract(root, 0.0, 0.0)?;
    log::debug!(
        "laid out {} top-level boxes, content height {:.1}px",
        root_box.children.len(),
        root_box.height
    );
    Ok(root_box)
}
