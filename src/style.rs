//! Style resolver – maps CSS inline styles and Tailwind-like utility classes
//! to a flat [`ComputedStyle`] struct consumed by the layout engine.
//!
//! Element defaults follow the utility-first reset the templates are written
//! against: headings and paragraphs carry no margins and inherit their font.

use crate::dom::{DomNode, ElementNode, Tag};

/// Fully resolved style for a single element.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    // Display / layout
    pub display: Display,
    pub flex_direction: FlexDirection,
    pub flex_wrap: FlexWrap,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub justify_content: JustifyContent,
    pub align_items: AlignItems,
    pub gap: f32,

    // Sizing
    pub width: Dimension,
    pub height: Dimension,

    // Spacing (px)
    pub margin_top: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub padding_top: f32,
    pub padding_right: f32,
    pub padding_bottom: f32,
    pub padding_left: f32,

    // Border (px per side)
    pub border_top: f32,
    pub border_right: f32,
    pub border_bottom: f32,
    pub border_left: f32,
    pub border_color: Color,

    // Typography
    pub font_size: f32,
    pub font_weight: FontWeight,
    pub font_family: String,
    pub color: Color,
    pub text_align: TextAlign,
    pub line_height: f32,
    pub text_decoration: TextDecoration,
    pub text_transform: TextTransform,
    pub font_style: FontStyle,
    /// `white-space: nowrap`
    pub no_wrap: bool,

    // Background
    pub background_color: Color,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::Block,
            flex_direction: FlexDirection::Row,
            flex_wrap: FlexWrap::NoWrap,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            justify_content: JustifyContent::Start,
            align_items: AlignItems::Stretch,
            gap: 0.0,
            width: Dimension::Auto,
            height: Dimension::Auto,
            margin_top: 0.0,
            margin_right: 0.0,
            margin_bottom: 0.0,
            margin_left: 0.0,
            padding_top: 0.0,
            padding_right: 0.0,
            padding_bottom: 0.0,
            padding_left: 0.0,
            border_top: 0.0,
            border_right: 0.0,
            border_bottom: 0.0,
            border_left: 0.0,
            border_color: palette("gray-200").unwrap_or(Color::BLACK),
            font_size: 16.0,
            font_weight: FontWeight::Normal,
            font_family: "Helvetica".to_string(),
            color: Color::BLACK,
            text_align: TextAlign::Left,
            line_height: 1.5,
            text_decoration: TextDecoration::None,
            text_transform: TextTransform::None,
            font_style: FontStyle::Normal,
            no_wrap: false,
            background_color: Color::TRANSPARENT,
        }
    }
}

impl ComputedStyle {
    pub fn horizontal_insets(&self) -> f32 {
        self.padding_left + self.padding_right + self.border_left + self.border_right
    }

    pub fn vertical_insets(&self) -> f32 {
        self.padding_top + self.padding_bottom + self.border_top + self.border_bottom
    }

    pub fn has_border(&self) -> bool {
        self.border_top > 0.0
            || self.border_right > 0.0
            || self.border_bottom > 0.0
            || self.border_left > 0.0
    }

    fn set_border_all(&mut self, width: f32) {
        self.border_top = width;
        self.border_right = width;
        self.border_bottom = width;
        self.border_left = width;
    }

    /// Strip box-model properties that a text run must not inherit.
    fn clear_box(&mut self) {
        self.display = Display::Inline;
        self.set_border_all(0.0);
        self.background_color = Color::TRANSPARENT;
        self.margin_top = 0.0;
        self.margin_right = 0.0;
        self.margin_bottom = 0.0;
        self.margin_left = 0.0;
        self.padding_top = 0.0;
        self.padding_right = 0.0;
        self.padding_bottom = 0.0;
        self.padding_left = 0.0;
        self.width = Dimension::Auto;
        self.height = Dimension::Auto;
    }
}

// ---------------------------------------------------------------------------
// Supporting enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    Flex,
    Inline,
    InlineBlock,
    ListItem,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexDirection {
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexWrap {
    NoWrap,
    Wrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JustifyContent {
    Start,
    End,
    Center,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignItems {
    Start,
    End,
    Center,
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDecoration {
    None,
    Underline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTransform {
    None,
    Uppercase,
    Lowercase,
}

impl TextTransform {
    pub fn apply(self, text: &str) -> String {
        match self {
            TextTransform::None => text.to_string(),
            TextTransform::Uppercase => text.to_uppercase(),
            TextTransform::Lowercase => text.to_lowercase(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    Auto,
    Px(f32),
    Percent(f32),
}

/// RGBA colour (0.0 – 1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn is_transparent(&self) -> bool {
        self.a < 0.001
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() == 6 {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()? as f32 / 255.0;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()? as f32 / 255.0;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()? as f32 / 255.0;
            Some(Self { r, g, b, a: 1.0 })
        } else if hex.len() == 3 {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()? as f32 / 255.0;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()? as f32 / 255.0;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()? as f32 / 255.0;
            Some(Self { r, g, b, a: 1.0 })
        } else {
            None
        }
    }

    /// Parse `#rgb`, `#rrggbb` or `rgb(r, g, b)`.
    pub fn from_css(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(args) = value
            .strip_prefix("rgb(")
            .or_else(|| value.strip_prefix("rgba("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let parts: Vec<f32> = args
                .split(',')
                .filter_map(|p| p.trim().parse::<f32>().ok())
                .collect();
            if parts.len() < 3 {
                return None;
            }
            return Some(Self {
                r: (parts[0] / 255.0).clamp(0.0, 1.0),
                g: (parts[1] / 255.0).clamp(0.0, 1.0),
                b: (parts[2] / 255.0).clamp(0.0, 1.0),
                a: parts.get(3).copied().unwrap_or(1.0).clamp(0.0, 1.0),
            });
        }
        Self::from_hex(value)
    }
}

/// Tailwind palette subset used by the built-in templates.
const PALETTE: &[(&str, &str)] = &[
    ("gray-50", "#f9fafb"),
    ("gray-100", "#f3f4f6"),
    ("gray-200", "#e5e7eb"),
    ("gray-300", "#d1d5db"),
    ("gray-400", "#9ca3af"),
    ("gray-500", "#6b7280"),
    ("gray-600", "#4b5563"),
    ("gray-700", "#374151"),
    ("gray-800", "#1f2937"),
    ("gray-900", "#111827"),
    ("blue-100", "#dbeafe"),
    ("blue-500", "#3b82f6"),
    ("blue-600", "#2563eb"),
    ("blue-700", "#1d4ed8"),
    ("blue-800", "#1e40af"),
    ("indigo-50", "#eef2ff"),
    ("indigo-500", "#6366f1"),
    ("indigo-600", "#4f46e5"),
    ("indigo-800", "#3730a3"),
    ("indigo-900", "#312e81"),
    ("purple-50", "#faf5ff"),
    ("purple-300", "#d8b4fe"),
    ("purple-500", "#a855f7"),
    ("purple-600", "#9333ea"),
    ("purple-700", "#7e22ce"),
    ("red-500", "#ef4444"),
    ("green-500", "#22c55e"),
    ("white", "#ffffff"),
    ("black", "#000000"),
];

/// Look up a palette colour by its Tailwind name (`gray-700`, `white`, ...).
pub fn palette(name: &str) -> Option<Color> {
    PALETTE
        .iter()
        .find(|(n, _)| *n == name)
        .and_then(|(_, hex)| Color::from_hex(hex))
}

// ---------------------------------------------------------------------------
// Style resolution
// ---------------------------------------------------------------------------

/// Resolve the style for an element, inheriting text properties from its parent.
pub fn resolve_style(element: &ElementNode, parent: Option<&ComputedStyle>) -> ComputedStyle {
    let mut style = ComputedStyle::default();

    // Inherit text properties from parent
    if let Some(p) = parent {
        style.font_size = p.font_size;
        style.font_weight = p.font_weight;
        style.font_family = p.font_family.clone();
        style.color = p.color;
        style.text_align = p.text_align;
        style.line_height = p.line_height;
        style.font_style = p.font_style;
        style.text_decoration = p.text_decoration;
        style.text_transform = p.text_transform;
        style.no_wrap = p.no_wrap;
    }

    apply_tag_defaults(&mut style, &element.tag);

    // Apply Tailwind classes
    for class in element.classes() {
        apply_tailwind_class(&mut style, class);
    }

    // Apply inline style attribute
    if let Some(inline) = element.inline_style() {
        apply_inline_style(&mut style, inline);
    }

    style
}

/// Default styles based on tag semantics.
fn apply_tag_defaults(s: &mut ComputedStyle, tag: &Tag) {
    match tag {
        Tag::Li => s.display = Display::ListItem,
        Tag::Span | Tag::Br => s.display = Display::Inline,
        Tag::Strong => {
            s.display = Display::Inline;
            s.font_weight = FontWeight::Bold;
        }
        Tag::Em => {
            s.display = Display::Inline;
            s.font_style = FontStyle::Italic;
        }
        Tag::U => {
            s.display = Display::Inline;
            s.text_decoration = TextDecoration::Underline;
        }
        Tag::Unknown(_) | Tag::Head => s.display = Display::None,
        Tag::Div | Tag::P | Tag::H1 | Tag::H2 | Tag::H3 | Tag::Ul | Tag::Ol => {}
        Tag::Body | Tag::Html => {}
    }
}

/// Apply a single Tailwind utility class.
fn apply_tailwind_class(s: &mut ComputedStyle, class: &str) {
    match class {
        // Display
        "flex" => s.display = Display::Flex,
        "block" => s.display = Display::Block,
        "inline" => s.display = Display::Inline,
        "inline-block" => s.display = Display::InlineBlock,
        "hidden" => s.display = Display::None,

        // Flex direction
        "flex-row" => s.flex_direction = FlexDirection::Row,
        "flex-col" => s.flex_direction = FlexDirection::Column,

        // Flex wrap
        "flex-wrap" => s.flex_wrap = FlexWrap::Wrap,
        "flex-nowrap" => s.flex_wrap = FlexWrap::NoWrap,

        // Flex grow/shrink
        "flex-grow" | "grow" => s.flex_grow = 1.0,
        "flex-shrink" | "shrink" => s.flex_shrink = 1.0,
        "shrink-0" => s.flex_shrink = 0.0,
        "flex-1" => {
            s.flex_grow = 1.0;
            s.flex_shrink = 1.0;
        }

        // Justify content
        "justify-start" => s.justify_content = JustifyContent::Start,
        "justify-end" => s.justify_content = JustifyContent::End,
        "justify-center" => s.justify_content = JustifyContent::Center,
        "justify-between" => s.justify_content = JustifyContent::SpaceBetween,
        "justify-around" => s.justify_content = JustifyContent::SpaceAround,
        "justify-evenly" => s.justify_content = JustifyContent::SpaceEvenly,

        // Align items
        "items-start" => s.align_items = AlignItems::Start,
        "items-end" => s.align_items = AlignItems::End,
        "items-center" => s.align_items = AlignItems::Center,
        "items-stretch" => s.align_items = AlignItems::Stretch,

        // Font weight
        "font-semibold" | "font-bold" | "font-extrabold" => s.font_weight = FontWeight::Bold,
        "font-light" | "font-normal" | "font-medium" => s.font_weight = FontWeight::Normal,

        // Font style
        "italic" => s.font_style = FontStyle::Italic,
        "not-italic" => s.font_style = FontStyle::Normal,

        // Text decoration / transform
        "underline" => s.text_decoration = TextDecoration::Underline,
        "no-underline" => s.text_decoration = TextDecoration::None,
        "uppercase" => s.text_transform = TextTransform::Uppercase,
        "lowercase" => s.text_transform = TextTransform::Lowercase,
        "normal-case" => s.text_transform = TextTransform::None,
        "whitespace-nowrap" => s.no_wrap = true,
        "whitespace-normal" => s.no_wrap = false,

        // Text alignment
        "text-left" | "text-justify" => s.text_align = TextAlign::Left,
        "text-center" => s.text_align = TextAlign::Center,
        "text-right" => s.text_align = TextAlign::Right,

        // Font sizes carry their paired line height
        "text-xs" => set_font_size(s, 12.0, 16.0),
        "text-sm" => set_font_size(s, 14.0, 20.0),
        "text-base" => set_font_size(s, 16.0, 24.0),
        "text-lg" => set_font_size(s, 18.0, 28.0),
        "text-xl" => set_font_size(s, 20.0, 28.0),
        "text-2xl" => set_font_size(s, 24.0, 32.0),
        "text-3xl" => set_font_size(s, 30.0, 36.0),
        "text-4xl" => set_font_size(s, 36.0, 40.0),

        // Line height
        "leading-none" => s.line_height = 1.0,
        "leading-tight" => s.line_height = 1.25,
        "leading-snug" => s.line_height = 1.375,
        "leading-normal" => s.line_height = 1.5,
        "leading-relaxed" => s.line_height = 1.625,
        "leading-loose" => s.line_height = 2.0,

        // Width
        "w-full" => s.width = Dimension::Percent(100.0),
        "w-auto" => s.width = Dimension::Auto,
        "w-1/2" => s.width = Dimension::Percent(50.0),
        "w-1/3" => s.width = Dimension::Percent(33.333),
        "w-2/3" => s.width = Dimension::Percent(66.666),
        "w-1/4" => s.width = Dimension::Percent(25.0),
        "w-3/4" => s.width = Dimension::Percent(75.0),

        // Borders
        "border" => s.set_border_all(1.0),
        "border-0" => s.set_border_all(0.0),
        "border-2" => s.set_border_all(2.0),
        "border-4" => s.set_border_all(4.0),

        _ => {
            // Dynamic patterns
            if try_parse_border_side_class(s, class) {
                return;
            }
            try_parse_spacing_class(s, class);
            try_parse_color_class(s, class);
            try_parse_gap_class(s, class);
            try_parse_width_class(s, class);
            try_parse_height_class(s, class);
        }
    }
}

fn set_font_size(s: &mut ComputedStyle, size: f32, line_px: f32) {
    s.font_size = size;
    s.line_height = line_px / size;
}

/// `border-b`, `border-l-4`, `border-t-2`, ...
fn try_parse_border_side_class(s: &mut ComputedStyle, class: &str) -> bool {
    let Some(rest) = class.strip_prefix("border-") else {
        return false;
    };
    let (side, width) = match rest.split_once('-') {
        Some((side, w)) => match w.parse::<f32>() {
            Ok(w) => (side, w),
            Err(_) => return false,
        },
        None => (rest, 1.0),
    };
    match side {
        "t" => s.border_top = width,
        "r" => s.border_right = width,
        "b" => s.border_bottom = width,
        "l" => s.border_left = width,
        "x" => {
            s.border_left = width;
            s.border_right = width;
        }
        "y" => {
            s.border_top = width;
            s.border_bottom = width;
        }
        _ => return false,
    }
    true
}

fn try_parse_spacing_class(s: &mut ComputedStyle, class: &str) {
    // p-{n}, px-{n}, py-{n}, pt-{n}, etc.  (1 unit = 4px)
    // m-{n}, mx-{n}, my-{n}, mt-{n}, etc.
    let parts: Vec<&str> = class.rsplitn(2, '-').collect();
    if parts.len() != 2 {
        return;
    }
    let value_str = parts[0];
    let prefix = parts[1];
    let value: f32 = match value_str.parse::<f32>() {
        Ok(v) => v * 4.0,
        Err(_) => return,
    };

    match prefix {
        "p" => {
            s.padding_top = value;
            s.padding_right = value;
            s.padding_bottom = value;
            s.padding_left = value;
        }
        "px" => {
            s.padding_left = value;
            s.padding_right = value;
        }
        "py" => {
            s.padding_top = value;
            s.padding_bottom = value;
        }
        "pt" => s.padding_top = value,
        "pr" => s.padding_right = value,
        "pb" => s.padding_bottom = value,
        "pl" => s.padding_left = value,
        "m" => {
            s.margin_top = value;
            s.margin_right = value;
            s.margin_bottom = value;
            s.margin_left = value;
        }
        "mx" => {
            s.margin_left = value;
            s.margin_right = value;
        }
        "my" => {
            s.margin_top = value;
            s.margin_bottom = value;
        }
        "mt" => s.margin_top = value,
        "mr" => s.margin_right = value,
        "mb" => s.margin_bottom = value,
        "ml" => s.margin_left = value,
        _ => {}
    }
}

fn try_parse_color_class(s: &mut ComputedStyle, class: &str) {
    // text-{color}, bg-{color}, border-{color}; gradients keep their start
    // colour as a flat fill.
    if let Some(c) = class.strip_prefix("text-").and_then(palette) {
        s.color = c;
    } else if let Some(c) = class.strip_prefix("bg-").and_then(palette) {
        s.background_color = c;
    } else if let Some(c) = class.strip_prefix("from-").and_then(palette) {
        s.background_color = c;
    } else if let Some(c) = class.strip_prefix("border-").and_then(palette) {
        s.border_color = c;
    }
}

fn try_parse_gap_class(s: &mut ComputedStyle, class: &str) {
    if let Some(rest) = class.strip_prefix("gap-") {
        if let Ok(v) = rest.parse::<f32>() {
            s.gap = v * 4.0;
        }
    }
}

fn try_parse_width_class(s: &mut ComputedStyle, class: &str) {
    if let Some(rest) = class.strip_prefix("w-") {
        if let Ok(v) = rest.parse::<f32>() {
            s.width = Dimension::Px(v * 4.0);
        }
    }
}

fn try_parse_height_class(s: &mut ComputedStyle, class: &str) {
    if let Some(rest) = class.strip_prefix("h-") {
        if let Ok(v) = rest.parse::<f32>() {
            s.height = Dimension::Px(v * 4.0);
        }
    }
}

// ---------------------------------------------------------------------------
// Inline style parsing (limited subset)
// ---------------------------------------------------------------------------

fn apply_inline_style(s: &mut ComputedStyle, style_str: &str) {
    for decl in style_str.split(';') {
        let decl = decl.trim();
        if decl.is_empty() {
            continue;
        }
        let Some((prop, val)) = decl.split_once(':') else {
            continue;
        };
        apply_css_property(s, prop.trim(), val.trim());
    }
}

fn apply_css_property(s: &mut ComputedStyle, prop: &str, val: &str) {
    match prop {
        "display" => {
            s.display = match val {
                "flex" => Display::Flex,
                "block" => Display::Block,
                "inline" => Display::Inline,
                "inline-block" => Display::InlineBlock,
                "none" => Display::None,
                _ => s.display,
            }
        }
        "font-size" => {
            if let Some(px) = parse_length(val, s.font_size) {
                s.font_size = px;
            }
        }
        "font-weight" => {
            s.font_weight = match val {
                "bold" | "bolder" | "600" | "700" | "800" | "900" => FontWeight::Bold,
                _ => FontWeight::Normal,
            }
        }
        "font-style" => {
            s.font_style = match val {
                "italic" | "oblique" => FontStyle::Italic,
                _ => FontStyle::Normal,
            }
        }
        "text-decoration" | "text-decoration-line" => {
            s.text_decoration = if val.contains("underline") {
                TextDecoration::Underline
            } else {
                TextDecoration::None
            }
        }
        "color" => {
            if let Some(c) = Color::from_css(val) {
                s.color = c;
            }
        }
        "background-color" | "background" => {
            if let Some(c) = Color::from_css(val) {
                s.background_color = c;
            }
        }
        "text-align" => {
            s.text_align = match val {
                "center" => TextAlign::Center,
                "right" => TextAlign::Right,
                _ => TextAlign::Left,
            }
        }
        "width" => {
            s.width = parse_dimension(val);
        }
        "height" => {
            s.height = parse_dimension(val);
        }
        "margin" => apply_shorthand_spacing(
            val,
            &mut s.margin_top,
            &mut s.margin_right,
            &mut s.margin_bottom,
            &mut s.margin_left,
        ),
        "margin-top" => set_px(&mut s.margin_top, val),
        "margin-right" => set_px(&mut s.margin_right, val),
        "margin-bottom" => set_px(&mut s.margin_bottom, val),
        "margin-left" => set_px(&mut s.margin_left, val),
        "padding" => apply_shorthand_spacing(
            val,
            &mut s.padding_top,
            &mut s.padding_right,
            &mut s.padding_bottom,
            &mut s.padding_left,
        ),
        "padding-top" => set_px(&mut s.padding_top, val),
        "padding-right" => set_px(&mut s.padding_right, val),
        "padding-bottom" => set_px(&mut s.padding_bottom, val),
        "padding-left" => set_px(&mut s.padding_left, val),
        "border-width" => {
            if let Some(px) = parse_px(val) {
                s.set_border_all(px);
            }
        }
        "border-color" => {
            if let Some(c) = Color::from_css(val) {
                s.border_color = c;
            }
        }
        "line-height" => {
            if let Ok(v) = val.parse::<f32>() {
                s.line_height = v;
            } else if let Some(px) = parse_px(val) {
                s.line_height = px / s.font_size;
            }
        }
        "gap" => set_px(&mut s.gap, val),
        "white-space" => s.no_wrap = val == "nowrap",
        _ => {}
    }
}

fn set_px(target: &mut f32, val: &str) {
    if let Some(px) = parse_px(val) {
        *target = px;
    }
}

fn parse_px(s: &str) -> Option<f32> {
    let s = s.trim().trim_end_matches("px");
    s.parse().ok()
}

/// Lengths in `px`, `pt`, `em` or `rem` (relative to 16px root).
fn parse_length(s: &str, current_font_size: f32) -> Option<f32> {
    let s = s.trim();
    if let Some(v) = s.strip_suffix("rem") {
        return v.trim().parse::<f32>().ok().map(|v| v * 16.0);
    }
    if let Some(v) = s.strip_suffix("em") {
        return v.trim().parse::<f32>().ok().map(|v| v * current_font_size);
    }
    if let Some(v) = s.strip_suffix("pt") {
        return v.trim().parse::<f32>().ok().map(|v| v * 96.0 / 72.0);
    }
    parse_px(s)
}

fn parse_dimension(s: &str) -> Dimension {
    let s = s.trim();
    if s == "auto" {
        Dimension::Auto
    } else if s.ends_with('%') {
        s.trim_end_matches('%')
            .parse::<f32>()
            .map(Dimension::Percent)
            .unwrap_or(Dimension::Auto)
    } else {
        parse_px(s).map(Dimension::Px).unwrap_or(Dimension::Auto)
    }
}

fn apply_shorthand_spacing(
    val: &str,
    top: &mut f32,
    right: &mut f32,
    bottom: &mut f32,
    left: &mut f32,
) {
    let parts: Vec<f32> = val.split_whitespace().filter_map(parse_px).collect();
    match parts.len() {
        1 => {
            *top = parts[0];
            *right = parts[0];
            *bottom = parts[0];
            *left = parts[0];
        }
        2 => {
            *top = parts[0];
            *bottom = parts[0];
            *right = parts[1];
            *left = parts[1];
        }
        4 => {
            *top = parts[0];
            *right = parts[1];
            *bottom = parts[2];
            *left = parts[3];
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Styled DOM tree
// ---------------------------------------------------------------------------

/// A DOM node annotated with its computed style.
#[derive(Debug, Clone)]
pub enum StyledNode {
    Element {
        tag: Tag,
        style: ComputedStyle,
        children: Vec<StyledNode>,
    },
    Text {
        text: String,
        style: ComputedStyle,
    },
}

/// Build a styled tree from a DOM tree, resolving styles top-down.
pub fn build_styled_tree(
    nodes: &[DomNode],
    parent_style: Option<&ComputedStyle>,
) -> Vec<StyledNode> {
    let mut result = Vec::new();
    for node in nodes {
        match node {
            DomNode::Element(e) => {
                let style = resolve_style(e, parent_style);
                let children = build_styled_tree(&e.children, Some(&style));
                result.push(StyledNode::Element {
                    tag: e.tag.clone(),
                    style,
                    children,
                });
            }
            DomNode::Text(text) => {
                // Whitespace-only runs are kept; they separate inline words.
                if !text.is_empty() {
                    let mut style = parent_style.cloned().unwrap_or_default();
                    // Text nodes render inline; clear all box-model properties
                    // that must not be inherited (border, background, spacing).
                    style.clear_box();
                    result.push(StyledNode::Text {
                        text: text.clone(),
                        style,
                    });
                }
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    #[test]
    fn tailwind_padding() {
        let mut s = ComputedStyle::default();
        apply_tailwind_class(&mut s, "p-4");
        assert_eq!(s.padding_top, 16.0);
        assert_eq!(s.padding_left, 16.0);
    }

    #[test]
    fn border_side_classes() {
        let mut s = ComputedStyle::default();
        apply_tailwind_class(&mut s, "border-b");
        apply_tailwind_class(&mut s, "border-l-4");
        apply_tailwind_class(&mut s, "border-gray-300");
        assert_eq!(s.border_bottom, 1.0);
        assert_eq!(s.border_left, 4.0);
        assert_eq!(s.border_top, 0.0);
        assert_eq!(s.border_color, palette("gray-300").unwrap());
    }

    #[test]
    fn font_size_sets_paired_line_height() {
        let mut s = ComputedStyle::default();
        apply_tailwind_class(&mut s, "text-sm");
        assert_eq!(s.font_size, 14.0);
        assert!((s.font_size * s.line_height - 20.0).abs() < 0.01);
        apply_tailwind_class(&mut s, "leading-relaxed");
        assert_eq!(s.line_height, 1.625);
    }

    #[test]
    fn inline_style_font_size_and_color() {
        let mut s = ComputedStyle::default();
        apply_inline_style(&mut s, "font-size: 24px; color: #ff0000");
        assert_eq!(s.font_size, 24.0);
        assert!((s.color.r - 1.0).abs() < 0.01);

        apply_inline_style(&mut s, "font-size: 1.5rem; color: rgb(0, 128, 0)");
        assert_eq!(s.font_size, 24.0);
        assert!((s.color.g - 0.502).abs() < 0.01);
    }

    #[test]
    fn gradient_start_becomes_background() {
        let mut s = ComputedStyle::default();
        apply_tailwind_class(&mut s, "bg-gradient-to-r");
        apply_tailwind_class(&mut s, "from-indigo-500");
        assert_eq!(s.background_color, palette("indigo-500").unwrap());
    }

    #[test]
    fn text_inherits_from_parent_but_not_box() {
        let dom = parse_html(r#"<div class="text-sm text-gray-700 p-4 bg-gray-200">Hi</div>"#);
        let styled = build_styled_tree(&dom, None);
        let StyledNode::Element { children, .. } = &styled[0] else {
            panic!("expected element");
        };
        let StyledNode::Text { style, .. } = &children[0] else {
            panic!("expected text");
        };
        assert_eq!(style.font_size, 14.0);
        assert_eq!(style.color, palette("gray-700").unwrap());
        assert_eq!(style.padding_top, 0.0);
        assert!(style.background_color.is_transparent());
    }

    #[test]
    fn strong_is_bold_inline() {
        let dom = parse_html("<p><strong>x</strong></p>");
        let styled = build_styled_tree(&dom, None);
        let StyledNode::Element { children, .. } = &styled[0] else {
            panic!("expected element");
        };
        let StyledNode::Element { style, .. } = &children[0] else {
            panic!("expected strong");
        };
        assert_eq!(style.font_weight, FontWeight::Bold);
        assert_eq!(style.display, Display::Inline);
    }

    #[test]
    fn color_from_hex() {
        let c = Color::from_hex("#ff8800").unwrap();
        assert!((c.r - 1.0).abs() < 0.01);
        assert!((c.g - 0.533).abs() < 0.01);
    }
}
