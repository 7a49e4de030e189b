//! Height prober – lays the content out once at the page's content width,
//! off-page, and reports its total height.

use crate::content::ContentTree;
use crate::fonts::FontManager;
use crate::geometry::PageGeometry;
use crate::layout::{compute_layout, PositionedBox};
use crate::Result;

/// The content laid out as a single continuous block.
#[derive(Debug, Clone)]
pub struct ContentBlock {
    /// Content width in px.
    pub width: f32,
    /// Total content height in px; never negative.
    pub height: f32,
    pub root: Option<PositionedBox>,
}

impl ContentBlock {
    pub fn empty(width: f32) -> Self {
        Self {
            width,
            height: 0.0,
            root: None,
        }
    }
}

pub struct HeightProber<'a> {
    fonts: &'a FontManager,
}

impl<'a> HeightProber<'a> {
    pub fn new(fonts: &'a FontManager) -> Self {
        Self { fonts }
    }

    /// Lay out `content` at the geometry's content width.
    pub fn measure(&self, content: &ContentTree, geometry: &PageGeometry) -> Result<ContentBlock> {
        let width = geometry.content_width_px();
        let root = compute_layout(&content.nodes, width, self.fonts)?;
        Ok(ContentBlock {
            width,
            height: root.height.max(0.0),
            root: Some(root),
        })
    }

    /// Like [`measure`](Self::measure), but an unavailable or failing
    /// measurement yields zero height instead of an error.
    pub fn probe(&self, content: Option<&ContentTree>, geometry: &PageGeometry) -> ContentBlock {
        let width = geometry.content_width_px();
        let Some(content) = content else {
            return ContentBlock::empty(width);
        };
        match self.measure(content, geometry) {
            Ok(block) => block,
            Err(e) => {
                log::warn!("content measurement failed, treating as empty: {e}");
                ContentBlock::empty(width)
            }
        }
    }
}
