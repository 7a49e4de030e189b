//! Pipeline – ties together content rendering, measurement, pagination,
//! composition and PDF export into single function calls.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compositor::{compose, ComposeOptions};
use crate::content::render_content;
use crate::error::Result;
use crate::export::Exporter;
use crate::fonts::FontManager;
use crate::geometry::{MarginSize, PageGeometry, A4_HEIGHT_MM, A4_WIDTH_MM};
use crate::layout_config::ComposedLayout;
use crate::model::ResumeDocument;
use crate::pagination::paginate;
use crate::probe::HeightProber;
use crate::render::PdfCapture;
use crate::scale::{ScalePolicy, Viewport};
use crate::templates::{TemplateId, TemplateRegistry};

/// Engine settings. Every field has a default, so a partial JSON file is a
/// valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub template: TemplateId,
    pub margin: MarginSize,
    /// Page width in mm (default: A4 = 210).
    pub page_width_mm: f32,
    /// Page height in mm (default: A4 = 297).
    pub page_height_mm: f32,
    pub scale_policy: ScalePolicy,
    /// Delay before the preview re-measures after a change.
    pub settle_delay_ms: u64,
    pub show_page_badges: bool,
    /// Document title embedded in the PDF metadata.
    pub title: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            template: TemplateId::default(),
            margin: MarginSize::default(),
            page_width_mm: A4_WIDTH_MM,
            page_height_mm: A4_HEIGHT_MM,
            scale_policy: ScalePolicy::default(),
            settle_delay_ms: 100,
            show_page_badges: true,
            title: "Resume".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Page geometry for the configured size and margin.
    pub fn geometry(&self) -> Result<PageGeometry> {
        self.geometry_with_margin(self.margin)
    }

    pub fn geometry_with_margin(&self, margin: MarginSize) -> Result<PageGeometry> {
        PageGeometry::new(self.page_width_mm, self.page_height_mm, margin.mm())
    }
}

/// Whether a layout is for the on-screen preview or for capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Scaled to the viewport, with page badges when enabled.
    Preview,
    /// True size, no badges.
    Export,
}

/// Full pipeline with explicit templates and fonts: document → composed pages.
pub fn render_layout_with(
    doc: &ResumeDocument,
    config: &EngineConfig,
    viewport: Viewport,
    mode: RenderMode,
    registry: &TemplateRegistry,
    fonts: &FontManager,
) -> Result<ComposedLayout> {
    // 1. Geometry
    let geometry = config.geometry()?;

    // 2. Render and style the content
    let content = render_content(doc, registry.get(config.template));

    // 3. Measure it as one block
    let block = HeightProber::new(fonts).probe(Some(&content), &geometry);

    // 4. Paginate
    let windows = paginate(block.height, geometry.printable_height_px())?;

    // 5. Compose pages
    let (scale, show_badges) = match mode {
        RenderMode::Preview => (
            config.scale_policy.resolve(viewport, &geometry),
            config.show_page_badges,
        ),
        RenderMode::Export => (1.0, false),
    };
    let options = ComposeOptions {
        show_badges,
        title: config.title.clone(),
    };
    Ok(compose(&block, &windows, &geometry, scale, &options))
}

/// Preview layout with the built-in templates and default fonts.
pub fn compute_layout_config(
    doc: &ResumeDocument,
    config: &EngineConfig,
    viewport: Viewport,
) -> Result<ComposedLayout> {
    render_layout_with(
        doc,
        config,
        viewport,
        RenderMode::Preview,
        &TemplateRegistry::builtin(),
        &FontManager::default(),
    )
}

/// Full pipeline: resume → PDF bytes.
///
/// Returns `(pdf_bytes, layout)`, where `layout` is what was captured.
pub fn generate_pdf(doc: &ResumeDocument, config: &EngineConfig) -> Result<(Vec<u8>, ComposedLayout)> {
    generate_pdf_with_fonts(doc, config, &FontManager::default())
}

pub fn generate_pdf_with_fonts(
    doc: &ResumeDocument,
    config: &EngineConfig,
    fonts: &FontManager,
) -> Result<(Vec<u8>, ComposedLayout)> {
    let layout = render_layout_with(
        doc,
        config,
        Viewport::default(),
        RenderMode::Export,
        &TemplateRegistry::builtin(),
        fonts,
    )?;
    let mut capture = PdfCapture::for_layout(&layout);
    let bytes = Exporter::new().export(&layout, layout.page_count(), &mut capture)?;
    Ok((bytes, layout))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> ResumeDocument {
        let mut doc = ResumeDocument::default();
        doc.personal.name = name.to_string();
        doc
    }

    #[test]
    fn pipeline_basic() {
        let (bytes, layout) = generate_pdf(&named("Ada"), &EngineConfig::default()).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
        assert_eq!(layout.page_count(), 1);
        assert_eq!(layout.scale, 1.0);
        assert!(layout.pages.iter().all(|p| p.badge.is_none()));
    }

    #[test]
    fn preview_layout_is_scaled_and_badged() {
        let viewport = Viewport {
            container_width: 500.0,
            window_height: 2000.0,
        };
        let layout = compute_layout_config(&named("Ada"), &EngineConfig::default(), viewport).unwrap();
        assert!(layout.scale < 1.0);
        assert_eq!(layout.pages[0].badge.as_deref(), Some("Page 1 of 1"));
    }

    #[test]
    fn partial_config_json_uses_defaults() {
        let config = EngineConfig::from_json(r#"{ "template": "modern", "margin": "large" }"#).unwrap();
        assert_eq!(config.template, TemplateId::Modern);
        assert_eq!(config.margin, MarginSize::Large);
        assert_eq!(config.settle_delay_ms, 100);
        assert_eq!(config.page_width_mm, 210.0);
    }

    #[test]
    fn invalid_page_size_is_rejected() {
        let config = EngineConfig {
            page_height_mm: 30.0,
            margin: MarginSize::Large,
            ..EngineConfig::default()
        };
        assert!(generate_pdf(&named("Ada"), &config).is_err());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{ "show_page_badges": false }"#).unwrap();
        let config = EngineConfig::load(&path).unwrap();
        assert!(!config.show_page_badges);
    }
}
