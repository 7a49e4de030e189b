//! Live preview – keeps the measured content, page windows and display scale
//! in step with the document, template, margin and viewport.
//!
//! Every input that affects the result is part of [`PreviewInputs`]; the
//! layout is recomputed exactly when that list changes. Content changes
//! are measured at once and measured again after a short settle delay, so a
//! host that finishes its own rendering late still ends up with the final
//! height.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::compositor::{compose, ComposeOptions};
use crate::content::render_content;
use crate::error::Result;
use crate::export::{export_file_name, Exporter};
use crate::fonts::FontManager;
use crate::geometry::{MarginSize, PageGeometry};
use crate::layout_config::ComposedLayout;
use crate::model::ResumeDocument;
use crate::pagination::{paginate, PageWindow};
use crate::pipeline::{EngineConfig, RenderMode};
use crate::probe::{ContentBlock, HeightProber};
use crate::render::PdfCapture;
use crate::scale::{ScalePolicy, Viewport};
use crate::templates::{TemplateId, TemplateRegistry};

/// Dependency list of the preview layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewInputs {
    pub document_hash: u64,
    pub template: TemplateId,
    pub margin: MarginSize,
    pub viewport: Viewport,
    /// Bumped each time the settle delay elapses.
    pub settle_tick: u64,
}

impl PreviewInputs {
    /// Whether the content must be measured again, as opposed to only
    /// rescaled. The viewport is not compared: measurement does not depend
    /// on it, so a resize only refits the scale.
    fn needs_measure(&self, previous: &PreviewInputs) -> bool {
        self.document_hash != previous.document_hash
            || self.template != previous.template
            || self.margin != previous.margin
            || self.settle_tick != previous.settle_tick
    }
}

#[derive(Debug, Clone)]
pub enum PreviewEvent {
    ContentChanged(ResumeDocument),
    TemplateChanged(TemplateId),
    MarginChanged(MarginSize),
    ViewportResized(Viewport),
}

/// Scale and page windows for one set of inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewLayout {
    pub scale: f32,
    pub slice_height: f32,
    pub content_height: f32,
    pub windows: Vec<PageWindow>,
}

impl PreviewLayout {
    pub fn page_count(&self) -> usize {
        self.windows.len()
    }
}

/// Scale and windows from a measured height. Pure: equal arguments give
/// equal layouts.
pub fn recompute(
    content_height: f32,
    geometry: &PageGeometry,
    viewport: Viewport,
    policy: &ScalePolicy,
) -> Result<PreviewLayout> {
    let slice_height = geometry.printable_height_px();
    let windows = paginate(content_height, slice_height)?;
    let scale = policy.resolve(viewport, geometry);
    log::debug!(
        "recompute: height {content_height:.1}px, slice {slice_height:.1}px -> {} page(s) at scale {scale:.3}",
        windows.len()
    );
    Ok(PreviewLayout {
        scale,
        slice_height,
        content_height,
        windows,
    })
}

pub struct Preview {
    config: EngineConfig,
    registry: TemplateRegistry,
    fonts: FontManager,
    document: ResumeDocument,
    template: TemplateId,
    margin: MarginSize,
    viewport: Viewport,
    settle_tick: u64,
    settle_deadline: Option<Instant>,
    inputs: PreviewInputs,
    geometry: PageGeometry,
    block: ContentBlock,
    layout: PreviewLayout,
}

impl Preview {
    /// A preview of the blank document.
    pub fn new(config: EngineConfig, viewport: Viewport) -> Result<Self> {
        Self::with_document(config, viewport, ResumeDocument::default())
    }

    pub fn with_document(
        config: EngineConfig,
        viewport: Viewport,
        document: ResumeDocument,
    ) -> Result<Self> {
        Self::with_parts(
            config,
            viewport,
            document,
            TemplateRegistry::builtin(),
            FontManager::default(),
        )
    }

    pub fn with_parts(
        config: EngineConfig,
        viewport: Viewport,
        document: ResumeDocument,
        registry: TemplateRegistry,
        fonts: FontManager,
    ) -> Result<Self> {
        let geometry = config.geometry()?;
        let inputs = PreviewInputs {
            document_hash: document.content_hash(),
            template: config.template,
            margin: config.margin,
            viewport,
            settle_tick: 0,
        };
        let block = measure(&fonts, &registry, &document, config.template, &geometry);
        let layout = recompute(block.height, &geometry, viewport, &config.scale_policy)?;
        Ok(Self {
            template: config.template,
            margin: config.margin,
            config,
            registry,
            fonts,
            document,
            viewport,
            settle_tick: 0,
            settle_deadline: None,
            inputs,
            geometry,
            block,
            layout,
        })
    }

    /// Apply an edit. Returns whether the page windows or scale changed.
    ///
    /// Content, template and margin changes also schedule a settle
    /// re-measurement; a resize only rescales.
    pub fn handle(&mut self, event: PreviewEvent, now: Instant) -> Result<bool> {
        let affects_content = !matches!(event, PreviewEvent::ViewportResized(_));
        match event {
            PreviewEvent::ContentChanged(doc) => self.document = doc,
            PreviewEvent::TemplateChanged(id) => self.template = id,
            PreviewEvent::MarginChanged(margin) => self.margin = margin,
            PreviewEvent::ViewportResized(viewport) => self.viewport = viewport,
        }
        let changed = self.refresh()?;
        if affects_content {
            self.schedule_settle(now);
        }
        Ok(changed)
    }

    fn schedule_settle(&mut self, now: Instant) {
        self.settle_deadline = Some(now + Duration::from_millis(self.config.settle_delay_ms));
    }

    /// Re-measure once the settle delay has passed. Returns whether the
    /// layout changed.
    pub fn poll_settle(&mut self, now: Instant) -> Result<bool> {
        match self.settle_deadline {
            Some(deadline) if now >= deadline => {
                self.settle_deadline = None;
                self.settle_tick += 1;
                self.refresh()
            }
            _ => Ok(false),
        }
    }

    /// Whether a settle re-measurement is still pending.
    pub fn settle_pending(&self) -> bool {
        self.settle_deadline.is_some()
    }

    fn current_inputs(&self) -> PreviewInputs {
        PreviewInputs {
            document_hash: self.document.content_hash(),
            template: self.template,
            margin: self.margin,
            viewport: self.viewport,
            settle_tick: self.settle_tick,
        }
    }

    fn refresh(&mut self) -> Result<bool> {
        let inputs = self.current_inputs();
        if inputs == self.inputs {
            return Ok(false);
        }

        if inputs.margin != self.inputs.margin {
            self.geometry = self.config.geometry_with_margin(inputs.margin)?;
        }
        if inputs.needs_measure(&self.inputs) {
            self.block = measure(
                &self.fonts,
                &self.registry,
                &self.document,
                self.template,
                &self.geometry,
            );
        }

        let layout = recompute(
            self.block.height,
            &self.geometry,
            self.viewport,
            &self.config.scale_policy,
        )?;
        let changed = layout != self.layout;
        self.layout = layout;
        self.inputs = inputs;
        Ok(changed)
    }

    /// Restore the blank document and the configured template. Persisted
    /// state is left alone; clear it with [`crate::storage::clear_all`].
    pub fn reset(&mut self, now: Instant) -> Result<bool> {
        self.document = ResumeDocument::default();
        self.template = self.config.template;
        let changed = self.refresh()?;
        self.schedule_settle(now);
        Ok(changed)
    }

    pub fn document(&self) -> &ResumeDocument {
        &self.document
    }

    pub fn template(&self) -> TemplateId {
        self.template
    }

    pub fn margin(&self) -> MarginSize {
        self.margin
    }

    pub fn inputs(&self) -> &PreviewInputs {
        &self.inputs
    }

    pub fn layout(&self) -> &PreviewLayout {
        &self.layout
    }

    pub fn scale(&self) -> f32 {
        self.layout.scale
    }

    pub fn page_count(&self) -> usize {
        self.layout.page_count()
    }

    pub fn content_height(&self) -> f32 {
        self.layout.content_height
    }

    /// The pages as they would be drawn.
    pub fn compose(&self, mode: RenderMode) -> ComposedLayout {
        let (scale, show_badges) = match mode {
            RenderMode::Preview => (self.layout.scale, self.config.show_page_badges),
            RenderMode::Export => (1.0, false),
        };
        let options = ComposeOptions {
            show_badges,
            title: self.config.title.clone(),
        };
        compose(
            &self.block,
            &self.layout.windows,
            &self.geometry,
            scale,
            &options,
        )
    }

    /// Capture the preview pages into a PDF.
    pub fn export_pdf(&self, exporter: &Exporter) -> Result<Vec<u8>> {
        let surface = self.compose(RenderMode::Preview);
        let mut capture = PdfCapture::for_layout(&surface);
        exporter.export(&surface, self.page_count(), &mut capture)
    }

    /// Capture the preview pages and save them as `resume_<name>.pdf` in
    /// `dir`.
    pub fn export_to_dir(&self, exporter: &Exporter, dir: &Path) -> Result<PathBuf> {
        let surface = self.compose(RenderMode::Preview);
        let mut capture = PdfCapture::for_layout(&surface);
        let file_name = export_file_name(&self.document.personal);
        exporter.export_to_file(&surface, self.page_count(), &mut capture, dir, &file_name)
    }
}

fn measure(
    fonts: &FontManager,
    registry: &TemplateRegistry,
    document: &ResumeDocument,
    template: TemplateId,
    geometry: &PageGeometry,
) -> ContentBlock {
    let content = render_content(document, registry.get(template));
    HeightProber::new(fonts).probe(Some(&content), geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExperienceItem;

    fn wide() -> Viewport {
        Viewport {
            container_width: 2000.0,
            window_height: 3000.0,
        }
    }

    fn long_document() -> ResumeDocument {
        let mut doc = ResumeDocument::default();
        doc.personal.name = "Ada Lovelace".into();
        doc.experience = (0..25)
            .map(|i| ExperienceItem {
                company: format!("Company {i}"),
                position: "Engineer".into(),
                start_date: "2020-01".into(),
                end_date: "2021-01".into(),
                description: "<p>Built analytical engines.</p><ul><li>Wrote programs</li><li>Fixed bugs</li></ul>"
                    .into(),
                is_current_position: false,
            })
            .collect();
        doc
    }

    #[test]
    fn recompute_is_idempotent() {
        let geometry = PageGeometry::default();
        let policy = ScalePolicy::default();
        let a = recompute(2500.0, &geometry, wide(), &policy).unwrap();
        let b = recompute(2500.0, &geometry, wide(), &policy).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.page_count(), 3);
        assert_eq!(a.windows[1].offset, a.slice_height);
    }

    #[test]
    fn blank_document_is_one_page() {
        let preview = Preview::new(EngineConfig::default(), wide()).unwrap();
        assert_eq!(preview.page_count(), 1);
        assert!(preview.content_height() > 0.0);
        assert_eq!(preview.scale(), 1.0);
    }

    #[test]
    fn unchanged_inputs_do_not_recompute() {
        let mut preview = Preview::new(EngineConfig::default(), wide()).unwrap();
        let now = Instant::now();
        let same = preview.document().clone();
        assert!(!preview.handle(PreviewEvent::ContentChanged(same), now).unwrap());
        assert!(!preview.handle(PreviewEvent::ViewportResized(wide()), now).unwrap());
    }

    #[test]
    fn resize_only_rescales() {
        let mut preview =
            Preview::with_document(EngineConfig::default(), wide(), long_document()).unwrap();
        let height = preview.content_height();
        let pages = preview.page_count();

        let narrow = Viewport {
            container_width: 440.0,
            window_height: 3000.0,
        };
        assert!(preview.handle(PreviewEvent::ViewportResized(narrow), Instant::now()).unwrap());
        assert!(preview.scale() < 1.0);
        assert_eq!(preview.content_height(), height);
        assert_eq!(preview.page_count(), pages);
        assert!(!preview.settle_pending());
    }

    #[test]
    fn long_content_spans_pages() {
        let preview =
            Preview::with_document(EngineConfig::default(), wide(), long_document()).unwrap();
        assert!(preview.page_count() >= 2);
        let layout = preview.layout();
        assert_eq!(layout.windows[1].offset, layout.slice_height);
    }

    #[test]
    fn larger_margin_never_reduces_pages() {
        let mut preview =
            Preview::with_document(EngineConfig::default(), wide(), long_document()).unwrap();
        let mut previous = preview.page_count();
        for margin in [MarginSize::Medium, MarginSize::Large] {
            preview
                .handle(PreviewEvent::MarginChanged(margin), Instant::now())
                .unwrap();
            assert_eq!(preview.margin(), margin);
            assert!(preview.page_count() >= previous);
            previous = preview.page_count();
        }
    }

    #[test]
    fn settle_remeasures_after_delay() {
        let mut preview = Preview::new(EngineConfig::default(), wide()).unwrap();
        let start = Instant::now();
        preview
            .handle(PreviewEvent::TemplateChanged(TemplateId::Modern), start)
            .unwrap();
        assert!(preview.settle_pending());

        assert!(!preview.poll_settle(start + Duration::from_millis(50)).unwrap());
        assert_eq!(preview.inputs().settle_tick, 0);

        preview.poll_settle(start + Duration::from_millis(100)).unwrap();
        assert_eq!(preview.inputs().settle_tick, 1);
        assert!(!preview.settle_pending());
    }

    #[test]
    fn reset_restores_blank_document() {
        let config = EngineConfig {
            template: TemplateId::Minimal,
            ..EngineConfig::default()
        };
        let mut preview = Preview::with_document(config, wide(), long_document()).unwrap();
        let now = Instant::now();
        preview
            .handle(PreviewEvent::TemplateChanged(TemplateId::Creative), now)
            .unwrap();

        assert!(preview.reset(now).unwrap());
        assert_eq!(preview.document(), &ResumeDocument::default());
        assert_eq!(preview.template(), TemplateId::Minimal);
        assert_eq!(preview.page_count(), 1);
    }

    #[test]
    fn export_captures_every_page() {
        let preview =
            Preview::with_document(EngineConfig::default(), wide(), long_document()).unwrap();
        let exporter = Exporter::new();
        let bytes = preview.export_pdf(&exporter).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");

        let dir = tempfile::tempdir().unwrap();
        let path = preview.export_to_dir(&exporter, dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "resume_ada_lovelace.pdf");
        assert!(path.exists());
    }

    #[test]
    fn export_layout_is_true_size_without_badges() {
        let preview = Preview::new(EngineConfig::default(), Viewport {
            container_width: 400.0,
            window_height: 600.0,
        })
        .unwrap();
        let shown = preview.compose(RenderMode::Preview);
        assert!(shown.scale < 1.0);
        assert!(shown.pages[0].badge.is_some());

        let captured = preview.compose(RenderMode::Export);
        assert_eq!(captured.scale, 1.0);
        assert!(captured.pages.iter().all(|p| p.badge.is_none()));
    }
}
