//! Export controller – captures every preview page in order and assembles
//! one multi-page document.
//!
//! Pages are located by element id, the way a host would find them on its
//! rendered surface. A missing page aborts the whole export; partial
//! documents are never produced.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::compositor::page_element_id;
use crate::error::{Error, Result};
use crate::layout_config::{ComposedLayout, ComposedPage};
use crate::model::PersonalInfo;

/// Somewhere rendered pages can be looked up by element id.
pub trait PageSurface {
    fn locate(&self, id: &str) -> Option<&ComposedPage>;
}

impl PageSurface for ComposedLayout {
    fn locate(&self, id: &str) -> Option<&ComposedPage> {
        self.pages.iter().find(|p| p.id == id)
    }
}

/// Rasterises or records pages and assembles the final document.
pub trait PageCapture {
    fn capture(&mut self, page: &ComposedPage) -> Result<()>;
    /// Assemble everything captured so far into document bytes.
    fn finish(&mut self) -> Result<Vec<u8>>;
}

/// Serialises exports: at most one runs at a time.
#[derive(Debug, Default)]
pub struct Exporter {
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the export ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_exporting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn begin(&self) -> Result<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::ExportInProgress)?;
        Ok(InFlight(&self.in_flight))
    }

    /// Capture pages 1..=`page_count` in order and return the assembled
    /// document. Badges are never part of the capture.
    pub fn export(
        &self,
        surface: &dyn PageSurface,
        page_count: usize,
        capture: &mut dyn PageCapture,
    ) -> Result<Vec<u8>> {
        let _guard = self.begin()?;
        log::info!("exporting {page_count} page(s)");

        for index in 0..page_count {
            let id = page_element_id(index);
            let page = surface.locate(&id).ok_or_else(|| {
                log::error!("export aborted: page element '{id}' not found");
                Error::MissingPage(index + 1)
            })?;
            capture.capture(&page.without_badge())?;
        }

        capture.finish()
    }

    /// Export and write the document to `dir/file_name`. Nothing is written
    /// unless every page was captured.
    pub fn export_to_file(
        &self,
        surface: &dyn PageSurface,
        page_count: usize,
        capture: &mut dyn PageCapture,
        dir: &Path,
        file_name: &str,
    ) -> Result<PathBuf> {
        let bytes = self.export(surface, page_count, capture)?;
        let path = dir.join(file_name);
        std::fs::write(&path, bytes)?;
        log::info!("saved {}", path.display());
        Ok(path)
    }
}

/// `resume_<name>.pdf`, with the name lower-cased and whitespace runs turned
/// into underscores; `resume.pdf` when there is no name.
pub fn export_file_name(personal: &PersonalInfo) -> String {
    let name = personal
        .name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase();
    if name.is_empty() {
        "resume.pdf".to_string()
    } else {
        format!("resume_{name}.pdf")
    }
}
