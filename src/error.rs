//! Error types for the resume engine.

use std::io;
use thiserror::Error;

/// Result type alias for resume-forge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the engine.
///
/// Measurement and storage problems are recovered locally (zero height,
/// default state) and never reach callers; export problems always do.
#[derive(Error, Debug)]
pub enum Error {
    /// Page dimensions or margin that leave no printable area.
    #[error("Invalid page geometry: {0}")]
    InvalidGeometry(String),

    /// Pagination requires a strictly positive slice height.
    #[error("Slice height must be positive, got {0}")]
    InvalidSliceHeight(f32),

    /// Content would need more pages than the engine will lay out.
    #[error("Content height {0}px needs more than {max} pages", max = crate::pagination::MAX_PAGES)]
    ContentTooTall(f32),

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Unknown margin size: {0} (expected small, medium or large)")]
    UnknownMargin(String),

    /// The layout engine rejected the content tree.
    #[error("Layout error: {0}")]
    Layout(String),

    /// A page the export expected (1-based) could not be located.
    #[error("Preview page {0} not found")]
    MissingPage(usize),

    #[error("An export is already in progress")]
    ExportInProgress,

    /// The capture backend failed on a page.
    #[error("Page capture failed: {0}")]
    Capture(String),

    #[error("Font error: {0}")]
    Font(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
