//! # resume-forge – Paginated resume rendering and PDF export
//!
//! This crate turns a structured resume document into print-accurate A4
//! pages for on-screen preview and for PDF export. The pipeline stages are:
//!
//! 1. **Content** – resume + template → element tree ([`content`], [`dom`])
//! 2. **Style** – apply Tailwind-like utility classes ([`style`])
//! 3. **Measure** – lay the whole document out as one block with Taffy
//!    ([`layout`], [`probe`])
//! 4. **Paginate** – slice the block into page windows ([`pagination`])
//! 5. **Compose** – clip each window into a page box, scaled for display
//!    ([`compositor`], [`scale`])
//! 6. **Export** – capture the pages in order into one PDF ([`export`],
//!    [`render`])
//!
//! [`preview`] keeps all of this current as the document, template, margin
//! and viewport change. [`storage`] persists editor state between sessions.
//! A C-compatible FFI surface is exposed via the [`ffi`] module.

pub mod compositor;
pub mod content;
pub mod dom;
pub mod error;
pub mod export;
pub mod ffi;
pub mod fonts;
pub mod geometry;
pub mod layout;
pub mod layout_config;
pub mod model;
pub mod pagination;
pub mod pipeline;
pub mod preview;
pub mod probe;
pub mod render;
pub mod scale;
pub mod storage;
pub mod style;
pub mod templates;

// Re-exports for convenience
pub use error::{Error, Result};
pub use geometry::{MarginSize, PageGeometry};
pub use model::ResumeDocument;
pub use pipeline::{compute_layout_config, generate_pdf, EngineConfig};
pub use preview::{Preview, PreviewEvent};
pub use templates::TemplateId;
