//! C-compatible FFI API for embedding the engine in a host UI.
//!
//! # ABI Contract
//!
//! All exported functions use `extern "C"` calling convention and `#[no_mangle]`
//! to ensure stable symbol names.
//!
//! ## Memory management
//! - Buffers returned by `rf_*` functions are allocated on the Rust heap.
//! - Callers **must** free them with `rf_free_buffer` / `rf_free_string`.
//! - Passing a null pointer to a free function is a no-op.
//!
//! ## Error handling
//! - Functions that can fail return a `c_int` (0 = success, non-zero = error).
//! - Error details can be retrieved via `rf_last_error`.
//!
//! ## Thread safety
//! - `rf_last_error` uses a thread-local, so it is safe to call from
//!   multiple threads.
//!
//! ## Usage from C
//! ```c
//! #include "resume_forge.h"
//! uint8_t *pdf; uint32_t len;
//! if (rf_generate_pdf(json, strlen(json), NULL, &pdf, &len) == 0) {
//!     fwrite(pdf, 1, len, out);
//!     rf_free_buffer(pdf, len);
//! }
//! ```

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::slice;

use crate::geometry::{MarginSize, PageGeometry};
use crate::layout_config::ComposedLayout;
use crate::model::ResumeDocument;
use crate::pagination::page_count;
use crate::pipeline::{compute_layout_config, generate_pdf, EngineConfig};
use crate::scale::{resolve_scale, Viewport};
use crate::templates::TemplateId;

const RC_NULL_ARGUMENT: c_int = 1;
const RC_INVALID_UTF8: c_int = 2;
const RC_INVALID_INPUT: c_int = 3;
const RC_ENGINE_ERROR: c_int = 4;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

// ---------------------------------------------------------------------------
// C-compatible configuration types
// ---------------------------------------------------------------------------

/// Page margin preset.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub enum RfMarginSize {
    /// 10 mm (default).
    Small = 0,
    /// 15 mm.
    Medium = 1,
    /// 20 mm.
    Large = 2,
}

impl From<RfMarginSize> for MarginSize {
    fn from(m: RfMarginSize) -> Self {
        match m {
            RfMarginSize::Small => MarginSize::Small,
            RfMarginSize::Medium => MarginSize::Medium,
            RfMarginSize::Large => MarginSize::Large,
        }
    }
}

/// Built-in visual template.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub enum RfTemplateId {
    Classic = 0,
    Modern = 1,
    Minimal = 2,
    Professional = 3,
    Creative = 4,
}

impl From<RfTemplateId> for TemplateId {
    fn from(t: RfTemplateId) -> Self {
        match t {
            RfTemplateId::Classic => TemplateId::Classic,
            RfTemplateId::Modern => TemplateId::Modern,
            RfTemplateId::Minimal => TemplateId::Minimal,
            RfTemplateId::Professional => TemplateId::Professional,
            RfTemplateId::Creative => TemplateId::Creative,
        }
    }
}

/// Optional settings passed to the `rf_*` functions. Pass `NULL` for the
/// defaults (classic template, small margin, title "Resume").
#[repr(C)]
pub struct RfExportConfig {
    pub template: RfTemplateId,
    pub margin: RfMarginSize,
    /// Null-terminated UTF-8 document title. Pass `NULL` for "Resume".
    pub title: *const c_char,
}

/// Convert an optional `RfExportConfig` (FFI) to an `EngineConfig` (Rust).
///
/// # Safety
/// `cfg`, if non-null, must point to a valid `RfExportConfig` whose `title`
/// (if non-null) is a valid null-terminated string.
unsafe fn engine_config_from_c(cfg: *const RfExportConfig) -> EngineConfig {
    let mut config = EngineConfig::default();
    if cfg.is_null() {
        return config;
    }
    let cfg = &*cfg;
    config.template = cfg.template.into();
    config.margin = cfg.margin.into();
    if !cfg.title.is_null() {
        if let Ok(title) = CStr::from_ptr(cfg.title).to_str() {
            config.title = title.to_string();
        }
    }
    config
}

/// Decode the resume JSON argument, recording the error on failure.
///
/// # Safety
/// `json_ptr` must point to `json_len` valid bytes.
unsafe fn read_document(json_ptr: *const u8, json_len: u32) -> Result<ResumeDocument, c_int> {
    let bytes = slice::from_raw_parts(json_ptr, json_len as usize);
    let json = std::str::from_utf8(bytes).map_err(|e| {
        set_last_error(&format!("Invalid UTF-8: {e}"));
        RC_INVALID_UTF8
    })?;
    ResumeDocument::from_json(json).map_err(|e| {
        set_last_error(&format!("Invalid resume JSON: {e}"));
        RC_INVALID_INPUT
    })
}

/// # Safety
/// `out_buf` and `out_len` must be valid pointers.
unsafe fn write_buffer(bytes: Vec<u8>, out_buf: *mut *mut u8, out_len: *mut u32) {
    let len = bytes.len() as u32;
    let buf = bytes.into_boxed_slice();
    *out_buf = Box::into_raw(buf) as *mut u8;
    *out_len = len;
}

/// # Safety
/// `out_json_ptr` must be a valid pointer.
unsafe fn write_json(layout: &ComposedLayout, out_json_ptr: *mut *mut c_char) -> c_int {
    match CString::new(layout.to_json()) {
        Ok(cs) => {
            *out_json_ptr = cs.into_raw();
            0
        }
        Err(_) => {
            *out_json_ptr = ptr::null_mut();
            set_last_error("JSON contained null byte");
            RC_ENGINE_ERROR
        }
    }
}

// ---------------------------------------------------------------------------
// Core API
// ---------------------------------------------------------------------------

/// Generate a PDF from a resume document in JSON form.
///
/// # Parameters
/// - `json_ptr`: pointer to UTF-8 JSON bytes (not necessarily null-terminated)
/// - `json_len`: length of the JSON data in bytes
/// - `cfg`: optional pointer to an [`RfExportConfig`]; pass `NULL` for defaults
/// - `out_buf`: on success, receives a pointer to heap-allocated PDF bytes
/// - `out_len`: on success, receives the length of the PDF buffer
///
/// # Returns
/// `0` on success, non-zero on error. On error, call `rf_last_error`.
///
/// # Safety
/// - `json_ptr` must point to `json_len` valid bytes.
/// - `cfg`, if non-null, must point to a valid [`RfExportConfig`].
/// - `out_buf` and `out_len` must be valid pointers.
/// - The caller must free `*out_buf` by calling `rf_free_buffer`.
#[no_mangle]
pub unsafe extern "C" fn rf_generate_pdf(
    json_ptr: *const u8,
    json_len: u32,
    cfg: *const RfExportConfig,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    if json_ptr.is_null() || out_buf.is_null() || out_len.is_null() {
        set_last_error("Null pointer argument");
        return RC_NULL_ARGUMENT;
    }
    let doc = match read_document(json_ptr, json_len) {
        Ok(doc) => doc,
        Err(rc) => return rc,
    };

    match generate_pdf(&doc, &engine_config_from_c(cfg)) {
        Ok((pdf_bytes, _)) => {
            write_buffer(pdf_bytes, out_buf, out_len);
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            RC_ENGINE_ERROR
        }
    }
}

/// Generate a PDF and also return the captured layout as JSON.
///
/// # Safety
/// Same as `rf_generate_pdf`. Additionally, `*out_json_ptr` must be freed
/// with `rf_free_string`.
#[no_mangle]
pub unsafe extern "C" fn rf_generate_pdf_with_layout(
    json_ptr: *const u8,
    json_len: u32,
    cfg: *const RfExportConfig,
    out_pdf_buf: *mut *mut u8,
    out_pdf_len: *mut u32,
    out_json_ptr: *mut *mut c_char,
) -> c_int {
    if json_ptr.is_null() || out_pdf_buf.is_null() || out_pdf_len.is_null() || out_json_ptr.is_null()
    {
        set_last_error("Null pointer argument");
        return RC_NULL_ARGUMENT;
    }
    let doc = match read_document(json_ptr, json_len) {
        Ok(doc) => doc,
        Err(rc) => return rc,
    };

    match generate_pdf(&doc, &engine_config_from_c(cfg)) {
        Ok((pdf_bytes, layout)) => {
            write_buffer(pdf_bytes, out_pdf_buf, out_pdf_len);
            write_json(&layout, out_json_ptr)
        }
        Err(e) => {
            set_last_error(&e.to_string());
            RC_ENGINE_ERROR
        }
    }
}

/// Compute the preview layout (pages, offsets, scale, badges) as JSON
/// without rendering a PDF.
///
/// `container_width` and `window_height` describe the host's preview area in
/// CSS pixels.
///
/// # Safety
/// Same as `rf_generate_pdf`; `*out_json_ptr` must be freed with
/// `rf_free_string`.
#[no_mangle]
pub unsafe extern "C" fn rf_compute_layout(
    json_ptr: *const u8,
    json_len: u32,
    cfg: *const RfExportConfig,
    container_width: f32,
    window_height: f32,
    out_json_ptr: *mut *mut c_char,
) -> c_int {
    if json_ptr.is_null() || out_json_ptr.is_null() {
        set_last_error("Null pointer argument");
        return RC_NULL_ARGUMENT;
    }
    let doc = match read_document(json_ptr, json_len) {
        Ok(doc) => doc,
        Err(rc) => return rc,
    };

    let viewport = Viewport {
        container_width,
        window_height,
    };
    match compute_layout_config(&doc, &engine_config_from_c(cfg), viewport) {
        Ok(layout) => write_json(&layout, out_json_ptr),
        Err(e) => {
            set_last_error(&e.to_string());
            RC_ENGINE_ERROR
        }
    }
}

/// Render a PDF from a layout JSON string previously returned by
/// `rf_compute_layout` or `rf_generate_pdf_with_layout`.
///
/// # Safety
/// `json_ptr` must be a valid null-terminated string; `out_buf` and
/// `out_len` must be valid pointers.
#[no_mangle]
pub unsafe extern "C" fn rf_render_from_layout(
    json_ptr: *const c_char,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    if json_ptr.is_null() || out_buf.is_null() || out_len.is_null() {
        set_last_error("Null pointer argument");
        return RC_NULL_ARGUMENT;
    }

    let json = match CStr::from_ptr(json_ptr).to_str() {
        Ok(s) => s,
        Err(e) => {
            set_last_error(&format!("Invalid UTF-8 in JSON: {e}"));
            return RC_INVALID_UTF8;
        }
    };

    let layout = match ComposedLayout::from_json(json) {
        Ok(l) => l,
        Err(e) => {
            set_last_error(&format!("Invalid layout JSON: {e}"));
            return RC_INVALID_INPUT;
        }
    };

    match crate::render::render_pdf(&layout) {
        Ok(pdf_bytes) => {
            write_buffer(pdf_bytes, out_buf, out_len);
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            RC_ENGINE_ERROR
        }
    }
}

/// Number of A4 pages needed for `content_height` px of content at the given
/// margin. Returns `-1` on invalid input.
#[no_mangle]
pub extern "C" fn rf_page_count(content_height: f32, margin: RfMarginSize) -> c_int {
    let geometry = PageGeometry::a4(margin.into());
    match page_count(content_height, geometry.printable_height_px()) {
        Ok(n) => n as c_int,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Display scale for a page in the given available space.
#[no_mangle]
pub extern "C" fn rf_resolve_scale(
    available_width: f32,
    available_height: f32,
    page_width_px: f32,
    page_height_px: f32,
) -> f32 {
    resolve_scale(available_width, available_height, page_width_px, page_height_px)
}

// ---------------------------------------------------------------------------
// Memory management
// ---------------------------------------------------------------------------

/// Free a PDF buffer returned by `rf_generate_pdf` or similar.
///
/// # Safety
/// `buf` must have been returned by a previous `rf_*` call, and `len` must be
/// the corresponding length.
#[no_mangle]
pub unsafe extern "C" fn rf_free_buffer(buf: *mut u8, len: u32) {
    if !buf.is_null() {
        let _ = Box::from_raw(slice::from_raw_parts_mut(buf, len as usize));
    }
}

/// Free a layout JSON string.
///
/// # Safety
/// `s` must have been returned by Rust's `CString::into_raw`.
#[no_mangle]
pub unsafe extern "C" fn rf_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

/// Retrieve the last error message. Returns a null-terminated string.
///
/// The returned pointer is valid until the next `rf_*` call on the same
/// thread. The caller should **not** free this pointer.
///
/// Returns null if no error has occurred.
#[no_mangle]
pub extern "C" fn rf_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        let borrow = e.borrow();
        match borrow.as_ref() {
            Some(cs) => cs.as_ptr(),
            None => ptr::null(),
        }
    })
}

/// Return the library version as a null-terminated string.
/// The caller must **not** free this pointer.
#[no_mangle]
pub extern "C" fn rf_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
