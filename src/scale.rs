//! Scale resolver – picks the on-screen scale at which a whole page fits in
//! the available preview area.

use serde::{Deserialize, Serialize};

use crate::geometry::PageGeometry;

/// Smallest display scale; pages below this become illegible.
pub const MIN_SCALE: f32 = 0.3;
/// Largest display scale; pages are never shown above true size.
pub const MAX_SCALE: f32 = 1.0;

/// Preview surface dimensions reported by the host UI, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width of the preview container.
    pub container_width: f32,
    /// Height of the whole window.
    pub window_height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            container_width: 1280.0,
            window_height: 900.0,
        }
    }
}

/// Resolve the display scale with the default [`MIN_SCALE`, `MAX_SCALE`]
/// bounds.
pub fn resolve_scale(
    available_width: f32,
    available_height: f32,
    page_width_px: f32,
    page_height_px: f32,
) -> f32 {
    resolve_scale_within(
        available_width,
        available_height,
        page_width_px,
        page_height_px,
        MIN_SCALE,
        MAX_SCALE,
    )
}

/// Resolve the display scale: the smaller of the two per-axis fits (each
/// capped at 1.0), clamped to `[min_scale, max_scale]`.
pub fn resolve_scale_within(
    available_width: f32,
    available_height: f32,
    page_width_px: f32,
    page_height_px: f32,
    min_scale: f32,
    max_scale: f32,
) -> f32 {
    let width_scale = axis_scale(available_width, page_width_px);
    let height_scale = axis_scale(available_height, page_height_px);
    width_scale.min(height_scale).min(max_scale).max(min_scale)
}

fn axis_scale(available: f32, page: f32) -> f32 {
    if !available.is_finite() || !page.is_finite() || page <= 0.0 {
        return 1.0;
    }
    (available.max(0.0) / page).min(1.0)
}

/// How a [`Viewport`] translates into available preview space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalePolicy {
    /// Horizontal padding subtracted from the container width.
    pub container_padding_px: f32,
    /// Fraction of the window height a page may occupy.
    pub viewport_height_fraction: f32,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for ScalePolicy {
    fn default() -> Self {
        Self {
            container_padding_px: 40.0,
            viewport_height_fraction: 0.7,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
        }
    }
}

impl ScalePolicy {
    /// Scale for the given viewport and page geometry.
    pub fn resolve(&self, viewport: Viewport, geometry: &PageGeometry) -> f32 {
        let available_width = viewport.container_width - self.container_padding_px;
        let available_height = viewport.window_height * self.viewport_height_fraction;
        resolve_scale_within(
            available_width,
            available_height,
            geometry.page_width_px(),
            geometry.page_height_px(),
            self.min_scale,
            self.max_scale,
        )
    }
}
