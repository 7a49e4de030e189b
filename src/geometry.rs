//! Physical page geometry – A4 paper, selectable margins, and the
//! millimetre → pixel conversion shared by layout, pagination and export.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A4 width in millimetres.
pub const A4_WIDTH_MM: f32 = 210.0;
/// A4 height in millimetres.
pub const A4_HEIGHT_MM: f32 = 297.0;
/// Approximate CSS pixels per millimetre at 96 DPI.
pub const MM_TO_PX: f32 = 3.78;

/// User-selectable page margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginSize {
    /// 10 mm (default).
    #[default]
    Small,
    /// 15 mm.
    Medium,
    /// 20 mm.
    Large,
}

impl MarginSize {
    pub const ALL: [MarginSize; 3] = [MarginSize::Small, MarginSize::Medium, MarginSize::Large];

    /// Margin width in millimetres, applied on all four sides.
    pub fn mm(self) -> f32 {
        match self {
            MarginSize::Small => 10.0,
            MarginSize::Medium => 15.0,
            MarginSize::Large => 20.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MarginSize::Small => "small",
            MarginSize::Medium => "medium",
            MarginSize::Large => "large",
        }
    }
}

impl FromStr for MarginSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(MarginSize::Small),
            "medium" => Ok(MarginSize::Medium),
            "large" => Ok(MarginSize::Large),
            other => Err(Error::UnknownMargin(other.to_string())),
        }
    }
}

impl fmt::Display for MarginSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page size and margin in millimetres.
///
/// Invariant: `2 * margin_mm` is strictly smaller than both the page width and
/// the page height, so the printable area is never empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    width_mm: f32,
    height_mm: f32,
    margin_mm: f32,
}

impl PageGeometry {
    /// A4 portrait with one of the preset margins.
    pub fn a4(margin: MarginSize) -> Self {
        Self {
            width_mm: A4_WIDTH_MM,
            height_mm: A4_HEIGHT_MM,
            margin_mm: margin.mm(),
        }
    }

    /// Custom geometry; rejects margins that leave no printable area.
    pub fn new(width_mm: f32, height_mm: f32, margin_mm: f32) -> Result<Self> {
        let finite = width_mm.is_finite() && height_mm.is_finite() && margin_mm.is_finite();
        if !finite || margin_mm < 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "{width_mm}×{height_mm} mm with {margin_mm} mm margin"
            )));
        }
        if margin_mm * 2.0 >= width_mm || margin_mm * 2.0 >= height_mm {
            return Err(Error::InvalidGeometry(format!(
                "margin {margin_mm} mm leaves no printable area on a {width_mm}×{height_mm} mm page"
            )));
        }
        Ok(Self {
            width_mm,
            height_mm,
            margin_mm,
        })
    }

    pub fn width_mm(&self) -> f32 {
        self.width_mm
    }

    pub fn height_mm(&self) -> f32 {
        self.height_mm
    }

    pub fn margin_mm(&self) -> f32 {
        self.margin_mm
    }

    pub fn page_width_px(&self) -> f32 {
        self.width_mm * MM_TO_PX
    }

    pub fn page_height_px(&self) -> f32 {
        self.height_mm * MM_TO_PX
    }

    pub fn margin_px(&self) -> f32 {
        self.margin_mm * MM_TO_PX
    }

    /// Width the content is laid out at: page width minus both side margins.
    pub fn content_width_px(&self) -> f32 {
        (self.width_mm - 2.0 * self.margin_mm) * MM_TO_PX
    }

    /// Printable height of one page (the slice height used by pagination).
    pub fn printable_height_px(&self) -> f32 {
        (self.height_mm - 2.0 * self.margin_mm) * MM_TO_PX
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4(MarginSize::default())
    }
}
