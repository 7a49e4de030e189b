//! Pagination – splits one continuous content block into fixed-height page
//! windows.
//!
//! All values are unscaled CSS pixels. The display scale is applied later by
//! the compositor and never feeds back into these offsets.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One page's vertical window into the content block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageWindow {
    /// 0-based page index.
    pub index: usize,
    /// Content-space y at which this page's visible slice begins.
    pub offset: f32,
}

impl PageWindow {
    /// 1-based page number, as shown to users and used by the export order.
    pub fn page_number(&self) -> usize {
        self.index + 1
    }

    /// Content-space range shown on this page.
    pub fn visible_range(&self, slice_height: f32) -> Range<f32> {
        self.offset..self.offset + slice_height
    }
}

/// Upper bound on the pages a single document may produce. A resume never
/// gets near this; heights beyond it come from runaway content.
pub const MAX_PAGES: usize = 500;

/// Number of pages needed for `content_height` px of content when each page
/// shows `slice_height` px. Always at least one, never more than
/// [`MAX_PAGES`].
pub fn page_count(content_height: f32, slice_height: f32) -> Result<usize> {
    if !slice_height.is_finite() || slice_height <= 0.0 {
        return Err(Error::InvalidSliceHeight(slice_height));
    }
    let height = if content_height.is_finite() {
        content_height.max(0.0)
    } else {
        0.0
    };
    // Ceiling, never floor: a partial trailing slice still needs its own page.
    let pages = (f64::from(height) / f64::from(slice_height)).ceil();
    if pages > MAX_PAGES as f64 {
        return Err(Error::ContentTooTall(height));
    }
    Ok((pages as usize).max(1))
}

/// Compute the ordered page windows for a content block.
///
/// `offset[i] = i * slice_height` exactly; offsets are multiplied, not
/// accumulated, so repeated recomputation cannot drift.
pub fn paginate(content_height: f32, slice_height: f32) -> Result<Vec<PageWindow>> {
    let count = page_count(content_height, slice_height)?;
    let windows: Vec<PageWindow> = (0..count)
        .map(|index| PageWindow {
            index,
            offset: index as f32 * slice_height,
        })
        .collect();
    log::debug!(
        "paginated {content_height:.1}px into {count} page(s) of {slice_height:.1}px"
    );
    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{MarginSize, PageGeometry};

    #[test]
    fn page_count_table() {
        assert_eq!(page_count(0.0, 800.0).unwrap(), 1);
        assert_eq!(page_count(800.0, 800.0).unwrap(), 1);
        assert_eq!(page_count(801.0, 800.0).unwrap(), 2);
        assert_eq!(page_count(1600.0, 800.0).unwrap(), 2);
        assert_eq!(page_count(1600.5, 800.0).unwrap(), 3);
    }

    #[test]
    fn degenerate_heights_yield_one_page() {
        assert_eq!(page_count(-50.0, 800.0).unwrap(), 1);
        assert_eq!(page_count(f32::NAN, 800.0).unwrap(), 1);
    }

    #[test]
    fn non_positive_slice_is_rejected() {
        assert!(matches!(
            page_count(100.0, 0.0),
            Err(Error::InvalidSliceHeight(_))
        ));
        assert!(paginate(100.0, -3.0).is_err());
    }

    #[test]
    fn runaway_heights_are_rejected() {
        let s = 1047.06;
        assert!(matches!(page_count(1e20, s), Err(Error::ContentTooTall(_))));
        assert!(matches!(paginate(f32::MAX, s), Err(Error::ContentTooTall(_))));
        assert_eq!(page_count(s * MAX_PAGES as f32 - 1.0, s).unwrap(), MAX_PAGES);
    }

    #[test]
    fn offsets_are_strictly_arithmetic() {
        let s = 1047.06;
        let windows = paginate(s * 7.5, s).unwrap();
        assert_eq!(windows.len(), 8);
        for (i, w) in windows.iter().enumerate() {
            assert_eq!(w.index, i);
            assert_eq!(w.offset, i as f32 * s);
        }
        assert_eq!(windows[1].offset, s);
    }

    #[test]
    fn windows_cover_all_content() {
        let s = 800.0;
        let h = 2401.0;
        let windows = paginate(h, s).unwrap();
        let last = windows.last().unwrap();
        assert!(last.visible_range(s).end >= h);
        assert!(last.visible_range(s).start < h);
    }

    #[test]
    fn larger_margin_never_reduces_page_count() {
        let h = 5000.0;
        let mut previous = 0;
        for margin in MarginSize::ALL {
            let s = PageGeometry::a4(margin).printable_height_px();
            let count = page_count(h, s).unwrap();
            assert!(count >= previous, "{margin}: {count} < {previous}");
            previous = count;
        }
    }

    #[test]
    fn recompute_is_idempotent() {
        let a = paginate(3333.3, 971.46).unwrap();
        let b = paginate(3333.3, 971.46).unwrap();
        assert_eq!(a, b);
    }
}
