//! Lays a captured report image out over A4 pages.
//!
//! All page measurements are in millimeters. The image is drawn 190 mm wide with a 10 mm left
//! margin and its height scaled to keep the aspect ratio. Each page takes 295 mm of that height.

use serde::{Deserialize, Serialize};
use std::ops::Range;

pub const PAGE_WIDTH_MM: f64 = 210.0;
pub const PAGE_HEIGHT_MM: f64 = 297.0;
pub const IMAGE_WIDTH_MM: f64 = 190.0;
pub const LEFT_MARGIN_MM: f64 = 10.0;
/// The amount of image height consumed per page.
pub const PAGE_CONTENT_MM: f64 = 295.0;

/// How a tall image is split over pages.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum PaginationMode {
    /// Cut the image into page-height bands, one band per page.
    #[default]
    Slice,
    /// Place the whole image on every page, shifted up by the height already shown. Bands can
    /// overlap and the last page can be blank when the height is an exact multiple of a page.
    Offset,
}

serde_plain::derive_display_from_serialize!(PaginationMode);
serde_plain::derive_fromstr_from_deserialize!(PaginationMode);

/// What to draw on one page: which pixel rows of the source image, placed where.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlacement {
    /// Source pixel rows drawn on this page.
    pub rows: Range<u32>,
    /// Distance from the top of the page to the top of the drawn image. Negative when the image
    /// starts above the page.
    pub top_mm: f64,
    /// Height of the drawn image.
    pub height_mm: f64,
}

/// Computes the pages for an image of `width` × `height` pixels. A zero-sized image has no pages.
pub fn paginate(width: u32, height: u32, mode: PaginationMode) -> Vec<PagePlacement> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let px_per_mm = f64::from(width) / IMAGE_WIDTH_MM;
    let image_height_mm = f64::from(height) / px_per_mm;
    match mode {
        PaginationMode::Offset => offset_pages(height, image_height_mm),
        PaginationMode::Slice => slice_pages(height, px_per_mm),
    }
}

fn offset_pages(height: u32, image_height_mm: f64) -> Vec<PagePlacement> {
    let whole = |top_mm| PagePlacement {
        rows: 0..height,
        top_mm,
        height_mm: image_height_mm,
    };
    let mut pages = vec![whole(0.0)];
    let mut remaining = image_height_mm - PAGE_CONTENT_MM;
    while remaining >= 0.0 {
        pages.push(whole(remaining - image_height_mm));
        remaining -= PAGE_CONTENT_MM;
    }
    pages
}

/// Cuts the image into `ceil(height / page)` bands. Band edges fall on the pixel row containing
/// each page boundary, so a band is within one row of a page tall.
fn slice_pages(height: u32, px_per_mm: f64) -> Vec<PagePlacement> {
    let band = PAGE_CONTENT_MM * px_per_mm;
    let count = ((f64::from(height) / band) - 1e-9).ceil().max(1.0) as u32;
    let edge = |page: u32| ((f64::from(page) * band).floor() as u32).min(height);
    (0..count)
        .map(|page| {
            let start = edge(page);
            let end = if page + 1 == count { height } else { edge(page + 1) };
            PagePlacement {
                rows: start..end,
                top_mm: 0.0,
                height_mm: f64::from(end - start) / px_per_mm,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_short_image_fits_one_page() {
        for mode in [PaginationMode::Offset, PaginationMode::Slice] {
            let pages = paginate(1000, 1000, mode);
            assert_eq!(pages.len(), 1);
            assert_eq!(pages[0].rows, 0..1000);
            assert!(close(pages[0].top_mm, 0.0));
            assert!(close(pages[0].height_mm, 190.0));
        }
    }

    #[test]
    fn test_offset_shifts_whole_image_up() {
        // 100 x 500 px scales to 190 x 950 mm.
        let pages = paginate(100, 500, PaginationMode::Offset);
        let tops: Vec<f64> = pages.iter().map(|p| p.top_mm).collect();
        assert_eq!(tops.len(), 4);
        for (actual, expected) in tops.iter().zip([0.0, -295.0, -590.0, -885.0]) {
            assert!(close(*actual, expected), "{actual} != {expected}");
        }
        assert!(pages.iter().all(|p| p.rows == (0..500)));
        assert!(pages.iter().all(|p| close(p.height_mm, 950.0)));
    }

    #[test]
    fn test_offset_exact_fit_adds_trailing_page() {
        let pages = paginate(190, 295, PaginationMode::Offset);
        assert_eq!(pages.len(), 2);
        assert!(close(pages[1].top_mm, -295.0));
    }

    #[test]
    fn test_slice_exact_fit_is_one_page() {
        let pages = paginate(190, 295, PaginationMode::Slice);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].rows, 0..295);
    }

    #[test]
    fn test_slice_covers_every_row_once() {
        let pages = paginate(100, 500, PaginationMode::Slice);
        assert_eq!(pages.len(), 4);
        assert_eq!(pages[0].rows, 0..155);
        assert_eq!(pages[3].rows, 465..500);
        let mut next = 0;
        for page in &pages {
            assert_eq!(page.rows.start, next);
            assert!(close(page.top_mm, 0.0));
            next = page.rows.end;
        }
        assert_eq!(next, 500);
        let total: f64 = pages.iter().map(|p| p.height_mm).sum();
        assert!(close(total, 950.0));
    }

    #[test]
    fn test_empty_image_has_no_pages() {
        assert!(paginate(0, 100, PaginationMode::Slice).is_empty());
        assert!(paginate(100, 0, PaginationMode::Offset).is_empty());
    }

    #[test]
    fn test_mode_plain() {
        assert_eq!(PaginationMode::Offset.to_string(), "offset");
        assert_eq!("slice".parse::<PaginationMode>().unwrap(), PaginationMode::Slice);
    }

    #[test]
    fn test_slice_page_count_is_ceiling_of_height() {
        // 3 x 13 px scales to 190 x 823.3 mm, which needs three 295 mm pages.
        let pages = paginate(3, 13, PaginationMode::Slice);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].rows, 0..4);
        assert_eq!(pages[1].rows, 4..9);
        assert_eq!(pages[2].rows, 9..13);

        for (width, height) in [(100, 500), (800, 5000), (7, 1000), (190, 591)] {
            let pages = paginate(width, height, PaginationMode::Slice);
            let height_mm = f64::from(height) * IMAGE_WIDTH_MM / f64::from(width);
            let expected = (height_mm / PAGE_CONTENT_MM).ceil() as usize;
            assert_eq!(pages.len(), expected, "{width} x {height}");
            assert_eq!(pages.last().unwrap().rows.end, height);
            assert!(pages.iter().all(|p| !p.rows.is_empty()));
        }
    }
}
