//! Page Layout Engine: cuts a tall raster surface into page-sized slices.
//!
//! # Algorithm
//! 1. Convert capacity and segment heights from mm to whole pixel rows using the
//!    surface's own scale (pixel width / physical width).
//! 2. A surface no taller than the capacity is one slice.
//! 3. Otherwise cut every `segment` rows. Each cut that leaves more surface behind is
//!    refined: rows `naive, naive-1, ..., naive-(SEARCH_WINDOW_ROWS-1)` are scored by
//!    their count of near-white pixels; a strictly better score replaces the best so
//!    far (ties keep the row nearest the naive cut), and a row at least
//!    `ACCEPT_WHITE_RATIO` white ends the search at once. With no white pixels at all
//!    the naive row stands.
//! 4. The final slice takes whatever remains, so slice heights always sum to the
//!    surface height.

use image::{imageops, RgbImage};
use serde::Serialize;
use tracing::{debug, warn};

/// How many rows above a naive cut are examined.
pub const SEARCH_WINDOW_ROWS: u32 = 40;
/// A channel value above this counts toward "near white".
pub const NEAR_WHITE: u8 = 240;
/// Fraction of a row that must be near-white for immediate acceptance.
pub const ACCEPT_WHITE_RATIO: f64 = 0.9;

/// A named row in the surface, recorded while drawing (used for the TOC).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceAnchor {
    pub title: String,
    pub row: u32,
}

/// Rasterized body content with its physical width.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pub pixels: RgbImage,
    pub width_mm: f32,
    pub anchors: Vec<SurfaceAnchor>,
}

/// One page region: a contiguous band of whole rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurfaceSlice {
    pub row_start: u32,
    pub row_count: u32,
    pub height_mm: f32,
}

impl SurfaceSlice {
    pub fn row_end(&self) -> u32 {
        self.row_start + self.row_count
    }

    pub fn contains_row(&self, row: u32) -> bool {
        row >= self.row_start && row < self.row_end()
    }
}

impl RasterSurface {
    pub fn new(pixels: RgbImage, width_mm: f32) -> Self {
        Self {
            pixels,
            width_mm,
            anchors: Vec::new(),
        }
    }

    pub fn width_px(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height_px(&self) -> u32 {
        self.pixels.height()
    }

    pub fn is_degenerate(&self) -> bool {
        self.width_px() == 0 || self.height_px() == 0 || self.width_mm <= 0.0
    }

    /// Pixels per millimetre, horizontally and vertically.
    pub fn px_per_mm(&self) -> f32 {
        self.width_px() as f32 / self.width_mm
    }

    pub fn height_mm(&self) -> f32 {
        self.height_px() as f32 / self.px_per_mm()
    }

    pub fn rows_to_mm(&self, rows: u32) -> f32 {
        rows as f32 / self.px_per_mm()
    }

    fn mm_to_rows(&self, mm: f32) -> u32 {
        (mm * self.px_per_mm()).round().max(1.0) as u32
    }

    /// Count of near-white pixels in one full-width row.
    pub fn white_pixels_in_row(&self, row: u32) -> u32 {
        (0..self.width_px())
            .filter(|&x| {
                let p = self.pixels.get_pixel(x, row);
                p[0] > NEAR_WHITE && p[1] > NEAR_WHITE && p[2] > NEAR_WHITE
            })
            .count() as u32
    }

    /// Copies the rows of one slice into their own image.
    pub fn crop(&self, slice: &SurfaceSlice) -> RgbImage {
        imageops::crop_imm(
            &self.pixels,
            0,
            slice.row_start,
            self.width_px(),
            slice.row_count,
        )
        .to_image()
    }

    fn slice(&self, row_start: u32, row_end: u32) -> SurfaceSlice {
        let row_count = row_end - row_start;
        SurfaceSlice {
            row_start,
            row_count,
            height_mm: self.rows_to_mm(row_count),
        }
    }
}

/// Picks the cut row for a non-final slice that starts at `current`.
///
/// The returned row is always in `(current, naive]` and within
/// `SEARCH_WINDOW_ROWS` of `naive`.
pub fn refine_break(surface: &RasterSurface, current: u32, naive: u32) -> u32 {
    let height = surface.height_px();
    let accept = (surface.width_px() as f64 * ACCEPT_WHITE_RATIO).ceil() as u32;
    let mut best_row = naive;
    let mut best_white = 0u32;

    for offset in 0..SEARCH_WINDOW_ROWS {
        let Some(row) = naive.checked_sub(offset) else {
            break;
        };
        if row <= current || row >= height {
            continue;
        }

        let white = surface.white_pixels_in_row(row);
        if white > best_white {
            best_white = white;
            best_row = row;
        }
        if white >= accept {
            best_row = row;
            break;
        }
    }

    if best_row != naive {
        debug!(naive, cut = best_row, white = best_white, "Refined page break");
    }
    best_row
}

/// Splits a surface into page slices.
///
/// `page_capacity_mm` is the tallest surface placed on a single page;
/// `segment_mm` is the naive slice height once the surface needs several pages.
pub fn paginate_surface(
    surface: &RasterSurface,
    page_capacity_mm: f32,
    segment_mm: f32,
) -> Vec<SurfaceSlice> {
    if surface.is_degenerate() {
        warn!(
            width = surface.width_px(),
            height = surface.height_px(),
            "Empty raster surface, nothing to paginate"
        );
        return Vec::new();
    }

    let height = surface.height_px();
    if surface.height_mm() <= page_capacity_mm {
        return vec![surface.slice(0, height)];
    }

    let segment_rows = surface.mm_to_rows(segment_mm);
    let mut slices = Vec::new();
    let mut current = 0u32;

    while current < height {
        let naive = current.saturating_add(segment_rows);
        if naive >= height {
            slices.push(surface.slice(current, height));
            break;
        }
        let cut = refine_break(surface, current, naive);
        slices.push(surface.slice(current, cut));
        current = cut;
    }

    debug!(
        slices = slices.len(),
        height_px = height,
        "Paginated raster surface"
    );
    slices
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const INK: Rgb<u8> = Rgb([0, 0, 0]);

    /// 10 px wide, 1 px per mm.
    fn surface(height: u32, ink_rows: impl Fn(u32) -> bool) -> RasterSurface {
        let pixels = RgbImage::from_fn(10, height, |_, y| if ink_rows(y) { INK } else { WHITE });
        RasterSurface::new(pixels, 10.0)
    }

    fn total_rows(slices: &[SurfaceSlice]) -> u32 {
        slices.iter().map(|s| s.row_count).sum()
    }

    #[test]
    fn test_surface_within_capacity_is_single_slice() {
        let s = surface(250, |_| false);
        let slices = paginate_surface(&s, 250.0, 240.0);
        assert_eq!(
            slices,
            vec![SurfaceSlice {
                row_start: 0,
                row_count: 250,
                height_mm: 250.0
            }]
        );
    }

    #[test]
    fn test_slice_heights_sum_to_surface_height() {
        for height in [251u32, 480, 481, 777, 1000, 2411] {
            let s = surface(height, |y| y % 7 != 0);
            let slices = paginate_surface(&s, 250.0, 240.0);
            assert_eq!(total_rows(&slices), height, "height {height}");
            let mut expected_start = 0;
            for slice in &slices {
                assert_eq!(slice.row_start, expected_start);
                assert!(slice.row_count > 0);
                expected_start = slice.row_end();
            }
            let mm: f32 = slices.iter().map(|s| s.height_mm).sum();
            assert!((mm - height as f32).abs() < 1e-2);
        }
    }

    #[test]
    fn test_refined_cuts_stay_within_window() {
        // Only row 100 of every 240-row band is white: far outside the window.
        let s = surface(1000, |y| y % 240 != 100);
        let slices = paginate_surface(&s, 250.0, 240.0);
        let mut current = 0;
        for slice in &slices[..slices.len() - 1] {
            let naive = current + 240;
            let cut = slice.row_end();
            assert!(cut <= naive && naive - cut < SEARCH_WINDOW_ROWS);
            current = cut;
        }
    }

    #[test]
    fn test_all_ink_keeps_naive_cut() {
        let s = surface(600, |_| true);
        let slices = paginate_surface(&s, 250.0, 240.0);
        let cuts: Vec<u32> = slices.iter().map(|s| s.row_end()).collect();
        assert_eq!(cuts, vec![240, 480, 600]);
    }

    #[test]
    fn test_white_naive_row_is_not_moved() {
        // Every row is white: the naive row itself is accepted.
        let s = surface(600, |_| false);
        let slices = paginate_surface(&s, 250.0, 240.0);
        let cuts: Vec<u32> = slices.iter().map(|s| s.row_end()).collect();
        assert_eq!(cuts, vec![240, 480, 600]);
    }

    #[test]
    fn test_cut_moves_to_nearest_white_row() {
        // Ink everywhere except rows 225 and 230.
        let s = surface(600, |y| y != 225 && y != 230);
        assert_eq!(refine_break(&s, 0, 240), 230);
    }

    #[test]
    fn test_partial_white_ties_keep_row_nearest_naive() {
        // Rows 235 and 220 are each half white; neither reaches 90%.
        let pixels = RgbImage::from_fn(10, 600, |x, y| {
            if (y == 235 || y == 220) && x < 5 {
                WHITE
            } else {
                INK
            }
        });
        let s = RasterSurface::new(pixels, 10.0);
        assert_eq!(refine_break(&s, 0, 240), 235);
    }

    #[test]
    fn test_better_row_further_up_wins_over_partial() {
        let pixels = RgbImage::from_fn(10, 600, |x, y| match y {
            235 if x < 3 => WHITE,
            215 if x < 8 => WHITE,
            _ => INK,
        });
        let s = RasterSurface::new(pixels, 10.0);
        assert_eq!(refine_break(&s, 0, 240), 215);
    }

    #[test]
    fn test_near_white_threshold_is_strict() {
        let pixels = RgbImage::from_fn(10, 600, |_, y| match y {
            238 => Rgb([240, 240, 240]),
            232 => Rgb([241, 241, 241]),
            _ => INK,
        });
        let s = RasterSurface::new(pixels, 10.0);
        assert_eq!(s.white_pixels_in_row(238), 0);
        assert_eq!(refine_break(&s, 0, 240), 232);
    }

    #[test]
    fn test_refinement_never_cuts_at_or_before_current() {
        let s = surface(100, |y| y != 5);
        assert_eq!(refine_break(&s, 10, 30), 30);
    }

    #[test]
    fn test_degenerate_surface_yields_no_slices() {
        let s = RasterSurface::new(RgbImage::new(0, 0), 170.0);
        assert!(paginate_surface(&s, 250.0, 240.0).is_empty());
        let s = RasterSurface::new(RgbImage::new(10, 0), 10.0);
        assert!(paginate_surface(&s, 250.0, 240.0).is_empty());
    }

    #[test]
    fn test_crop_copies_slice_rows() {
        let s = surface(20, |y| y >= 10);
        let slice = SurfaceSlice {
            row_start: 8,
            row_count: 4,
            height_mm: 4.0,
        };
        let cropped = s.crop(&slice);
        assert_eq!(cropped.dimensions(), (10, 4));
        assert_eq!(*cropped.get_pixel(0, 1), WHITE);
        assert_eq!(*cropped.get_pixel(0, 2), INK);
    }

    #[test]
    fn test_scale_uses_physical_width() {
        let pixels = RgbImage::from_pixel(680, 1360, WHITE);
        let s = RasterSurface::new(pixels, 170.0);
        assert!((s.px_per_mm() - 4.0).abs() < 1e-6);
        assert!((s.height_mm() - 340.0).abs() < 1e-4);
        let slices = paginate_surface(&s, 250.0, 240.0);
        assert_eq!(slices[0].row_count, 960);
        assert!((slices[0].height_mm - 240.0).abs() < 1e-4);
    }
}
