//! Pure geometry for the three layouts.
//!
//! Nothing here touches a surface; every function is testable on plain
//! numbers.

use crate::surface::ClipPolygon;
use crate::types::Dimensions;

/// Most images a jigsaw grid shows.
pub const JIGSAW_MAX_SLOTS: usize = 6;

/// Jigsaw container height as a fraction of its width.
pub const JIGSAW_ASPECT: f64 = 9.0 / 15.0;

/// Height-to-width target ratio of every slot, per slot count.
const JIGSAW_RATIOS: [&[f64]; JIGSAW_MAX_SLOTS] = [
    &[9.0 / 15.0],
    &[9.0 / 10.0, 9.0 / 10.0],
    &[9.0 / 10.5, 1.0, 1.0],
    &[9.0 / 15.0, 9.0 / 15.0, 9.0 / 15.0, 9.0 / 15.0],
    &[6.0 / 10.0, 1.0, 4.0 / 5.0, 9.0 / 15.0, 9.0 / 15.0],
    &[9.0 / 15.0, 9.0 / 15.0, 9.0 / 15.0, 9.0 / 15.0, 9.0 / 15.0, 9.0 / 15.0],
];

/// Slot ratios for a grid of `count` slots (empty for 0 or more than the max).
///
/// ```
/// # use mosaic_gal::layout::geometry::jigsaw_ratios;
/// assert_eq!(jigsaw_ratios(2), &[0.9, 0.9]);
/// assert!(jigsaw_ratios(7).is_empty());
/// ```
pub fn jigsaw_ratios(count: usize) -> &'static [f64] {
    match count {
        1..=JIGSAW_MAX_SLOTS => JIGSAW_RATIOS[count - 1],
        _ => &[],
    }
}

/// Which way an image is cropped to meet its slot ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropAxis {
    /// Image is relatively taller than the slot: trim top and bottom.
    Vertical,
    /// Image is relatively wider than the slot: trim left and right.
    Horizontal,
}

pub fn crop_axis(dims: Dimensions, ratio: f64) -> CropAxis {
    if dims.aspect_hw() > ratio {
        CropAxis::Vertical
    } else {
        CropAxis::Horizontal
    }
}

/// Fraction of the cropped axis that stays visible.
fn visible_fraction(dims: Dimensions, ratio: f64) -> f64 {
    let hw = dims.aspect_hw();
    let f = match crop_axis(dims, ratio) {
        CropAxis::Vertical => ratio / hw,
        CropAxis::Horizontal => hw / ratio,
    };
    f.clamp(0.0, 1.0)
}

/// Centred rectangular mask whose visible region has height/width = `ratio`.
///
/// # Examples
/// ```
/// # use mosaic_gal::layout::geometry::crop_mask;
/// # use mosaic_gal::types::Dimensions;
/// // 100x300 portrait into a 0.6 slot keeps the middle fifth of its height.
/// let mask = crop_mask(Dimensions::new(100, 300), 0.6);
/// assert!((mask.y_span() - 0.2).abs() < 1e-9);
/// assert_eq!(mask.x_span(), 1.0);
/// ```
pub fn crop_mask(dims: Dimensions, ratio: f64) -> ClipPolygon {
    let f = visible_fraction(dims, ratio);
    let lo = (1.0 - f) / 2.0;
    let hi = lo + f;
    match crop_axis(dims, ratio) {
        CropAxis::Vertical => ClipPolygon::rect(0.0, lo, 1.0, hi),
        CropAxis::Horizontal => ClipPolygon::rect(lo, 0.0, hi, 1.0),
    }
}

/// Mask with a leaning left edge, used by the second slot of the paired grid.
///
/// A wide image keeps a strip starting at half its visible width along the
/// top and at the left edge along the bottom. A tall image keeps a centred
/// band whose top edge starts a third of the way in.
pub fn slanted_mask(dims: Dimensions, ratio: f64) -> ClipPolygon {
    let f = visible_fraction(dims, ratio);
    match crop_axis(dims, ratio) {
        CropAxis::Horizontal => {
            let x1 = f / 2.0;
            let x2 = (f + 0.01).min(1.0);
            ClipPolygon {
                points: vec![(x1, 0.0), (x2, 0.0), (x2, 1.0), (0.0, 1.0)],
            }
        }
        CropAxis::Vertical => {
            let y0 = (1.0 - f) / 2.0;
            let y1 = y0 + f;
            ClipPolygon {
                points: vec![(1.0 / 3.0, y0), (1.0, y0), (1.0, y1), (0.0, y1)],
            }
        }
    }
}

// =============================================================================
// Waterfall
// =============================================================================

/// Number of columns: `ceil(container_width / min_width)`, at least one.
///
/// ```
/// # use mosaic_gal::layout::geometry::column_count;
/// assert_eq!(column_count(1000.0, 250.0), 4);
/// assert_eq!(column_count(1001.0, 250.0), 5);
/// assert_eq!(column_count(0.0, 250.0), 1);
/// ```
pub fn column_count(container_width: f64, min_width: f64) -> usize {
    if container_width <= 0.0 || min_width <= 0.0 {
        return 1;
    }
    ((container_width / min_width).ceil() as usize).max(1)
}

/// Rendered height of an image scaled to `column_width`.
pub fn scaled_height(dims: Dimensions, column_width: f64) -> f64 {
    column_width * dims.aspect_hw()
}

/// Index of the shortest column; ties go to the leftmost.
pub fn shortest_column(heights: &[f64]) -> usize {
    let mut best = 0;
    for (i, h) in heights.iter().enumerate() {
        if *h < heights[best] {
            best = i;
        }
    }
    best
}

// =============================================================================
// Brick
// =============================================================================

/// Geometry of one brick row packed from the front of a run of images.
#[derive(Debug, Clone, PartialEq)]
pub struct RowPlan {
    /// How many images the row takes.
    pub count: usize,
    /// The next image would not fit; the row is finalised at container width.
    pub full: bool,
    /// A single image too wide for any row, given a full-width row of its own.
    pub oversized: bool,
    /// Rendered row height in pixels.
    pub height: f64,
    /// Row height divided by container width; replayed on resize.
    pub ratio: f64,
    /// Width of every image as a percentage of the container.
    pub widths_pct: Vec<f64>,
}

/// Pack images greedily into one row at normalized height `norm_height`.
///
/// Each image contributes `norm_height * w / h` until the next one would
/// overflow `container_width`. A full row is scaled up so it spans the
/// container exactly; a row that runs out of images keeps its normalized
/// size. Returns `None` for an empty run or a container with no width.
///
/// # Examples
/// ```
/// # use mosaic_gal::layout::geometry::plan_row;
/// # use mosaic_gal::types::Dimensions;
/// // Three 2:1 images at 100px are 200px each; two fit in 500px.
/// let sizes = [Dimensions::new(20, 10); 3];
/// let row = plan_row(&sizes, 100.0, 500.0).unwrap();
/// assert_eq!(row.count, 2);
/// assert!(row.full);
/// assert_eq!(row.height, 125.0);
/// ```
pub fn plan_row(sizes: &[Dimensions], norm_height: f64, container_width: f64) -> Option<RowPlan> {
    if sizes.is_empty() || container_width <= 0.0 || norm_height <= 0.0 {
        return None;
    }
    let mut norm_total = 0.0;
    let mut count = 0;
    let mut full = false;
    for dims in sizes {
        let w = norm_height * dims.aspect_wh();
        if norm_total + w > container_width {
            full = true;
            break;
        }
        norm_total += w;
        count += 1;
    }

    if count == 0 {
        let ratio = sizes[0].aspect_hw();
        return Some(RowPlan {
            count: 1,
            full: true,
            oversized: true,
            height: container_width * ratio,
            ratio,
            widths_pct: vec![100.0],
        });
    }

    let base_width = if full { norm_total } else { container_width };
    let row_width = if full { container_width } else { norm_total };
    let widths_pct = sizes[..count]
        .iter()
        .map(|d| norm_height * d.aspect_wh() / base_width * 100.0)
        .collect();
    Some(RowPlan {
        count,
        full,
        oversized: false,
        height: norm_height * row_width / norm_total,
        ratio: norm_height / base_width,
        widths_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    // =========================================================================
    // Jigsaw
    // =========================================================================

    #[test]
    fn ratio_table_has_one_entry_per_slot() {
        for count in 1..=JIGSAW_MAX_SLOTS {
            assert_eq!(jigsaw_ratios(count).len(), count);
        }
        assert!(jigsaw_ratios(0).is_empty());
    }

    #[test]
    fn ratio_table_values() {
        assert!(close(jigsaw_ratios(3)[0], 9.0 / 10.5));
        assert_eq!(jigsaw_ratios(5)[2], 0.8);
        assert_eq!(jigsaw_ratios(1)[0], JIGSAW_ASPECT);
    }

    #[test]
    fn crop_axis_compares_against_slot_ratio() {
        assert_eq!(crop_axis(Dimensions::new(100, 300), 0.6), CropAxis::Vertical);
        assert_eq!(crop_axis(Dimensions::new(300, 100), 0.6), CropAxis::Horizontal);
    }

    #[test]
    fn crop_mask_visible_region_matches_ratio() {
        for dims in [
            Dimensions::new(100, 300),
            Dimensions::new(300, 100),
            Dimensions::new(640, 480),
            Dimensions::new(1, 1),
        ] {
            for ratio in [0.6, 0.9, 1.0] {
                let mask = crop_mask(dims, ratio);
                let visible_h = mask.y_span() * dims.height as f64;
                let visible_w = mask.x_span() * dims.width as f64;
                assert!(
                    close(visible_h / visible_w, ratio),
                    "{dims} into {ratio}: {visible_h}/{visible_w}"
                );
            }
        }
    }

    #[test]
    fn crop_mask_is_centred() {
        let mask = crop_mask(Dimensions::new(300, 100), 0.6);
        let xs: Vec<f64> = mask.points.iter().map(|p| p.0).collect();
        let lo = xs.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(close(lo, 1.0 - hi));
    }

    #[test]
    fn slanted_mask_wide_image() {
        // 300x100 at 0.9: visible fraction = (1/3) / 0.9
        let f = (100.0 / 300.0) / 0.9;
        let mask = slanted_mask(Dimensions::new(300, 100), 0.9);
        assert!(close(mask.points[0].0, f / 2.0));
        assert!(close(mask.points[1].0, f + 0.01));
        assert_eq!(mask.points[3], (0.0, 1.0));
    }

    #[test]
    fn slanted_mask_tall_image_leans_from_a_third() {
        let mask = slanted_mask(Dimensions::new(100, 300), 0.9);
        assert!(close(mask.points[0].0, 1.0 / 3.0));
        assert!(close(mask.y_span(), 0.3));
    }

    // =========================================================================
    // Waterfall
    // =========================================================================

    #[test]
    fn column_count_rounds_up() {
        assert_eq!(column_count(1000.0, 250.0), 4);
        assert_eq!(column_count(999.0, 250.0), 4);
        assert_eq!(column_count(100.0, 250.0), 1);
    }

    #[test]
    fn scaled_height_uses_column_width() {
        assert_eq!(scaled_height(Dimensions::new(500, 300), 250.0), 150.0);
        assert_eq!(scaled_height(Dimensions::new(250, 300), 250.0), 300.0);
    }

    #[test]
    fn shortest_column_prefers_leftmost_tie() {
        assert_eq!(shortest_column(&[0.0, 0.0, 0.0]), 0);
        assert_eq!(shortest_column(&[300.0, 100.0, 200.0, 150.0]), 1);
        assert_eq!(shortest_column(&[5.0, 1.0, 1.0]), 1);
    }

    // =========================================================================
    // Brick
    // =========================================================================

    #[test]
    fn full_row_spans_container_exactly() {
        let sizes = [
            Dimensions::new(400, 300),
            Dimensions::new(300, 400),
            Dimensions::new(1600, 900),
            Dimensions::new(500, 500),
        ];
        let row = plan_row(&sizes, 200.0, 800.0).unwrap();
        assert!(row.full);
        assert!(!row.oversized);
        let total: f64 = row.widths_pct.iter().sum();
        assert!(close(total, 100.0));
        assert!(close(row.ratio * 800.0, row.height));
        assert!(row.height >= 200.0);
    }

    #[test]
    fn partial_row_keeps_normalized_height() {
        let sizes = [Dimensions::new(100, 100), Dimensions::new(100, 100)];
        let row = plan_row(&sizes, 200.0, 1000.0).unwrap();
        assert_eq!(row.count, 2);
        assert!(!row.full);
        assert_eq!(row.height, 200.0);
        assert_eq!(row.widths_pct, vec![20.0, 20.0]);
        assert!(close(row.ratio * 1000.0, 200.0));
    }

    #[test]
    fn oversized_image_gets_its_own_row() {
        let sizes = [Dimensions::new(1000, 100), Dimensions::new(10, 10)];
        let row = plan_row(&sizes, 200.0, 500.0).unwrap();
        assert_eq!(row.count, 1);
        assert!(row.oversized && row.full);
        assert_eq!(row.height, 50.0);
        assert_eq!(row.widths_pct, vec![100.0]);
    }

    #[test]
    fn exact_fit_is_not_full_until_overflow() {
        let sizes = [Dimensions::new(100, 100); 5];
        let row = plan_row(&sizes, 100.0, 500.0).unwrap();
        assert_eq!(row.count, 5);
        assert!(!row.full);
        assert_eq!(row.height, 100.0);
    }

    #[test]
    fn no_row_without_width_or_images() {
        assert!(plan_row(&[], 200.0, 500.0).is_none());
        assert!(plan_row(&[Dimensions::new(1, 1)], 200.0, 0.0).is_none());
    }
}
