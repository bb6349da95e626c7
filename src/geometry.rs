use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};

/// Fraction of each cell span trimmed from both sides before scoring, to
/// avoid counting grid-line artifacts near cell borders.
pub const ROI_MARGIN_RATIO: f64 = 0.2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Size<T> {
    pub width: T,
    pub height: T,
}

/// A requested column rectangle in original-image coordinates. Coordinates
/// are real-valued as supplied by the caller and are not guaranteed to lie
/// inside the image bounds.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Intersects `region` with the image bounds, truncating the real-valued
/// coordinates to integers first. Returns `None` when the intersection is
/// empty on either axis.
pub fn clamp_region_to_image(region: &Region, image_size: Size<u32>) -> Option<Rect> {
    let x = region.x as i64;
    let y = region.y as i64;
    let w = region.w as i64;
    let h = region.h as i64;

    let x1 = x.max(0);
    let y1 = y.max(0);
    let x2 = (x + w).min(i64::from(image_size.width));
    let y2 = (y + h).min(i64::from(image_size.height));

    if x2 - x1 <= 0 || y2 - y1 <= 0 {
        return None;
    }

    Some(Rect::at(x1 as i32, y1 as i32).of_size((x2 - x1) as u32, (y2 - y1) as u32))
}

/// Nominal boundaries of cell `index` when `total` pixels are divided into
/// `count` cells: `[trunc(index * total / count), trunc((index + 1) * total / count))`.
///
/// The scaled boundaries are truncated to integers, so adjacent cells can
/// differ in size by a pixel. That drift is part of the output contract and
/// must not be replaced with rounded or real-valued boundaries.
pub fn cell_span(total: u32, count: u32, index: u32) -> (i32, i32) {
    let size = f64::from(total) / f64::from(count);
    let start = (f64::from(index) * size) as i32;
    let end = (f64::from(index + 1) * size) as i32;
    (start, end)
}

fn trim_span(start: i32, end: i32, limit: u32) -> Option<(i32, i32)> {
    let margin = (f64::from(end - start) * ROI_MARGIN_RATIO) as i32;
    let trimmed_start = (start + margin).max(0);
    let trimmed_end = (end - margin).min(limit as i32);
    if trimmed_end <= trimmed_start {
        return None;
    }
    Some((trimmed_start, trimmed_end))
}

/// Computes the margin-trimmed region of interest for the cell at
/// (`row`, `bubble`) in a `column_size` grid of `num_rows` × `num_bubbles`
/// cells. Returns `None` when integer truncation leaves no pixels to score.
pub fn bubble_roi(
    column_size: Size<u32>,
    num_rows: u32,
    num_bubbles: u32,
    row: u32,
    bubble: u32,
) -> Option<Rect> {
    let (cell_top, cell_bottom) = cell_span(column_size.height, num_rows, row);
    let (cell_left, cell_right) = cell_span(column_size.width, num_bubbles, bubble);

    let (top, bottom) = trim_span(cell_top, cell_bottom, column_size.height)?;
    let (left, right) = trim_span(cell_left, cell_right, column_size.width)?;

    Some(Rect::at(left, top).of_size((right - left) as u32, (bottom - top) as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE: Size<u32> = Size {
        width: 100,
        height: 100,
    };

    #[test]
    fn clamp_region_inside_image() {
        let region = Region {
            x: 10.0,
            y: 20.0,
            w: 30.0,
            h: 40.0,
        };
        let rect = clamp_region_to_image(&region, IMAGE).unwrap();
        assert_eq!(rect, Rect::at(10, 20).of_size(30, 40));
    }

    #[test]
    fn clamp_region_truncates_fractional_coordinates() {
        let region = Region {
            x: 10.9,
            y: 0.5,
            w: 20.7,
            h: 30.2,
        };
        let rect = clamp_region_to_image(&region, IMAGE).unwrap();
        assert_eq!(rect, Rect::at(10, 0).of_size(20, 30));
    }

    #[test]
    fn clamp_region_partially_outside_image() {
        let region = Region {
            x: -10.0,
            y: 90.0,
            w: 30.0,
            h: 30.0,
        };
        let rect = clamp_region_to_image(&region, IMAGE).unwrap();
        assert_eq!(rect, Rect::at(0, 90).of_size(20, 10));
    }

    #[test]
    fn clamp_region_entirely_outside_image() {
        let region = Region {
            x: 200.0,
            y: 0.0,
            w: 50.0,
            h: 50.0,
        };
        assert_eq!(clamp_region_to_image(&region, IMAGE), None);
    }

    #[test]
    fn clamp_region_with_non_positive_dimensions() {
        let region = Region {
            x: 10.0,
            y: 10.0,
            w: 0.0,
            h: 20.0,
        };
        assert_eq!(clamp_region_to_image(&region, IMAGE), None);

        let region = Region {
            x: 10.0,
            y: 10.0,
            w: 20.0,
            h: -5.0,
        };
        assert_eq!(clamp_region_to_image(&region, IMAGE), None);
    }

    #[test]
    fn cell_span_truncation_drift() {
        // 10 pixels over 4 cells: boundaries at 0, 2.5, 5, 7.5, 10 truncate
        // to spans of 2, 3, 2 and 3 pixels.
        assert_eq!(cell_span(10, 4, 0), (0, 2));
        assert_eq!(cell_span(10, 4, 1), (2, 5));
        assert_eq!(cell_span(10, 4, 2), (5, 7));
        assert_eq!(cell_span(10, 4, 3), (7, 10));
    }

    #[test]
    fn cell_spans_tile_contiguously() {
        for i in 0..6 {
            let (_, end) = cell_span(400, 7, i);
            let (next_start, _) = cell_span(400, 7, i + 1);
            assert_eq!(end, next_start);
        }
        assert_eq!(cell_span(400, 5, 0).0, 0);
        assert_eq!(cell_span(400, 5, 4).1, 400);
    }

    #[test]
    fn bubble_roi_trims_twenty_percent_margins() {
        // 100x400 column, 5 rows, 4 bubbles: cells are 25x80, margins are
        // 5 and 16 pixels.
        let column = Size {
            width: 100,
            height: 400,
        };
        let roi = bubble_roi(column, 5, 4, 0, 0).unwrap();
        assert_eq!(roi, Rect::at(5, 16).of_size(15, 48));
    }

    #[test]
    fn bubble_roi_of_last_cell_stays_inside_column() {
        let column = Size {
            width: 100,
            height: 400,
        };
        let roi = bubble_roi(column, 5, 4, 4, 3).unwrap();
        assert!(roi.left() >= 0);
        assert!(roi.top() >= 0);
        assert!(roi.right() < 100);
        assert!(roi.bottom() < 400);
    }

    #[test]
    fn bubble_roi_degenerate_cell_is_none() {
        // One-pixel-high rows leave nothing after trimming.
        let column = Size {
            width: 8,
            height: 2,
        };
        assert_eq!(bubble_roi(column, 4, 4, 0, 0), None);
    }
}
