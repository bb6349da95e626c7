use image::GrayImage;
use imageproc::rect::Rect;
use logging_timer::time;

use crate::debug::{draw_scored_bubbles_debug_image_mut, ImageDebugWriter};
use crate::geometry::{bubble_roi, Size};
use crate::image_utils::ImageOps;
use crate::types::{BubbleBounds, MarkedBubble, RowResult};

/// Answer bubbles per row. The sheet layout is a fixed 4-choice format.
pub const BUBBLES_PER_ROW: u32 = 4;

/// Fill score for one candidate bubble. `roi` is `None` when integer
/// truncation left the cell with no pixels to score; such a bubble scores 0
/// and can never be selected.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredBubble {
    pub score: f32,
    pub bubble: u32,
    pub roi: Option<Rect>,
}

fn column_size(binarized: &GrayImage) -> Size<u32> {
    Size {
        width: binarized.width(),
        height: binarized.height(),
    }
}

/// Fraction of foreground pixels within `roi`.
fn fill_score(ops: &impl ImageOps, binarized: &GrayImage, roi: Rect) -> f32 {
    let roi_pixels = image::imageops::crop_imm(
        binarized,
        roi.left() as u32,
        roi.top() as u32,
        roi.width(),
        roi.height(),
    )
    .to_image();
    let total_pixels = roi.width() * roi.height();
    ops.count_foreground(&roi_pixels) as f32 / total_pixels as f32
}

/// Scores all bubbles of one row independently.
pub fn score_bubbles_in_row(
    ops: &impl ImageOps,
    binarized: &GrayImage,
    num_rows: u32,
    row: u32,
) -> Vec<ScoredBubble> {
    let size = column_size(binarized);
    (0..BUBBLES_PER_ROW)
        .map(
            |bubble| match bubble_roi(size, num_rows, BUBBLES_PER_ROW, row, bubble) {
                Some(roi) => ScoredBubble {
                    score: fill_score(ops, binarized, roi),
                    bubble,
                    roi: Some(roi),
                },
                None => ScoredBubble {
                    score: 0.0,
                    bubble,
                    roi: None,
                },
            },
        )
        .collect()
}

/// Picks the row's winner: the highest-scoring bubble, with ties broken by
/// the lowest bubble index (the sort is stable and descending). A mark is
/// emitted only when the best score strictly exceeds the confidence
/// threshold, so a borderline score equal to the threshold stays unmarked.
pub fn decide_row(
    mut scored: Vec<ScoredBubble>,
    confidence_threshold: f32,
    column_size: Size<u32>,
) -> RowResult {
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .expect("comparison of non-NaN to succeed")
    });

    match scored.first() {
        Some(best) if best.score > confidence_threshold => match best.roi {
            Some(roi) => RowResult::marked(MarkedBubble {
                label: best.bubble + 1,
                bounds: BubbleBounds {
                    x: roi.left(),
                    y: roi.top(),
                    w: roi.width(),
                    h: roi.height(),
                    crop_origin_w: column_size.width,
                    crop_origin_h: column_size.height,
                },
            }),
            None => RowResult::empty(),
        },
        _ => RowResult::empty(),
    }
}

#[time]
/// Scores every row of a binarized column and decides each independently.
/// Always returns exactly `num_rows` row results.
pub fn score_bubble_rows(
    ops: &impl ImageOps,
    binarized: &GrayImage,
    num_rows: u32,
    confidence_threshold: f32,
    debug: &ImageDebugWriter,
) -> Vec<RowResult> {
    let size = column_size(binarized);
    let scored_rows = (0..num_rows)
        .map(|row| score_bubbles_in_row(ops, binarized, num_rows, row))
        .collect::<Vec<Vec<ScoredBubble>>>();
    let results = scored_rows
        .iter()
        .map(|scored| decide_row(scored.clone(), confidence_threshold, size))
        .collect::<Vec<RowResult>>();

    if debug.is_enabled() {
        let mut canvas = image::DynamicImage::ImageLuma8(binarized.clone()).to_rgb8();
        draw_scored_bubbles_debug_image_mut(&mut canvas, &scored_rows, &results);
        debug.write("scored_bubbles", &canvas);
    }

    results
}
