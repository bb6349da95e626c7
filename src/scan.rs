use image::{DynamicImage, GenericImageView, ImageError};
use logging_timer::time;
use rayon::prelude::*;
use serde::Serialize;

use crate::debug::ImageDebugWriter;
use crate::geometry::{clamp_region_to_image, Region, Size};
use crate::image_utils::{ImageOps, ImageProcOps};
use crate::layout::{ColumnId, SheetLayout};
use crate::scoring::score_bubble_rows;
use crate::types::RowResult;

/// One entry per answer row, in row order.
pub type ColumnResult = Vec<RowResult>;

#[derive(Debug)]
pub enum ScoreColumnError {
    DecodeError(ImageError),
    PreprocessError(String),
}

/// The scored rows of one column of a sheet layout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredColumn {
    pub id: ColumnId,
    pub column_data: ColumnResult,
}

fn empty_rows(num_rows: i32) -> ColumnResult {
    vec![RowResult::empty(); num_rows.max(0) as usize]
}

#[time]
/// Scores one column of a scanned answer sheet: decodes `image_bytes`, crops
/// to `region`, binarizes, and decides each of `num_rows` rows independently.
///
/// Unreadable image bytes and preprocessing rejections are errors; degenerate
/// geometry and non-positive row counts are not, and degrade to empty
/// results.
pub fn score_column(
    image_bytes: &[u8],
    region: &Region,
    num_rows: i32,
    confidence_threshold: f32,
    debug: &ImageDebugWriter,
) -> Result<ColumnResult, ScoreColumnError> {
    score_column_with_ops(
        &ImageProcOps,
        image_bytes,
        region,
        num_rows,
        confidence_threshold,
        debug,
    )
}

/// `score_column` over caller-supplied image primitives and debug writer.
pub fn score_column_with_ops(
    ops: &impl ImageOps,
    image_bytes: &[u8],
    region: &Region,
    num_rows: i32,
    confidence_threshold: f32,
    debug: &ImageDebugWriter,
) -> Result<ColumnResult, ScoreColumnError> {
    let image = ops.decode(image_bytes).map_err(ScoreColumnError::DecodeError)?;
    score_column_image(ops, &image, region, num_rows, confidence_threshold, debug)
}

fn score_column_image(
    ops: &impl ImageOps,
    image: &DynamicImage,
    region: &Region,
    num_rows: i32,
    confidence_threshold: f32,
    debug: &ImageDebugWriter,
) -> Result<ColumnResult, ScoreColumnError> {
    let (image_width, image_height) = image.dimensions();
    let image_size = Size {
        width: image_width,
        height: image_height,
    };

    let crop = match clamp_region_to_image(region, image_size) {
        Some(crop) => crop,
        None => {
            log::warn!(
                "column region {:?} has no overlap with the {}x{} image",
                region,
                image_width,
                image_height
            );
            return Ok(empty_rows(num_rows));
        }
    };

    let column = image.crop_imm(
        crop.left() as u32,
        crop.top() as u32,
        crop.width(),
        crop.height(),
    );
    let grayscale = ops.to_grayscale(&column);
    let blurred = ops.blur(&grayscale).map_err(ScoreColumnError::PreprocessError)?;
    let binarized = ops
        .binarize_marks(&blurred)
        .map_err(ScoreColumnError::PreprocessError)?;

    if binarized.width() == 0 || binarized.height() == 0 {
        log::warn!("binarized column has a zero dimension");
        return Ok(empty_rows(num_rows));
    }

    if debug.is_enabled() {
        let canvas = DynamicImage::ImageLuma8(binarized.clone()).to_rgb8();
        debug.write("binarized", &canvas);
    }

    if num_rows <= 0 {
        log::warn!("invalid number of rows: {}", num_rows);
        return Ok(vec![]);
    }

    Ok(score_bubble_rows(
        ops,
        &binarized,
        num_rows as u32,
        confidence_threshold,
        debug,
    ))
}

#[time]
/// Scores every column of a sheet layout against one decoded image. Columns
/// are independent, so they are scored in parallel.
pub fn score_sheet(
    ops: &(impl ImageOps + Sync),
    image_bytes: &[u8],
    layout: &SheetLayout,
    debug: &ImageDebugWriter,
) -> Result<Vec<ScoredColumn>, ScoreColumnError> {
    let image = ops.decode(image_bytes).map_err(ScoreColumnError::DecodeError)?;

    layout
        .columns
        .par_iter()
        .map(|column| {
            let column_debug = debug.scoped(&format!("column_{}", column.id));
            score_column_image(
                ops,
                &image,
                &column.region,
                column.num_rows,
                column.confidence_threshold,
                &column_debug,
            )
            .map(|rows| ScoredColumn {
                id: column.id.clone(),
                column_data: rows,
            })
        })
        .collect()
}
