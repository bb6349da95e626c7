use std::path::{Path, PathBuf};

use image::RgbImage;
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::geometry::cell_span;
use crate::image_utils::{BLUE, DARK_GREEN, RED};
use crate::scoring::{ScoredBubble, BUBBLES_PER_ROW};
use crate::types::RowResult;

/// Creates a path for a debug image.
pub fn debug_image_path(base: &Path, label: &str) -> PathBuf {
    let mut result = PathBuf::from(base);
    result.set_file_name(format!(
        "{}_debug_{}.png",
        base.file_stem().unwrap_or_default().to_str().unwrap_or_default(),
        label
    ));
    result
}

/// Writes debug images next to the input image when enabled, otherwise does
/// nothing.
#[derive(Clone, Debug)]
pub struct ImageDebugWriter {
    input_path: Option<PathBuf>,
    scope: Option<String>,
}

impl ImageDebugWriter {
    pub fn new(input_path: PathBuf) -> Self {
        Self {
            input_path: Some(input_path),
            scope: None,
        }
    }

    pub fn disabled() -> Self {
        Self {
            input_path: None,
            scope: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.input_path.is_some()
    }

    /// A writer whose labels are prefixed with `scope`, used to keep the
    /// debug images of separately scored columns apart.
    pub fn scoped(&self, scope: &str) -> Self {
        Self {
            input_path: self.input_path.clone(),
            scope: Some(match &self.scope {
                Some(existing) => format!("{}_{}", existing, scope),
                None => scope.to_string(),
            }),
        }
    }

    pub fn write(&self, label: &str, canvas: &RgbImage) -> Option<PathBuf> {
        let input_path = self.input_path.as_ref()?;
        let label = match &self.scope {
            Some(scope) => format!("{}_{}", scope, label),
            None => label.to_string(),
        };
        let path = debug_image_path(input_path, &label);
        match canvas.save(&path) {
            Ok(()) => {
                log::info!("wrote debug image: {}", path.display());
                Some(path)
            }
            Err(e) => {
                log::error!("failed to write debug image {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Outlines the nominal bubble grid, every scored ROI, and the selected mark
/// of each row.
pub fn draw_scored_bubbles_debug_image_mut(
    canvas: &mut RgbImage,
    scored_rows: &[Vec<ScoredBubble>],
    results: &[RowResult],
) {
    let num_rows = scored_rows.len() as u32;

    for row in 0..num_rows {
        let (top, bottom) = cell_span(canvas.height(), num_rows, row);
        for bubble in 0..BUBBLES_PER_ROW {
            let (left, right) = cell_span(canvas.width(), BUBBLES_PER_ROW, bubble);
            if right > left && bottom > top {
                draw_hollow_rect_mut(
                    canvas,
                    Rect::at(left, top).of_size((right - left) as u32, (bottom - top) as u32),
                    BLUE,
                );
            }
        }
    }

    for scored in scored_rows {
        for bubble in scored {
            if let Some(roi) = bubble.roi {
                draw_hollow_rect_mut(canvas, roi, RED);
            }
        }
    }

    for result in results {
        if let Some(mark) = result.mark() {
            draw_hollow_rect_mut(
                canvas,
                Rect::at(mark.bounds.x, mark.bounds.y).of_size(mark.bounds.w, mark.bounds.h),
                DARK_GREEN,
            );
        }
    }
}
