// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/geometry.rs
//
// Canvas geometry: pointer positions, canvas bounds and the fit algorithm.

use serde::Serialize;

use crate::constant::MIN_CANVAS_SIZE;

/// Pointer position in canvas pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Rendered size of the display canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CanvasBounds {
    pub width: u32,
    pub height: u32,
}

impl CanvasBounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Fit an image of `(width, height)` inside `(max_width, max_height)`,
    /// preserving aspect ratio. Images already inside the limits are never
    /// upscaled. Fractional results are truncated to whole pixels.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn fit(width: u32, height: u32, max_width: u32, max_height: u32) -> Self {
        if width <= max_width && height <= max_height {
            return Self::new(width, height);
        }

        let aspect = f64::from(width) / f64::from(height);
        let max_aspect = f64::from(max_width) / f64::from(max_height);

        if aspect > max_aspect {
            let h = (f64::from(max_width) / aspect) as u32;
            Self::new(max_width, h.max(MIN_CANVAS_SIZE))
        } else {
            let w = (f64::from(max_height) * aspect) as u32;
            Self::new(w.max(MIN_CANVAS_SIZE), max_height)
        }
    }

    /// Whether a square of `size` fits on the canvas.
    pub fn fits_square(&self, size: u32) -> bool {
        self.width >= size && self.height >= size
    }
}

/// Clamp `value` into `[0, limit - size]`. A negative upper bound collapses to 0.
pub fn clamp_origin(value: i32, limit: u32, size: u32) -> i32 {
    let upper = i64::from(limit) - i64::from(size);
    #[allow(clippy::cast_possible_truncation)]
    let upper = upper.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
    value.min(upper).max(0)
}
