// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/crop.rs
//
// Crop domain model: the dragged selection and the normalized region it maps to.

use serde::Serialize;

use super::geometry::{CanvasBounds, Point, clamp_origin};

/// Rectangle dragged by the user, in canvas pixel coordinates.
///
/// Width and height keep their sign while a free-form drag is in progress:
/// a negative width means the pointer is left of the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Selection {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Selection {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Square selection at the canvas origin.
    pub fn square(size: u32) -> Self {
        let size = i32::try_from(size).unwrap_or(i32::MAX);
        Self::new(0, 0, size, size)
    }

    /// Selection spanning from `anchor` to `pointer`.
    pub fn spanning(anchor: Point, pointer: Point) -> Self {
        Self::new(
            anchor.x,
            anchor.y,
            pointer.x.saturating_sub(anchor.x),
            pointer.y.saturating_sub(anchor.y),
        )
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Inclusive hit test against the normalized rectangle.
    pub fn contains(&self, point: Point) -> bool {
        let region = self.normalized();
        let (x, y) = (i64::from(point.x), i64::from(point.y));
        x >= region.x
            && x <= region.x + i64::from(region.width)
            && y >= region.y
            && y <= region.y + i64::from(region.height)
    }

    /// Min-corner and absolute size, independent of drag direction.
    pub fn normalized(&self) -> CropRegion {
        let (x0, x1) = ordered(self.x, self.width);
        let (y0, y1) = ordered(self.y, self.height);
        CropRegion::from_corners(x0, y0, x1, y1)
    }

    /// Region for a fixed-size crop: origin re-clamped into the canvas, size pinned.
    pub fn fixed_region(&self, size: u32, bounds: CanvasBounds) -> CropRegion {
        CropRegion::new(
            i64::from(clamp_origin(self.x, bounds.width, size)),
            i64::from(clamp_origin(self.y, bounds.height, size)),
            size,
            size,
        )
    }
}

fn ordered(start: i32, extent: i32) -> (i64, i64) {
    let a = i64::from(start);
    let b = a + i64::from(extent);
    (a.min(b), a.max(b))
}

/// Crop region in canvas pixel coordinates.
///
/// Always normalized: the origin is the top-left corner and the size is
/// non-negative. The origin may lie outside the canvas; pixels outside are
/// treated as transparent by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropRegion {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from_corners(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        // Both spans come from an i32 pair, so they fit in u32.
        Self::new(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32)
    }

    /// Check if region has a non-zero area.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}
