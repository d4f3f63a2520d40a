// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/render.rs
//
// Software canvas: scaled image layer plus the selection outline.

use image::{Pixel, Rgba, RgbaImage, imageops};

use crate::app::document::DisplayImage;
use crate::config::{ConfigError, OverlayConfig};
use crate::domain::{CanvasBounds, CropRegion, Selection};

/// Cosmetic settings for the selection outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayStyle {
    pub color: Rgba<u8>,
    pub width: u32,
    /// Alternating on/off run lengths along the outline. Empty = solid.
    pub dash: Vec<u32>,
}

impl TryFrom<&OverlayConfig> for OverlayStyle {
    type Error = ConfigError;

    fn try_from(config: &OverlayConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            color: Rgba(config.stroke_rgba()?),
            width: config.stroke_width,
            dash: config.dash.clone(),
        })
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            color: Rgba(crate::constant::STROKE_COLOR),
            width: crate::constant::STROKE_WIDTH,
            dash: crate::constant::STROKE_DASH.to_vec(),
        }
    }
}

/// Scale the image to the canvas size. Done once per load.
pub fn scale_to_canvas(image: &DisplayImage, bounds: CanvasBounds) -> RgbaImage {
    if image.dimensions() == (bounds.width, bounds.height) {
        return image.pixels().clone();
    }
    imageops::resize(
        image.pixels(),
        bounds.width,
        bounds.height,
        imageops::FilterType::Triangle,
    )
}

/// Draw one frame: the image layer with the selection outline on top.
///
/// Depends only on its inputs, so identical inputs give identical rasters.
pub fn draw(layer: &RgbaImage, selection: &Selection, style: &OverlayStyle) -> RgbaImage {
    let mut canvas = layer.clone();
    stroke_rect(&mut canvas, selection.normalized(), style);
    canvas
}

fn stroke_rect(canvas: &mut RgbaImage, region: CropRegion, style: &OverlayStyle) {
    if style.width == 0 || (region.width == 0 && region.height == 0) {
        return;
    }

    let (x0, y0) = (region.x, region.y);
    let (x1, y1) = (x0 + i64::from(region.width), y0 + i64::from(region.height));
    let corners = [(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)];

    // Path points farther than one stroke width from the canvas paint nothing.
    let reach = i64::from(style.width);
    let (cw, ch) = (i64::from(canvas.width()), i64::from(canvas.height()));

    let mut dash = DashCursor::new(&style.dash);
    for pair in corners.windows(2) {
        let ((ax, ay), (bx, by)) = (pair[0], pair[1]);
        let steps = (bx - ax).abs().max((by - ay).abs());
        let (sx, sy) = ((bx - ax).signum(), (by - ay).signum());

        let span = visible_steps(ax, sx, -reach, cw + reach, steps).and_then(|(lo, hi)| {
            let (ylo, yhi) = visible_steps(ay, sy, -reach, ch + reach, steps)?;
            Some((lo.max(ylo), hi.min(yhi))).filter(|(lo, hi)| lo < hi)
        });
        let Some((lo, hi)) = span else {
            dash.skip(steps);
            continue;
        };

        dash.skip(lo);
        for i in lo..hi {
            if dash.advance() {
                stamp(canvas, ax + sx * i, ay + sy * i, style);
            }
        }
        dash.skip(steps - hi);
    }
}

/// Step range `[lo, hi)` within `0..steps` whose coordinate `start + dir * i`
/// falls inside `min..=max`.
fn visible_steps(start: i64, dir: i64, min: i64, max: i64, steps: i64) -> Option<(i64, i64)> {
    let (first, last) = match dir {
        0 if (min..=max).contains(&start) => (0, steps - 1),
        0 => return None,
        1 => (min - start, max - start),
        _ => (start - max, start - min),
    };
    let (lo, hi) = (first.max(0), last.min(steps - 1) + 1);
    (lo < hi).then_some((lo, hi))
}

/// Paint a `width`-sized square centered on the path point.
fn stamp(canvas: &mut RgbaImage, x: i64, y: i64, style: &OverlayStyle) {
    let half = i64::from(style.width / 2);
    let (cw, ch) = (i64::from(canvas.width()), i64::from(canvas.height()));

    for py in (y - half)..(y - half + i64::from(style.width)) {
        for px in (x - half)..(x - half + i64::from(style.width)) {
            if !(0..cw).contains(&px) || !(0..ch).contains(&py) {
                continue;
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let (ux, uy) = (px as u32, py as u32);
            if style.color[3] == u8::MAX {
                canvas.put_pixel(ux, uy, style.color);
            } else {
                canvas.get_pixel_mut(ux, uy).blend(&style.color);
            }
        }
    }
}

/// Walks a dash pattern one pixel at a time.
struct DashCursor<'a> {
    pattern: &'a [u32],
    total: u64,
    pos: u64,
}

impl<'a> DashCursor<'a> {
    fn new(pattern: &'a [u32]) -> Self {
        Self {
            pattern,
            total: pattern.iter().map(|&run| u64::from(run)).sum(),
            pos: 0,
        }
    }

    /// Move past `n` pixels without looking at them.
    #[allow(clippy::cast_sign_loss)]
    fn skip(&mut self, n: i64) {
        self.pos += n.max(0) as u64;
    }

    /// Whether the current pixel is inked; moves to the next one.
    fn advance(&mut self) -> bool {
        if self.total == 0 {
            return true;
        }

        let mut offset = self.pos % self.total;
        self.pos += 1;
        for (i, &run) in self.pattern.iter().enumerate() {
            let run = u64::from(run);
            if offset < run {
                return i % 2 == 0;
            }
            offset -= run;
        }
        true
    }
}
