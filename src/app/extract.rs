// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/extract.rs
//
// Copy a crop region out of the canvas and encode it for export.

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageFormat, RgbaImage, imageops};
use sha2::{Digest, Sha256};

use crate::domain::CropRegion;
use crate::error::{WidgetError, WidgetResult};

/// Copy `region` out of `canvas` into a buffer of exactly `region`'s size.
///
/// Parts of the region outside the canvas stay transparent. A zero-area
/// region yields a zero-size buffer.
pub fn extract(canvas: &RgbaImage, region: CropRegion) -> RgbaImage {
    let mut out = RgbaImage::new(region.width, region.height);
    if !region.is_valid() {
        return out;
    }

    let (cw, ch) = (i64::from(canvas.width()), i64::from(canvas.height()));
    let left = region.x.max(0);
    let top = region.y.max(0);
    let right = (region.x + i64::from(region.width)).min(cw);
    let bottom = (region.y + i64::from(region.height)).min(ch);
    if left >= right || top >= bottom {
        return out;
    }

    // All values are inside [0, canvas dim] or [0, region dim] here.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let visible = imageops::crop_imm(
        canvas,
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    )
    .to_image();
    imageops::replace(&mut out, &visible, left - region.x, top - region.y);
    out
}

/// A crop encoded as PNG, ready for the history list, disk and upload.
#[derive(Debug, Clone)]
pub struct EncodedCrop {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl EncodedCrop {
    /// Encode the buffer. Empty buffers are rejected: there is nothing to export.
    pub fn encode(buffer: &RgbaImage) -> WidgetResult<Self> {
        let (width, height) = buffer.dimensions();
        if width == 0 || height == 0 {
            return Err(WidgetError::EmptyCrop { width, height });
        }

        let mut png = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(buffer.clone())
            .write_to(&mut png, ImageFormat::Png)
            .map_err(|e| WidgetError::Encode(e.to_string()))?;

        let png = png.into_inner();
        if png.is_empty() {
            return Err(WidgetError::Encode("encoder produced no data".to_string()));
        }

        Ok(Self { png, width, height })
    }

    /// `data:` URL of the PNG, for display next to the history entry.
    pub fn data_url(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.png))
    }

    /// Hex SHA-256 of the PNG bytes.
    pub fn digest(&self) -> String {
        Sha256::digest(&self.png)
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}
