// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/document.rs
//
// The loaded source image.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, GenericImageView, ImageReader, RgbaImage};

use crate::error::{WidgetError, WidgetResult};

/// Decoded source image. Immutable once loaded; replaced wholesale on reload.
pub struct DisplayImage {
    /// Decoded pixels, converted once to RGBA for drawing.
    pixels: RgbaImage,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for DisplayImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DisplayImage({}x{})", self.width, self.height)
    }
}

impl DisplayImage {
    /// Decode an image file from disk. Blocking.
    pub fn open(path: &Path) -> WidgetResult<Self> {
        let reader = ImageReader::open(path).map_err(|source| WidgetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = reader.with_guessed_format().map_err(|source| WidgetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_image(reader.decode()?))
    }

    /// Decode an in-memory encoded image. Blocking.
    pub fn from_bytes(bytes: &[u8]) -> WidgetResult<Self> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| WidgetError::Decode(image::ImageError::IoError(e)))?;
        Ok(Self::from_image(reader.decode()?))
    }

    pub fn from_image(image: DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            pixels: image.to_rgba8(),
            width,
            height,
        }
    }

    /// Returns the natural pixel dimensions (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}
