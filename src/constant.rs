// SPDX-License-Identifier: GPL-3.0-or-later
// src/constant.rs
//
// Widget constants and configuration defaults.

/// Default maximum canvas width in pixels.
pub const MAX_CANVAS_WIDTH: u32 = 1200;

/// Default maximum canvas height in pixels.
pub const MAX_CANVAS_HEIGHT: u32 = 1000;

/// Default edge length of the fixed crop square.
pub const FIXED_CROP_SIZE: u32 = 660;

/// Edge length of the selection shown before the first drag.
pub const INITIAL_SELECTION_SIZE: u32 = 600;

/// Minimum canvas dimension produced by the fit algorithm (prevents 0x0 canvases).
pub const MIN_CANVAS_SIZE: u32 = 1;

/// Default selection stroke color as written in the config file.
pub const STROKE_COLOR_HEX: &str = "#00ABEB";

/// [`STROKE_COLOR_HEX`] as opaque RGBA.
pub const STROKE_COLOR: [u8; 4] = [0x00, 0xAB, 0xEB, 0xFF];

/// Default selection stroke width in pixels.
pub const STROKE_WIDTH: u32 = 2;

/// Default dash pattern: 4 pixels on, 2 pixels off.
pub const STROKE_DASH: [u32; 2] = [4, 2];

/// Filename used for the exported crop, both on disk and in the upload form.
pub const CROP_FILENAME: &str = "recorte_da_imagem.png";

/// Multipart form field carrying the crop.
pub const UPLOAD_FIELD: &str = "file";

/// Default prediction endpoint.
pub const PREDICT_ENDPOINT: &str = "http://localhost:5001/predict";

/// Upload request timeout in seconds.
pub const UPLOAD_TIMEOUT_SECS: u64 = 30;

/// Config directory and file names under the platform config dir.
pub const CONFIG_DIR: &str = "cropdeck";
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the prediction endpoint.
pub const ENDPOINT_ENV: &str = "CROPDECK_ENDPOINT";

/// Prefix a history entry's data URL must carry.
pub const DATA_URL_IMAGE_PREFIX: &str = "data:image";

/// Capacity of the upload result channel.
pub const UPLOAD_CHANNEL_CAPACITY: usize = 32;
