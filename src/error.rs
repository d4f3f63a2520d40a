// SPDX-License-Identifier: GPL-3.0-or-later
// src/error.rs
//
// Widget error types.

use std::path::PathBuf;

use thiserror::Error;

pub type WidgetResult<T> = Result<T, WidgetError>;

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no image loaded")]
    NoImage,

    #[error("selection has zero area ({width}x{height})")]
    EmptyCrop { width: u32, height: u32 },

    #[error("selection of {width}x{height} exceeds the {max_width}x{max_height} canvas")]
    CropTooLarge {
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },

    #[error("failed to encode crop: {0}")]
    Encode(String),

    #[error("failed to write crop to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("fixed crop of {size}px does not fit a {width}x{height} canvas")]
    FixedCropUnavailable { size: u32, width: u32, height: u32 },

    #[error("fixed crop mode is disabled for this widget")]
    FixedCropDisabled,

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error("decoder task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
