// SPDX-License-Identifier: GPL-3.0-or-later
// src/lib.rs
//
// Cropdeck: drag-to-crop image widget with optional prediction upload.

pub mod app;
pub mod config;
pub mod constant;
pub mod domain;
pub mod error;
pub mod upload;

pub use app::{CropWidget, Effect, SavedSelection, SelectionId, UploadStatus, WidgetMessage};
pub use config::AppConfig;
pub use domain::{CanvasBounds, CropRegion, Point, Selection};
pub use error::{WidgetError, WidgetResult};
