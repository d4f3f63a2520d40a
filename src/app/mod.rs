// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/mod.rs
//
// Widget runtime: image loading, selection tracking, drawing and export.

pub mod document;
pub mod export;
pub mod extract;
pub mod history;
pub mod message;
pub mod render;
pub mod selection;
pub mod widget;

pub use document::DisplayImage;
pub use history::{History, SavedSelection, SelectionId, UploadStatus};
pub use message::{Effect, UploadEvent, WidgetMessage};
pub use render::OverlayStyle;
pub use selection::{CropMode, SelectionTracker};
pub use widget::CropWidget;
