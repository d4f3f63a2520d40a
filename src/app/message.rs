// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/message.rs
//
// Widget messages: pointer events, user actions, and late upload results.

use serde_json::Value;

use crate::app::history::SelectionId;
use crate::domain::Point;
use crate::upload::UploadResult;

#[derive(Debug)]
pub enum WidgetMessage {
    // Pointer.
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,

    // Tool modes.
    ToggleFixedCrop,

    // Export.
    SaveSelection,
    AddDataUrl(String),

    // Async completions.
    UploadFinished(UploadEvent),
}

/// Result of a fire-and-forget upload, delivered after the entry was appended.
#[derive(Debug)]
pub struct UploadEvent {
    pub id: SelectionId,
    pub result: UploadResult<Value>,
}

/// What a handled message changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Redrawn,
    FixedCrop(bool),
    Saved(SelectionId),
}
