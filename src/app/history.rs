// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/history.rs
//
// Append-only list of exported crops for the session.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::constant::DATA_URL_IMAGE_PREFIX;

/// Position-independent handle of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SelectionId(pub u64);

/// State of the prediction request attached to an entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum UploadStatus {
    /// Upload disabled for this widget.
    NotRequested,
    Pending,
    Succeeded(Value),
    Failed(String),
}

impl UploadStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, UploadStatus::Pending)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SavedSelection {
    pub id: SelectionId,
    /// Encoded PNG; shared with the upload task.
    #[serde(skip)]
    pub png: Arc<[u8]>,
    #[serde(skip)]
    pub data_url: String,
    pub width: u32,
    pub height: u32,
    pub sha256: String,
    /// Where the crop was written, if it was exported to disk.
    pub path: Option<PathBuf>,
    pub upload: UploadStatus,
}

#[derive(Debug, Default)]
pub struct History {
    entries: Vec<SavedSelection>,
    /// Data URLs accepted from outside the extractor.
    external: Vec<String>,
    next_id: u64,
}

impl History {
    pub fn next_id(&mut self) -> SelectionId {
        let id = SelectionId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn push(&mut self, entry: SavedSelection) {
        self.entries.push(entry);
    }

    /// Keep an externally produced data URL if it holds an image.
    pub fn push_data_url(&mut self, url: &str) -> bool {
        if url.starts_with(DATA_URL_IMAGE_PREFIX) {
            self.external.push(url.to_string());
            true
        } else {
            false
        }
    }

    /// Attach a late upload result. Returns false for unknown ids.
    pub fn set_upload(&mut self, id: SelectionId, status: UploadStatus) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.upload = status;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: SelectionId) -> Option<&SavedSelection> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn entries(&self) -> &[SavedSelection] {
        &self.entries
    }

    pub fn external(&self) -> &[String] {
        &self.external
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pending_uploads(&self) -> usize {
        self.entries.iter().filter(|e| e.upload.is_pending()).count()
    }
}
