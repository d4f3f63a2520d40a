// SPDX-License-Identifier: GPL-3.0-or-later
// src/upload/error.rs
//
// Upload error types.

use thiserror::Error;

pub type UploadResult<T> = Result<T, UploadError>;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("prediction endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid endpoint {0:?}")]
    Endpoint(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("upload task ended unexpectedly: {0}")]
    Task(String),
}
