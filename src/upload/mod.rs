// SPDX-License-Identifier: GPL-3.0-or-later
// src/upload/mod.rs
//
// Prediction endpoint collaborator.

pub mod client;
pub mod error;

pub use client::{HttpUploadClient, UploadClient};
pub use error::{UploadError, UploadResult};
