// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/mod.rs
//
// Pure crop geometry, free of rendering and I/O.

pub mod crop;
pub mod geometry;

pub use crop::{CropRegion, Selection};
pub use geometry::{CanvasBounds, Point};
