// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/export.rs
//
// Write exported crops to disk.

use std::path::{Path, PathBuf};

use crate::error::{WidgetError, WidgetResult};

/// Write `png` into `dir` under `filename`, never overwriting an earlier crop.
///
/// Collisions get a ` (n)` suffix before the extension, like a browser download.
pub fn write_crop(dir: &Path, filename: &str, png: &[u8]) -> WidgetResult<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|source| WidgetError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = unique_path(dir, filename);
    std::fs::write(&path, png).map_err(|source| WidgetError::Write {
        path: path.clone(),
        source,
    })?;

    log::info!("Crop saved to {}", path.display());
    Ok(path)
}

fn unique_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }

    let name = Path::new(filename);
    let stem = name
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    let ext = name.extension().and_then(|s| s.to_str());

    (1u32..)
        .map(|n| match ext {
            Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
            None => dir.join(format!("{stem} ({n})")),
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}
