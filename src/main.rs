// SPDX-License-Identifier: GPL-3.0-or-later
// src/main.rs
//
// Command-line driver: load an image, replay drags, export and upload crops.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;

use cropdeck::app::{CropWidget, WidgetMessage};
use cropdeck::config::AppConfig;
use cropdeck::domain::Point;
use cropdeck::upload::HttpUploadClient;

/// A pointer drag from one canvas position to another, written `x1,y1:x2,y2`.
#[derive(Debug, Clone, Copy)]
struct Drag {
    from: Point,
    to: Point,
}

impl FromStr for Drag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = s
            .split_once(':')
            .ok_or_else(|| format!("expected x1,y1:x2,y2, got {s:?}"))?;
        Ok(Self {
            from: parse_point(from)?,
            to: parse_point(to)?,
        })
    }
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y, got {s:?}"))?;
    let coord = |v: &str| {
        v.trim()
            .parse::<i32>()
            .map_err(|e| format!("bad coordinate {v:?}: {e}"))
    };
    Ok(Point::new(coord(x)?, coord(y)?))
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Image to crop.
    pub file: PathBuf,

    /// Config file (defaults to the platform config dir).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Use the fixed-size crop square; drags move it instead of spanning a new one.
    #[arg(long)]
    pub fixed: bool,

    /// Drag to replay, `x1,y1:x2,y2`. Each drag is followed by a save.
    #[arg(short, long = "drag")]
    drags: Vec<Drag>,

    /// Directory for exported crops.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Post each crop to the prediction endpoint.
    #[arg(short, long)]
    pub upload: bool,

    /// Prediction endpoint, overrides the config file.
    #[arg(long)]
    pub endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref()).context("failed to load config")?;
    if let Some(endpoint) = &args.endpoint {
        config.upload.endpoint = endpoint.clone();
    }
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.export.output_dir.clone());

    let mut widget = CropWidget::new(&config)?.with_output_dir(output_dir);
    if args.upload {
        if !config.widget.capabilities.supports_upload {
            bail!("uploads are disabled in the config");
        }
        let client = HttpUploadClient::new(&config.upload)?;
        log::info!("Uploading crops to {}", client.endpoint());
        widget = widget.with_uploader(Arc::new(client));
    }

    widget
        .load_path(&args.file)
        .await
        .with_context(|| format!("failed to load {}", args.file.display()))?;

    if args.fixed {
        widget.update(WidgetMessage::ToggleFixedCrop)?;
    }

    if args.drags.is_empty() {
        save(&mut widget)?;
    }
    for drag in &args.drags {
        widget.update(WidgetMessage::PointerDown(drag.from))?;
        if !widget.is_dragging() {
            log::warn!(
                "Drag from ({}, {}) missed the crop square",
                drag.from.x,
                drag.from.y
            );
        }
        widget.update(WidgetMessage::PointerMove(drag.to))?;
        widget.update(WidgetMessage::PointerUp)?;
        save(&mut widget)?;
    }

    widget.wait_for_uploads().await;

    let summary = serde_json::to_string_pretty(widget.history().entries())?;
    println!("{summary}");

    Ok(())
}

/// Save the current selection; empty or oversized selections are reported and skipped.
fn save(widget: &mut CropWidget) -> anyhow::Result<()> {
    match widget.update(WidgetMessage::SaveSelection) {
        Ok(_) => Ok(()),
        Err(cropdeck::WidgetError::EmptyCrop { width, height }) => {
            log::warn!("Skipping empty {width}x{height} selection");
            Ok(())
        }
        Err(e @ cropdeck::WidgetError::CropTooLarge { .. }) => {
            log::warn!("Skipping selection: {e}");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
