// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/widget.rs
//
// The crop widget: owns the image, canvas, selection and export history.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use tokio::sync::mpsc;

use super::document::DisplayImage;
use super::export::write_crop;
use super::extract::{EncodedCrop, extract};
use super::history::{History, SavedSelection, SelectionId, UploadStatus};
use super::message::{Effect, UploadEvent, WidgetMessage};
use super::render::{self, OverlayStyle};
use super::selection::{CropMode, SelectionTracker};
use crate::config::{AppConfig, WidgetConfig};
use crate::constant::UPLOAD_CHANNEL_CAPACITY;
use crate::domain::{CanvasBounds, CropRegion, Point, Selection};
use crate::error::{WidgetError, WidgetResult};
use crate::upload::{UploadClient, UploadError};

/// Everything derived from the currently loaded image.
struct LoadedImage {
    image: DisplayImage,
    bounds: CanvasBounds,
    /// Image scaled to `bounds`; every redraw starts from here.
    layer: RgbaImage,
    /// Last drawn frame (layer + selection outline); the extractor copies from here.
    frame: RgbaImage,
}

pub struct CropWidget {
    config: WidgetConfig,
    style: OverlayStyle,
    upload_filename: String,
    output_dir: Option<PathBuf>,
    export_filename: String,

    loaded: Option<LoadedImage>,
    tracker: SelectionTracker,
    history: History,

    uploader: Option<Arc<dyn UploadClient>>,
    events_tx: mpsc::Sender<UploadEvent>,
    events_rx: mpsc::Receiver<UploadEvent>,

    redraws: u64,
}

impl CropWidget {
    pub fn new(config: &AppConfig) -> WidgetResult<Self> {
        let (events_tx, events_rx) = mpsc::channel(UPLOAD_CHANNEL_CAPACITY);
        let initial = Selection::square(config.widget.initial_selection_size);

        Ok(Self {
            config: config.widget.clone(),
            style: OverlayStyle::try_from(&config.overlay)?,
            upload_filename: config.upload.filename.clone(),
            output_dir: None,
            export_filename: config.export.crop_filename.clone(),
            loaded: None,
            tracker: SelectionTracker::new(initial),
            history: History::default(),
            uploader: None,
            events_tx,
            events_rx,
            redraws: 0,
        })
    }

    /// Attach the prediction collaborator. Ignored when uploads are disabled.
    pub fn with_uploader(mut self, uploader: Arc<dyn UploadClient>) -> Self {
        if self.config.capabilities.supports_upload {
            self.uploader = Some(uploader);
        } else {
            log::debug!("Upload capability disabled, uploader not attached");
        }
        self
    }

    /// Write every saved crop into `dir`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    // =========================================================================
    // Image loading
    // =========================================================================

    /// Decode `path` off the calling thread and show it.
    /// On failure the previous image stays.
    pub async fn load_path(&mut self, path: &Path) -> WidgetResult<CanvasBounds> {
        let owned = path.to_path_buf();
        let decoded = tokio::task::spawn_blocking(move || DisplayImage::open(&owned)).await?;
        match decoded {
            Ok(image) => Ok(self.set_image(image)),
            Err(e) => {
                log::error!("Failed to load {}: {}", path.display(), e);
                Err(e)
            }
        }
    }

    /// Decode encoded image bytes off the calling thread and show them.
    pub async fn load_bytes(&mut self, bytes: Vec<u8>) -> WidgetResult<CanvasBounds> {
        let decoded = tokio::task::spawn_blocking(move || DisplayImage::from_bytes(&bytes)).await?;
        match decoded {
            Ok(image) => Ok(self.set_image(image)),
            Err(e) => {
                log::error!("Failed to decode image bytes: {}", e);
                Err(e)
            }
        }
    }

    /// Replace the image, fit the canvas and draw the first frame.
    pub fn set_image(&mut self, image: DisplayImage) -> CanvasBounds {
        let (width, height) = image.dimensions();
        let bounds = CanvasBounds::fit(
            width,
            height,
            self.config.max_canvas_width,
            self.config.max_canvas_height,
        );
        log::info!(
            "Loaded {}x{} image, canvas {}x{}",
            width,
            height,
            bounds.width,
            bounds.height
        );

        if let CropMode::Fixed(size) = self.tracker.mode {
            if !bounds.fits_square(size) {
                log::warn!(
                    "Fixed crop of {}px does not fit {}x{} canvas, switching to free mode",
                    size,
                    bounds.width,
                    bounds.height
                );
                self.tracker.enter_free();
            }
        }
        self.tracker.clamp_to(bounds);

        let layer = render::scale_to_canvas(&image, bounds);
        let frame = layer.clone();
        self.loaded = Some(LoadedImage {
            image,
            bounds,
            layer,
            frame,
        });
        self.redraw();
        bounds
    }

    // =========================================================================
    // Message handling
    // =========================================================================

    pub fn update(&mut self, message: WidgetMessage) -> WidgetResult<Effect> {
        let redrawn = |changed: bool| if changed { Effect::Redrawn } else { Effect::None };

        match message {
            WidgetMessage::PointerDown(point) => {
                self.pointer_down(point);
                Ok(Effect::None)
            }
            WidgetMessage::PointerMove(point) => Ok(redrawn(self.pointer_move(point))),
            WidgetMessage::PointerUp => {
                self.pointer_up();
                Ok(Effect::None)
            }
            WidgetMessage::ToggleFixedCrop => self.toggle_fixed_crop().map(Effect::FixedCrop),
            WidgetMessage::SaveSelection => self.save_selection().map(Effect::Saved),
            WidgetMessage::AddDataUrl(url) => {
                if !self.history.push_data_url(&url) {
                    log::warn!("Ignoring non-image data URL");
                }
                Ok(Effect::None)
            }
            WidgetMessage::UploadFinished(event) => {
                self.apply_upload_event(event);
                Ok(Effect::None)
            }
        }
    }

    /// Returns true when a drag started.
    pub fn pointer_down(&mut self, point: Point) -> bool {
        let started = self.tracker.pointer_down(point);
        log::debug!("Pointer down at ({}, {}), dragging: {}", point.x, point.y, started);
        started
    }

    /// Returns true when the selection changed (and was redrawn).
    pub fn pointer_move(&mut self, point: Point) -> bool {
        let Some(bounds) = self.bounds() else {
            return false;
        };
        let changed = self.tracker.pointer_move(point, bounds);
        if changed {
            self.redraw();
        }
        changed
    }

    pub fn pointer_up(&mut self) {
        self.tracker.pointer_up();
    }

    /// Flip fixed crop mode and return the new state.
    ///
    /// Entering fixed mode resets the selection to a square at the origin and
    /// fails if the square does not fit the current canvas.
    pub fn toggle_fixed_crop(&mut self) -> WidgetResult<bool> {
        if !self.config.capabilities.supports_fixed_crop {
            return Err(WidgetError::FixedCropDisabled);
        }

        match self.tracker.mode {
            CropMode::Fixed(_) => {
                self.tracker.enter_free();
                Ok(false)
            }
            CropMode::Free => {
                let size = self.config.fixed_crop_size;
                if let Some(bounds) = self.bounds() {
                    if !bounds.fits_square(size) {
                        return Err(WidgetError::FixedCropUnavailable {
                            size,
                            width: bounds.width,
                            height: bounds.height,
                        });
                    }
                }
                self.tracker.enter_fixed(size);
                self.redraw();
                Ok(true)
            }
        }
    }

    /// Redraw the frame from scratch. No-op until an image is loaded.
    pub fn redraw(&mut self) {
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };
        loaded.frame = render::draw(&loaded.layer, &self.tracker.selection, &self.style);
        self.redraws += 1;
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Region the next save would copy.
    pub fn crop_region(&self) -> Option<CropRegion> {
        self.bounds().map(|bounds| self.tracker.crop_region(bounds))
    }

    /// Copy the current selection out of the drawn canvas, outline included.
    ///
    /// A region wider or taller than the canvas is refused before anything is
    /// allocated.
    pub fn extract_crop(&self) -> WidgetResult<RgbaImage> {
        let loaded = self.loaded.as_ref().ok_or(WidgetError::NoImage)?;
        let region = self.tracker.crop_region(loaded.bounds);
        if region.width > loaded.bounds.width || region.height > loaded.bounds.height {
            return Err(WidgetError::CropTooLarge {
                width: region.width,
                height: region.height,
                max_width: loaded.bounds.width,
                max_height: loaded.bounds.height,
            });
        }
        Ok(extract(&loaded.frame, region))
    }

    /// Export the current selection: encode it, write it to the output dir if
    /// one is set, append it to the history and hand it to the uploader.
    ///
    /// Returns once the entry is appended; upload results arrive later as
    /// [`UploadEvent`]s. Nothing is appended or uploaded when encoding fails.
    pub fn save_selection(&mut self) -> WidgetResult<SelectionId> {
        let buffer = self.extract_crop().inspect_err(|e| {
            log::warn!("Crop not extracted: {}", e);
        })?;
        let encoded = EncodedCrop::encode(&buffer).inspect_err(|e| {
            log::error!("Crop export failed: {}", e);
        })?;

        let path = match &self.output_dir {
            Some(dir) => Some(write_crop(dir, &self.export_filename, &encoded.png)?),
            None => None,
        };

        let id = self.history.next_id();
        let png: Arc<[u8]> = Arc::from(encoded.png.as_slice());
        let upload = match &self.uploader {
            Some(_) => UploadStatus::Pending,
            None => UploadStatus::NotRequested,
        };

        self.history.push(SavedSelection {
            id,
            png: Arc::clone(&png),
            data_url: encoded.data_url(),
            width: encoded.width,
            height: encoded.height,
            sha256: encoded.digest(),
            path,
            upload,
        });
        log::info!("Saved {}x{} crop as #{}", encoded.width, encoded.height, id.0);

        if let Some(uploader) = self.uploader.clone() {
            self.spawn_upload(uploader, id, png);
        }

        Ok(id)
    }

    fn spawn_upload(&mut self, uploader: Arc<dyn UploadClient>, id: SelectionId, png: Arc<[u8]>) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            log::error!("No async runtime, crop #{} not uploaded", id.0);
            self.history
                .set_upload(id, UploadStatus::Failed("no async runtime".to_string()));
            return;
        };

        let tx = self.events_tx.clone();
        let filename = self.upload_filename.clone();
        runtime.spawn(async move {
            let task = tokio::spawn(async move { uploader.upload(png, &filename).await });
            let result = task
                .await
                .unwrap_or_else(|e| Err(UploadError::Task(e.to_string())));
            if tx.send(UploadEvent { id, result }).await.is_err() {
                log::debug!("Widget dropped before upload #{} finished", id.0);
            }
        });
    }

    /// Attach a finished upload to its history entry.
    pub fn apply_upload_event(&mut self, event: UploadEvent) {
        let status = match event.result {
            Ok(payload) => {
                log::info!("Prediction received for crop #{}", event.id.0);
                UploadStatus::Succeeded(payload)
            }
            Err(e) => {
                log::warn!("Upload of crop #{} failed: {}", event.id.0, e);
                UploadStatus::Failed(e.to_string())
            }
        };
        if !self.history.set_upload(event.id, status) {
            log::warn!("Upload result for unknown crop #{}", event.id.0);
        }
    }

    /// Apply every upload result that has already arrived.
    pub fn drain_upload_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_upload_event(event);
            applied += 1;
        }
        applied
    }

    /// Wait until no upload is pending.
    pub async fn wait_for_uploads(&mut self) {
        while self.history.pending_uploads() > 0 {
            match self.events_rx.recv().await {
                Some(event) => self.apply_upload_event(event),
                None => break,
            }
        }
    }

    /// Keep an externally produced data URL; non-image URLs are ignored.
    pub fn add_saved_data_url(&mut self, url: &str) -> bool {
        self.history.push_data_url(url)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn bounds(&self) -> Option<CanvasBounds> {
        self.loaded.as_ref().map(|l| l.bounds)
    }

    pub fn image_dimensions(&self) -> Option<(u32, u32)> {
        self.loaded.as_ref().map(|l| l.image.dimensions())
    }

    pub fn frame(&self) -> Option<&RgbaImage> {
        self.loaded.as_ref().map(|l| &l.frame)
    }

    pub fn selection(&self) -> Selection {
        self.tracker.selection
    }

    pub fn is_fixed_crop(&self) -> bool {
        matches!(self.tracker.mode, CropMode::Fixed(_))
    }

    pub fn is_dragging(&self) -> bool {
        self.tracker.is_dragging()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba};

    fn gradient(width: u32, height: u32) -> DisplayImage {
        DisplayImage::from_image(DynamicImage::ImageRgba8(RgbaImage::from_fn(
            width,
            height,
            |x, y| Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255]),
        )))
    }

    fn widget() -> CropWidget {
        CropWidget::new(&AppConfig::default()).unwrap()
    }

    #[test]
    fn load_fits_canvas() {
        let mut w = widget();
        assert_eq!(w.set_image(gradient(2000, 1000)), CanvasBounds::new(1200, 600));
        assert_eq!(w.frame().unwrap().dimensions(), (1200, 600));
        assert_eq!(w.image_dimensions(), Some((2000, 1000)));
    }

    #[test]
    fn free_drag_crops_normalized_region() {
        let mut w = widget();
        w.set_image(gradient(200, 100));
        w.pointer_down(Point::new(50, 50));
        assert!(w.pointer_move(Point::new(10, 10)));
        w.pointer_up();

        assert_eq!(w.crop_region(), Some(CropRegion::new(10, 10, 40, 40)));
        let crop = w.extract_crop().unwrap();
        assert_eq!(crop.dimensions(), (40, 40));
        assert_eq!(crop.get_pixel(0, 0), &Rgba(crate::constant::STROKE_COLOR));
        assert_eq!(crop.get_pixel(5, 5), &Rgba([15, 15, 128, 255]));
    }

    #[test]
    fn crop_matches_drawn_frame() {
        let mut w = widget();
        w.set_image(gradient(120, 80));
        w.pointer_down(Point::new(20, 10));
        w.pointer_move(Point::new(70, 60));
        w.pointer_up();

        let crop = w.extract_crop().unwrap();
        let frame = w.frame().unwrap();
        for (x, y, pixel) in crop.enumerate_pixels() {
            assert_eq!(pixel, frame.get_pixel(x + 20, y + 10), "({x}, {y})");
        }
    }

    #[test]
    fn oversized_free_crop_is_refused() {
        let mut w = widget();
        w.set_image(gradient(100, 100));
        w.pointer_down(Point::new(0, 0));
        assert!(w.pointer_move(Point::new(1_000_000, 1_000_000)));
        w.pointer_up();

        let err = w.save_selection().unwrap_err();
        assert!(matches!(
            err,
            WidgetError::CropTooLarge {
                width: 1_000_000,
                height: 1_000_000,
                max_width: 100,
                max_height: 100,
            }
        ));
        assert!(w.history().is_empty());
    }

    #[test]
    fn each_move_redraws() {
        let mut w = widget();
        w.set_image(gradient(100, 100));
        let base = w.redraw_count();
        w.pointer_down(Point::new(0, 0));
        w.pointer_move(Point::new(10, 10));
        w.pointer_move(Point::new(20, 20));
        w.pointer_move(Point::new(20, 20));
        assert_eq!(w.redraw_count(), base + 2);
    }

    #[test]
    fn pointer_events_without_image_are_harmless() {
        let mut w = widget();
        w.pointer_down(Point::new(5, 5));
        assert!(!w.pointer_move(Point::new(10, 10)));
        w.pointer_up();
        assert!(matches!(w.save_selection(), Err(WidgetError::NoImage)));
        assert!(w.history().is_empty());
    }

    #[test]
    fn fixed_mode_clamps_and_crops_fixed_size() {
        let mut w = widget();
        w.set_image(gradient(800, 700));
        assert!(w.toggle_fixed_crop().unwrap());
        assert_eq!(w.selection(), Selection::new(0, 0, 660, 660));

        assert!(w.pointer_down(Point::new(10, 10)));
        w.pointer_move(Point::new(510, 510));
        w.pointer_up();
        assert_eq!(w.selection().origin(), Point::new(140, 40));
        assert_eq!(w.extract_crop().unwrap().dimensions(), (660, 660));
    }

    #[test]
    fn fixed_mode_refused_on_small_canvas() {
        let mut w = widget();
        w.set_image(gradient(800, 600));
        let err = w.toggle_fixed_crop().unwrap_err();
        assert!(matches!(err, WidgetError::FixedCropUnavailable { size: 660, .. }));
        assert!(!w.is_fixed_crop());
    }

    #[test]
    fn small_image_load_leaves_fixed_mode() {
        let mut w = widget();
        w.set_image(gradient(1000, 900));
        assert!(w.toggle_fixed_crop().unwrap());
        w.set_image(gradient(300, 300));
        assert!(!w.is_fixed_crop());
    }

    #[test]
    fn fixed_origin_is_reclamped_after_smaller_load() {
        let mut w = widget();
        w.set_image(gradient(1200, 1000));
        assert!(w.toggle_fixed_crop().unwrap());
        assert!(w.pointer_down(Point::new(10, 10)));
        w.pointer_move(Point::new(550, 350));
        w.pointer_up();
        assert_eq!(w.selection().origin(), Point::new(540, 340));

        w.set_image(gradient(700, 700));
        assert!(w.is_fixed_crop());
        assert_eq!(w.selection(), Selection::new(40, 40, 660, 660));
        assert_eq!(w.crop_region(), Some(CropRegion::new(40, 40, 660, 660)));
        assert!(w.pointer_down(Point::new(400, 400)));
    }

    #[test]
    fn fixed_mode_capability_can_be_disabled() {
        let mut config = AppConfig::default();
        config.widget.capabilities.supports_fixed_crop = false;
        let mut w = CropWidget::new(&config).unwrap();
        assert!(matches!(w.toggle_fixed_crop(), Err(WidgetError::FixedCropDisabled)));
    }

    #[test]
    fn zero_area_save_appends_nothing() {
        let mut w = widget();
        w.set_image(gradient(100, 100));
        w.pointer_down(Point::new(30, 30));
        w.pointer_move(Point::new(30, 60));
        w.pointer_up();
        let err = w.save_selection().unwrap_err();
        assert!(matches!(err, WidgetError::EmptyCrop { width: 0, height: 30 }));
        assert!(w.history().is_empty());
    }

    #[test]
    fn saves_are_appended_in_order_without_uploader() {
        let mut w = widget();
        w.set_image(gradient(100, 100));
        let mut ids = Vec::new();
        for size in [10, 20, 30] {
            w.pointer_down(Point::new(0, 0));
            w.pointer_move(Point::new(size, size));
            w.pointer_up();
            ids.push(w.save_selection().unwrap());
        }

        let entries = w.history().entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries.iter().map(|e| e.id).collect::<Vec<_>>(), ids);
        assert_eq!(entries.iter().map(|e| e.width).collect::<Vec<_>>(), vec![10, 20, 30]);
        assert!(entries.iter().all(|e| e.upload == UploadStatus::NotRequested));
        assert!(entries[0].data_url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn initial_selection_is_saved_without_drag() {
        let mut w = widget();
        w.set_image(gradient(1000, 800));
        w.save_selection().unwrap();
        let entry = &w.history().entries()[0];
        assert_eq!((entry.width, entry.height), (600, 600));
    }

    #[test]
    fn update_routes_messages() {
        let mut w = widget();
        w.set_image(gradient(100, 100));
        assert_eq!(w.update(WidgetMessage::PointerDown(Point::new(1, 1))).unwrap(), Effect::None);
        assert_eq!(
            w.update(WidgetMessage::PointerMove(Point::new(9, 9))).unwrap(),
            Effect::Redrawn
        );
        w.update(WidgetMessage::PointerUp).unwrap();
        assert!(matches!(
            w.update(WidgetMessage::SaveSelection).unwrap(),
            Effect::Saved(_)
        ));
        w.update(WidgetMessage::AddDataUrl("data:image/png;base64,AA".into()))
            .unwrap();
        assert_eq!(w.history().external().len(), 1);
    }
}
