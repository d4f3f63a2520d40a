// SPDX-License-Identifier: GPL-3.0-or-later
// tests/upload.rs
//
// Fire-and-forget uploads against a fake prediction endpoint.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbaImage};
use serde_json::{Value, json};
use tokio::sync::Notify;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cropdeck::app::UploadStatus;
use cropdeck::config::{AppConfig, UploadConfig};
use cropdeck::upload::{HttpUploadClient, UploadClient, UploadError, UploadResult};
use cropdeck::{CropWidget, Point};

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(RgbaImage::new(width, height))
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

async fn loaded_widget(config: &AppConfig, uploader: Arc<dyn UploadClient>) -> CropWidget {
    let mut widget = CropWidget::new(config).unwrap().with_uploader(uploader);
    widget.load_bytes(png_bytes(100, 100)).await.unwrap();
    widget.pointer_down(Point::new(10, 10));
    widget.pointer_move(Point::new(42, 26));
    widget.pointer_up();
    widget
}

fn http_client(server: &MockServer) -> Arc<dyn UploadClient> {
    let config = UploadConfig {
        endpoint: format!("{}/predict", server.uri()),
        ..UploadConfig::default()
    };
    Arc::new(HttpUploadClient::new(&config).unwrap())
}

#[tokio::test]
async fn prediction_is_attached_to_saved_entry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"label": "leaf", "score": 0.9})))
        .expect(1)
        .mount(&server)
        .await;

    let mut widget = loaded_widget(&AppConfig::default(), http_client(&server)).await;
    let id = widget.save_selection().unwrap();
    widget.wait_for_uploads().await;

    let entry = widget.history().get(id).unwrap();
    assert_eq!((entry.width, entry.height), (32, 16));
    assert_eq!(
        entry.upload,
        UploadStatus::Succeeded(json!({"label": "leaf", "score": 0.9}))
    );

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"recorte_da_imagem.png\""));
}

#[tokio::test]
async fn server_error_keeps_entry_without_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model offline"))
        .mount(&server)
        .await;

    let mut widget = loaded_widget(&AppConfig::default(), http_client(&server)).await;
    widget.save_selection().unwrap();
    widget.wait_for_uploads().await;

    let entries = widget.history().entries();
    assert_eq!(entries.len(), 1);
    match &entries[0].upload {
        UploadStatus::Failed(msg) => assert!(msg.contains("500"), "{msg}"),
        other => panic!("unexpected status {other:?}"),
    }
}

/// Holds every upload until released.
struct GatedUploader {
    gate: Notify,
}

#[async_trait]
impl UploadClient for GatedUploader {
    async fn upload(&self, buffer: Arc<[u8]>, filename: &str) -> UploadResult<Value> {
        self.gate.notified().await;
        Ok(json!({ "bytes": buffer.len(), "filename": filename }))
    }
}

#[tokio::test]
async fn save_returns_before_upload_finishes() {
    let uploader = Arc::new(GatedUploader {
        gate: Notify::new(),
    });
    let mut widget = loaded_widget(&AppConfig::default(), uploader.clone()).await;

    let id = widget.save_selection().unwrap();
    assert_eq!(widget.history().get(id).unwrap().upload, UploadStatus::Pending);
    assert_eq!(widget.drain_upload_events(), 0);

    uploader.gate.notify_one();
    widget.wait_for_uploads().await;

    let entry = widget.history().get(id).unwrap();
    match &entry.upload {
        UploadStatus::Succeeded(payload) => {
            assert_eq!(payload["filename"], "recorte_da_imagem.png");
            assert_eq!(payload["bytes"], entry.png.len());
        }
        other => panic!("unexpected status {other:?}"),
    }
}

struct FailingUploader;

#[async_trait]
impl UploadClient for FailingUploader {
    async fn upload(&self, _buffer: Arc<[u8]>, _filename: &str) -> UploadResult<Value> {
        Err(UploadError::Status {
            status: 503,
            body: "busy".to_string(),
        })
    }
}

#[tokio::test]
async fn failed_uploads_do_not_reorder_or_drop_entries() {
    let mut widget = loaded_widget(&AppConfig::default(), Arc::new(FailingUploader)).await;
    let ids: Vec<_> = (0..3).map(|_| widget.save_selection().unwrap()).collect();
    widget.wait_for_uploads().await;

    let entries = widget.history().entries();
    assert_eq!(entries.iter().map(|e| e.id).collect::<Vec<_>>(), ids);
    assert!(entries.iter().all(|e| matches!(e.upload, UploadStatus::Failed(_))));
}

#[tokio::test]
async fn upload_capability_off_never_uploads() {
    let mut config = AppConfig::default();
    config.widget.capabilities.supports_upload = false;

    let mut widget = loaded_widget(&config, Arc::new(FailingUploader)).await;
    let id = widget.save_selection().unwrap();
    widget.wait_for_uploads().await;

    assert_eq!(widget.history().get(id).unwrap().upload, UploadStatus::NotRequested);
}
