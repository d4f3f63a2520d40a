// SPDX-License-Identifier: GPL-3.0-or-later
// src/upload/client.rs
//
// Multipart POST of an exported crop to the prediction endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde_json::Value;

use super::error::{UploadError, UploadResult};
use crate::config::UploadConfig;

/// Receives exported crops. The widget never awaits this directly.
#[async_trait]
pub trait UploadClient: Send + Sync {
    /// Send `buffer` under `filename`; returns the endpoint's response payload.
    async fn upload(&self, buffer: Arc<[u8]>, filename: &str) -> UploadResult<Value>;
}

pub struct HttpUploadClient {
    http: Client,
    endpoint: Url,
    field_name: String,
}

impl HttpUploadClient {
    pub fn new(config: &UploadConfig) -> UploadResult<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|_| UploadError::Endpoint(config.endpoint.clone()))?;
        let http = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            http,
            endpoint,
            field_name: config.field_name.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl UploadClient for HttpUploadClient {
    async fn upload(&self, buffer: Arc<[u8]>, filename: &str) -> UploadResult<Value> {
        let part = Part::bytes(buffer.to_vec())
            .file_name(filename.to_string())
            .mime_str("image/png")?;
        let form = Form::new().part(self.field_name.clone(), part);

        log::debug!("Uploading {} bytes to {}", buffer.len(), self.endpoint);
        let response = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(UploadError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // Non-JSON bodies are kept verbatim.
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}
