//! HTTP client for the caption pipeline API.
//!
//! One method per remote operation, each a single request/response with an
//! explicit success/failure outcome. Failures carry the HTTP status and the
//! server-provided `message` when the body is parseable JSON; anything else
//! falls back to a generic status-coded message.

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crackd_core::models::{CaptionRecord, UploadSlot};
use crackd_core::{Config, PipelineError};

/// The four remote operations composing one logical upload/generate run.
/// Behind a trait so the workflow can be driven against a mock.
#[async_trait]
pub trait PipelineApi: Send + Sync {
    /// Obtain a presigned upload URL and the object's future public URL.
    async fn request_upload_slot(
        &self,
        content_type: &str,
        bearer: &str,
    ) -> Result<UploadSlot, PipelineError>;

    /// PUT the raw bytes to the presigned URL. No auth, no body parsing;
    /// failure here is transport-level only.
    async fn upload_bytes(
        &self,
        upload_url: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<(), PipelineError>;

    /// Register the uploaded object with the pipeline. Returns the image id.
    async fn register_image(&self, public_url: &str, bearer: &str)
        -> Result<String, PipelineError>;

    /// Generate captions for a registered image.
    async fn generate_captions(
        &self,
        image_id: &str,
        bearer: &str,
    ) -> Result<Vec<CaptionRecord>, PipelineError>;
}

/// reqwest-backed client for the pipeline API.
#[derive(Clone, Debug)]
pub struct PipelineClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct PresignedPayload {
    #[serde(rename = "presignedUrl")]
    presigned_url: Option<String>,
    #[serde(rename = "cdnUrl")]
    cdn_url: Option<String>,
}

#[derive(Deserialize)]
struct RegisterPayload {
    #[serde(rename = "imageId")]
    image_id: Option<String>,
}

/// Read the failure status and compose the user-facing message: server
/// `message` field when the body is JSON, else "(HTTP <code>)" form.
async fn api_error(response: reqwest::Response, fallback: &str) -> (u16, String) {
    let status = response.status().as_u16();
    let server_message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|payload| {
            payload
                .get("message")
                .and_then(Value::as_str)
                .map(|m| m.to_string())
        });
    let message = match server_message {
        Some(m) => format!("{}: {}", fallback, m),
        None => format!("{} (HTTP {})", fallback, status),
    };
    (status, message)
}

/// Normalize the generate-captions payload: a bare array or an object with
/// a `captions` array; anything else is an empty list, not an error.
fn caption_rows(payload: Value) -> Vec<CaptionRecord> {
    let rows = match payload {
        Value::Array(rows) => rows,
        Value::Object(mut map) => match map.remove("captions") {
            Some(Value::Array(rows)) => rows,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    rows.into_iter().map(CaptionRecord::from_value).collect()
}

impl PipelineClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.api_base_url,
            Duration::from_secs(config.http_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder, bearer: &str) -> reqwest::RequestBuilder {
        request.header("Authorization", format!("Bearer {}", bearer))
    }
}

#[async_trait]
impl PipelineApi for PipelineClient {
    async fn request_upload_slot(
        &self,
        content_type: &str,
        bearer: &str,
    ) -> Result<UploadSlot, PipelineError> {
        const FALLBACK: &str = "Failed to generate presigned upload URL";

        let request = self
            .client
            .post(self.build_url("/pipeline/generate-presigned-url"))
            .json(&json!({ "contentType": content_type }));
        let response =
            self.authorize(request, bearer)
                .send()
                .await
                .map_err(|e| PipelineError::Presign {
                    status: None,
                    message: format!("{}: {}", FALLBACK, e),
                })?;

        if !response.status().is_success() {
            let (status, message) = api_error(response, FALLBACK).await;
            return Err(PipelineError::Presign {
                status: Some(status),
                message,
            });
        }

        let payload: PresignedPayload =
            response.json().await.map_err(|e| PipelineError::Presign {
                status: None,
                message: format!("{}: {}", FALLBACK, e),
            })?;

        match (payload.presigned_url, payload.cdn_url) {
            (Some(upload_url), Some(public_url)) => {
                tracing::debug!(content_type, "Presigned upload URL issued");
                Ok(UploadSlot {
                    upload_url,
                    public_url,
                })
            }
            _ => Err(PipelineError::Presign {
                status: None,
                message: "Presigned URL response is missing required fields.".to_string(),
            }),
        }
    }

    async fn upload_bytes(
        &self,
        upload_url: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<(), PipelineError> {
        let response = self
            .client
            .put(upload_url)
            .header("Content-Type", content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| PipelineError::Upload {
                status: None,
                message: format!("Image upload failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Upload {
                status: Some(status.as_u16()),
                message: format!("Image upload failed (HTTP {}).", status.as_u16()),
            });
        }

        tracing::debug!(content_type, "Image bytes uploaded");
        Ok(())
    }

    async fn register_image(
        &self,
        public_url: &str,
        bearer: &str,
    ) -> Result<String, PipelineError> {
        const FALLBACK: &str = "Failed to register uploaded image";

        let request = self
            .client
            .post(self.build_url("/pipeline/upload-image-from-url"))
            .json(&json!({ "imageUrl": public_url, "isCommonUse": false }));
        let response =
            self.authorize(request, bearer)
                .send()
                .await
                .map_err(|e| PipelineError::Register {
                    status: None,
                    message: format!("{}: {}", FALLBACK, e),
                    retryable: false,
                })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let retryable = PipelineError::retryable_status(status);
            let (status, message) = api_error(response, FALLBACK).await;
            return Err(PipelineError::Register {
                status: Some(status),
                message,
                retryable,
            });
        }

        let payload: RegisterPayload =
            response.json().await.map_err(|e| PipelineError::Register {
                status: None,
                message: format!("{}: {}", FALLBACK, e),
                retryable: false,
            })?;

        payload
            .image_id
            .ok_or_else(|| PipelineError::Register {
                status: None,
                message: "Image registration response is missing imageId.".to_string(),
                retryable: false,
            })
            .inspect(|image_id| tracing::debug!(image_id = %image_id, "Image registered with pipeline"))
    }

    async fn generate_captions(
        &self,
        image_id: &str,
        bearer: &str,
    ) -> Result<Vec<CaptionRecord>, PipelineError> {
        const FALLBACK: &str = "Failed to generate captions";

        let request = self
            .client
            .post(self.build_url("/pipeline/generate-captions"))
            .json(&json!({ "imageId": image_id }));
        let response =
            self.authorize(request, bearer)
                .send()
                .await
                .map_err(|e| PipelineError::Generate {
                    status: None,
                    message: format!("{}: {}", FALLBACK, e),
                })?;

        if !response.status().is_success() {
            let (status, message) = api_error(response, FALLBACK).await;
            return Err(PipelineError::Generate {
                status: Some(status),
                message,
            });
        }

        let payload: Value = response.json().await.map_err(|e| PipelineError::Generate {
            status: None,
            message: format!("{}: {}", FALLBACK, e),
        })?;

        let rows = caption_rows(payload);
        tracing::debug!(image_id, count = rows.len(), "Captions generated");
        Ok(rows)
    }
}
