//! HTTP access to the catalog and recognition endpoints.

use std::future::Future;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::models::{AreaRef, ModelRef, RecognitionResult};
use crate::request::RecognitionRequest;

pub const AREAS_PATH: &str = "area";
pub const SEGMENTATION_MODELS_PATH: &str = "fingerprint-segmentation-model";
pub const RECOGNITION_MODELS_PATH: &str = "fingerprint-recognition-model";
pub const RECOGNIZE_PATH: &str = "fingerprint-recognition/recognize";

/// Remote side of a recognition session.
pub trait RecognitionService: Send + Sync {
    fn areas(&self) -> impl Future<Output = Result<Vec<AreaRef>, TransportError>> + Send;
    fn segmentation_models(
        &self,
    ) -> impl Future<Output = Result<Vec<ModelRef>, TransportError>> + Send;
    fn recognition_models(
        &self,
    ) -> impl Future<Output = Result<Vec<ModelRef>, TransportError>> + Send;
    fn recognize(
        &self,
        request: RecognitionRequest,
    ) -> impl Future<Output = Result<RecognitionResult, TransportError>> + Send;
}

/// Client for the access-control REST API.
///
/// No retries and no timeout: a failure goes straight back to the caller.
#[derive(Debug, Clone)]
pub struct RecognitionClient {
    config: ClientConfig,
    client: reqwest::Client,
}

impl RecognitionClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        let url = self.config.endpoint(path);
        debug!(%url, "fetching catalog");
        let response = self.client.get(&url).send().await?;
        decode_response(response).await
    }
}

/// Reject non-2xx responses even when they carry JSON, then decode the body.
async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, TransportError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .or_else(|| v.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or(body);
        warn!(status = status.as_u16(), %message, "request rejected");
        return Err(TransportError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| TransportError::Decode(e.to_string()))
}

impl RecognitionService for RecognitionClient {
    async fn areas(&self) -> Result<Vec<AreaRef>, TransportError> {
        self.get_json(AREAS_PATH).await
    }

    async fn segmentation_models(&self) -> Result<Vec<ModelRef>, TransportError> {
        self.get_json(SEGMENTATION_MODELS_PATH).await
    }

    async fn recognition_models(&self) -> Result<Vec<ModelRef>, TransportError> {
        self.get_json(RECOGNITION_MODELS_PATH).await
    }

    async fn recognize(
        &self,
        request: RecognitionRequest,
    ) -> Result<RecognitionResult, TransportError> {
        let url = self.config.endpoint(RECOGNIZE_PATH);
        let file_name = request.file.name.clone();
        let field_count = request.fields.len();
        let form = request.into_form()?;

        info!(%url, %file_name, field_count, "submitting fingerprint");
        let response = self.client.post(&url).multipart(form).send().await?;
        let result: RecognitionResult = decode_response(response).await?;
        debug!(
            matched = result.matched,
            confidence = result.confidence,
            "recognition response decoded"
        );
        Ok(result)
    }
}
