use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tadabbur_types::{ImageDataUri, Language};

use crate::error::ProcessError;
use crate::response::ProcessedResult;
use crate::ProcessingApi;

const IMAGE_FIELD: &str = "file";
const IMAGE_FILE_NAME: &str = "cropped-image.jpg";

#[derive(Serialize)]
struct TextRequest<'a> {
    text: &'a str,
    language: Language,
}

/// Client for the `/process-image/` and `/process-text/` endpoints
#[derive(Clone)]
pub struct HttpProcessingClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpProcessingClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProcessError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProcessError::Network)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/", self.base_url, path)
    }

    fn classify(&self, err: reqwest::Error) -> ProcessError {
        if err.is_timeout() {
            ProcessError::Timeout(self.timeout.as_millis() as u64)
        } else if err.is_connect() {
            ProcessError::Unreachable(err.to_string())
        } else {
            ProcessError::Network(err)
        }
    }

    async fn read_result(&self, response: reqwest::Response) -> Result<ProcessedResult, ProcessError> {
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            let message = error_message(&body)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "Network response was not ok".to_string());
            return Err(ProcessError::Status {
                status: status.as_u16(),
                message,
            });
        }

        ProcessedResult::from_body(&body)
    }
}

/// `message` (or FastAPI's `detail`) from a JSON error body
fn error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["message", "detail"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

#[async_trait::async_trait]
impl ProcessingApi for HttpProcessingClient {
    async fn submit_image(&self, image: &ImageDataUri) -> Result<ProcessedResult, ProcessError> {
        let bytes = image
            .decode()
            .map_err(|e| ProcessError::InvalidPayload(e.to_string()))?;
        let mime = image.mime_type().unwrap_or(tadabbur_types::image::JPEG_MIME);

        let part = Part::bytes(bytes)
            .file_name(IMAGE_FILE_NAME)
            .mime_str(mime)
            .map_err(|e| ProcessError::InvalidPayload(e.to_string()))?;
        let form = Form::new().part(IMAGE_FIELD, part);

        let url = self.endpoint("process-image");
        tracing::info!("Sending cropped image to {}", url);

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let result = self.read_result(response).await?;
        tracing::debug!("Image processed: {} chars of text", result.text.len());
        Ok(result)
    }

    async fn submit_text(
        &self,
        text: &str,
        language: Language,
    ) -> Result<ProcessedResult, ProcessError> {
        let url = self.endpoint("process-text");
        tracing::info!("Sending {} chars of text to {} ({})", text.len(), url, language);

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(&TextRequest { text, language })
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        self.read_result(response).await
    }
}
