mod error;
mod http;
mod response;

pub use error::ProcessError;
pub use http::HttpProcessingClient;
pub use response::{ExtractedContent, ProcessedResult};

use tadabbur_types::{ImageDataUri, Language};

/// Remote processing service interface
#[async_trait::async_trait]
pub trait ProcessingApi: Send + Sync {
    /// Extract the ayah from a captured image
    async fn submit_image(&self, image: &ImageDataUri) -> Result<ProcessedResult, ProcessError>;

    /// Translate and reflect on typed text
    async fn submit_text(
        &self,
        text: &str,
        language: Language,
    ) -> Result<ProcessedResult, ProcessError>;
}
