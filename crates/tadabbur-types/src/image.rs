use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

pub const JPEG_MIME: &str = "image/jpeg";

/// An encoded image carried as a `data:` URI
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageDataUri(String);

#[derive(Debug, thiserror::Error)]
pub enum DataUriError {
    #[error("not a data URI")]
    MissingScheme,

    #[error("data URI is not base64 encoded")]
    NotBase64,

    #[error("invalid base64 payload: {0}")]
    Payload(#[from] base64::DecodeError),
}

impl ImageDataUri {
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self(format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes)))
    }

    pub fn from_jpeg(bytes: &[u8]) -> Self {
        Self::from_bytes(JPEG_MIME, bytes)
    }

    /// Wrap an existing string without checking it; decoding reports problems later
    pub fn from_raw(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Media type declared in the header, e.g. `image/jpeg`
    pub fn mime_type(&self) -> Option<&str> {
        let header = self.0.strip_prefix("data:")?.split(',').next()?;
        header.split(';').next().filter(|m| !m.is_empty())
    }

    pub fn decode(&self) -> Result<Vec<u8>, DataUriError> {
        let rest = self.0.strip_prefix("data:").ok_or(DataUriError::MissingScheme)?;
        let (header, payload) = rest.split_once(',').ok_or(DataUriError::MissingScheme)?;
        if !header.ends_with(";base64") {
            return Err(DataUriError::NotBase64);
        }
        Ok(STANDARD.decode(payload.trim())?)
    }
}

impl std::fmt::Debug for ImageDataUri {
    // Payloads run to megabytes; keep logs readable.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageDataUri")
            .field("mime_type", &self.mime_type())
            .field("len", &self.0.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jpeg_uri_header() {
        let uri = ImageDataUri::from_jpeg(&[0xff, 0xd8, 0xff]);
        assert!(uri.as_str().starts_with("data:image/jpeg;base64,"));
        assert_eq!(uri.mime_type(), Some("image/jpeg"));
        assert_eq!(uri.decode().unwrap(), vec![0xff, 0xd8, 0xff]);
    }

    #[test]
    fn test_decode_rejects_plain_strings() {
        let uri = ImageDataUri::from_raw("https://example.com/a.jpg");
        assert!(matches!(uri.decode(), Err(DataUriError::MissingScheme)));

        let uri = ImageDataUri::from_raw("data:text/plain,hello");
        assert!(matches!(uri.decode(), Err(DataUriError::NotBase64)));
    }

    #[test]
    fn test_decode_rejects_bad_payload() {
        let uri = ImageDataUri::from_raw("data:image/jpeg;base64,@@@");
        assert!(matches!(uri.decode(), Err(DataUriError::Payload(_))));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let uri = ImageDataUri::from_raw("data:image/jpeg;base64,AAAA");
        let json = serde_json::to_string(&uri).unwrap();
        assert_eq!(json, "\"data:image/jpeg;base64,AAAA\"");
    }
}
