use tadabbur_types::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("cannot connect to API server: {0}")]
    Unreachable(String),

    #[error("request timed out after {0} ms")]
    Timeout(u64),

    #[error("API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response body: {0}")]
    MalformedBody(String),

    #[error("invalid request payload: {0}")]
    InvalidPayload(String),

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
}

impl ProcessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProcessError::Unreachable(_) | ProcessError::Network(_) => {
                ErrorKind::NetworkUnreachable
            }
            ProcessError::Timeout(_) => ErrorKind::RequestTimeout,
            ProcessError::Status { .. } => ErrorKind::HttpStatus,
            ProcessError::MalformedBody(_) => ErrorKind::BadResponseShape,
            ProcessError::InvalidPayload(_) => ErrorKind::DecodeFailure,
        }
    }
}
