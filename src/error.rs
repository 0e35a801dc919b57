use std::path::PathBuf;
use std::time::Duration;

/// Represents the possible errors that can occur when talking to the Vision API.
///
/// Every variant is terminal for the operation that produced it. Nothing in this
/// crate retries on its own; see [`VisionError::is_retryable`] for a hint on whether
/// re-running the operation by hand is worth it.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("API key is missing. Please provide it or set the VISION_API_KEY environment variable.")]
    MissingApiKey,
    #[error("API key is not a valid header value: {0}")]
    InvalidApiKey(#[from] reqwest::header::InvalidHeaderValue),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// A local image path given for submission does not exist.
    #[error("Image file not found: {}", path.display())]
    InputNotFound { path: PathBuf },
    /// None of the viewpoint images of a multi-view submission exist on disk.
    #[error("No valid input images: at least one viewpoint image must exist")]
    NoValidInputs,
    #[error("Unsupported download format `{0}` (expected one of: original, fbx, glb, stl)")]
    UnsupportedFormat(String),
    /// The service answered with a non-success HTTP status.
    #[error("{operation} rejected by server: {status} - {body}")]
    RemoteRejected {
        operation: String,
        status: u16,
        body: String,
    },
    /// A success response whose body does not match the expected shape.
    #[error("{operation} returned an unreadable response: {source}")]
    ResponseParseFailed {
        operation: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Network request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("File I/O error: {0}")]
    LocalIo(#[from] std::io::Error),
    #[error("URL parsing failed: {0}")]
    UrlParseFailed(#[from] url::ParseError),
    #[error("Job {request_id} did not finish within {waited:?}")]
    Timeout { request_id: String, waited: Duration },
}

impl VisionError {
    /// Whether invoking the same operation again could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            VisionError::Transport(_) | VisionError::Timeout { .. } => true,
            VisionError::RemoteRejected { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
