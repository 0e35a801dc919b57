use crate::config::ClientConfig;
use crate::error::VisionError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Header carrying the API key on every request (`Vision-API-KEY` on the wire).
pub const API_KEY_HEADER: &str = "vision-api-key";

/// The main client for interacting with the Vision API.
///
/// It holds the shared `reqwest::Client`, the base URL and the polling settings.
/// It is cheap to clone; clones share the underlying connection pool.
///
/// The operations live in their own modules: submission in [`submit`](crate::submit),
/// polling in [`poll`](crate::poll) and retrieval in [`download`](crate::download).
#[derive(Clone)]
pub struct VisionClient {
    pub(crate) client: reqwest::Client,
    base_url: Url,
    pub(crate) poll_interval: Duration,
    pub(crate) max_wait: Option<Duration>,
}

impl VisionClient {
    /// Creates a new `VisionClient` from an explicit configuration.
    ///
    /// # Errors
    ///
    /// - `VisionError::InvalidApiKey` if the key cannot be sent as a header value.
    /// - `VisionError::UrlParseFailed` if the base URL is invalid.
    /// - `VisionError::InvalidConfig` if the base URL cannot carry a path.
    /// - `VisionError::Transport` if the internal HTTP client fails to build.
    pub fn new(config: ClientConfig) -> Result<Self, VisionError> {
        let mut key = HeaderValue::from_str(&config.api_key)?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: parse_base_url(&config.base_url)?,
            poll_interval: config.poll_interval,
            max_wait: config.max_wait,
        })
    }

    /// Creates a new `VisionClient` with a custom base URL and default polling settings.
    ///
    /// This is useful for testing against a mock server.
    pub fn new_with_url(api_key: String, base_url: &str) -> Result<Self, VisionError> {
        Self::new(ClientConfig::new(api_key).with_base_url(base_url))
    }

    /// Creates a client from `VISION_*` environment variables. See [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self, VisionError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds `<base>/api/v1/models/<segments...>`, percent-encoding each segment.
    pub(crate) fn models_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["api", "v1", "models"])
                .extend(segments);
        }
        url
    }
}

fn parse_base_url(raw: &str) -> Result<Url, VisionError> {
    let url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(VisionError::InvalidConfig(format!(
            "base URL `{raw}` cannot carry a path"
        )));
    }
    Ok(url)
}

/// Passes a successful response through, or turns it into `RemoteRejected` with the
/// response body as detail.
pub(crate) async fn ensure_success(
    response: Response,
    operation: impl FnOnce() -> String,
) -> Result<Response, VisionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let operation = operation();
    tracing::warn!(%operation, status = status.as_u16(), %body, "request rejected");
    Err(VisionError::RemoteRejected {
        operation,
        status: status.as_u16(),
        body,
    })
}

/// Reads the whole body and decodes it as JSON. Shape mismatches become
/// `ResponseParseFailed` tagged with the operation.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    response: Response,
    operation: impl FnOnce() -> String,
) -> Result<T, VisionError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|source| {
        let operation = operation();
        tracing::warn!(%operation, error = %source, "unreadable response body");
        VisionError::ResponseParseFailed { operation, source }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_hang_off_the_base_path() {
        let client = VisionClient::new_with_url("key".into(), "http://localhost:8000").unwrap();
        assert_eq!(
            client.models_url(&["single"]).as_str(),
            "http://localhost:8000/api/v1/models/single"
        );

        let prefixed = VisionClient::new_with_url("key".into(), "http://host/proxy/").unwrap();
        assert_eq!(
            prefixed.models_url(&["abc123", "status"]).as_str(),
            "http://host/proxy/api/v1/models/abc123/status"
        );
    }

    #[test]
    fn job_ids_are_encoded_as_a_single_segment() {
        let client = VisionClient::new_with_url("key".into(), "http://localhost").unwrap();
        assert_eq!(
            client.models_url(&["a/b", "download"]).as_str(),
            "http://localhost/api/v1/models/a%2Fb/download"
        );
    }

    #[test]
    fn rejects_unusable_configuration() {
        assert!(matches!(
            VisionClient::new_with_url("key".into(), "not a url"),
            Err(VisionError::UrlParseFailed(_))
        ));
        assert!(matches!(
            VisionClient::new_with_url("key".into(), "mailto:ops@example.com"),
            Err(VisionError::InvalidConfig(_))
        ));
        assert!(matches!(
            VisionClient::new_with_url("bad\nkey".into(), "http://localhost"),
            Err(VisionError::InvalidApiKey(_))
        ));
    }
}
