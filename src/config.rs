use crate::error::VisionError;
use std::env;
use std::time::Duration;

/// Base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://193.107.103.44:39152";

/// Interval between status queries while waiting for a job.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Connection settings for a [`VisionClient`](crate::VisionClient).
///
/// Built once and handed to the client at construction; nothing in the crate reads
/// configuration from anywhere else.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub poll_interval: Duration,
    /// Upper bound on how long `wait_for_completion` may block. `None` waits forever.
    pub max_wait: Option<Duration>,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_API_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_wait: None,
        }
    }

    /// Reads the configuration from the environment.
    ///
    /// A `.env` file in the working directory is loaded first if one exists. The
    /// following variables are recognised:
    ///
    /// * `VISION_API_KEY` (required)
    /// * `VISION_BASE_URL`
    /// * `VISION_POLL_INTERVAL_SECS`
    /// * `VISION_MAX_WAIT_SECS`
    ///
    /// # Errors
    ///
    /// - `VisionError::MissingApiKey` if `VISION_API_KEY` is not set.
    /// - `VisionError::InvalidConfig` if one of the numeric variables does not parse.
    pub fn from_env() -> Result<Self, VisionError> {
        dotenvy::dotenv().ok();

        let api_key = env::var("VISION_API_KEY").map_err(|_| VisionError::MissingApiKey)?;
        let mut config = Self::new(api_key);

        if let Ok(base_url) = env::var("VISION_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(secs) = secs_from_env("VISION_POLL_INTERVAL_SECS")? {
            config.poll_interval = Duration::from_secs(secs);
        }
        config.max_wait = secs_from_env("VISION_MAX_WAIT_SECS")?.map(Duration::from_secs);

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Option<Duration>) -> Self {
        self.max_wait = max_wait;
        self
    }
}

fn secs_from_env(name: &str) -> Result<Option<u64>, VisionError> {
    match env::var(name) {
        Ok(raw) => parse_secs(name, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_secs(name: &str, raw: &str) -> Result<u64, VisionError> {
    raw.trim().parse().map_err(|_| {
        VisionError::InvalidConfig(format!(
            "{name} must be a whole number of seconds, got `{raw}`"
        ))
    })
}
