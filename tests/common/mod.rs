#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use vision3d::{ClientConfig, VisionClient};
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

pub const API_KEY: &str = "test_api_key";
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(API_KEY)
        .with_base_url(server.uri())
        .with_poll_interval(POLL_INTERVAL)
}

pub fn client_for(server: &MockServer) -> VisionClient {
    VisionClient::new(config_for(server)).unwrap()
}

/// Writes a small fake image and returns its path.
pub fn write_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"\x89PNG fake image bytes").unwrap();
    path
}

/// Answers with each template in turn, repeating the last one once exhausted.
pub struct SequenceResponder {
    responses: Vec<ResponseTemplate>,
    calls: AtomicUsize,
}

impl SequenceResponder {
    pub fn new(responses: Vec<ResponseTemplate>) -> Self {
        Self {
            responses,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Respond for SequenceResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let index = call.min(self.responses.len() - 1);
        self.responses[index].clone()
    }
}
