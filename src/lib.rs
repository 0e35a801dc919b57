//! A Rust client for the Vision image-to-3D conversion API.
//!
//! The service turns one or more photos of an object into a 3D model. Conversion runs
//! asynchronously on the server, so a typical session has three steps:
//!
//! 1. Submit images with [`VisionClient::submit_single`] or
//!    [`VisionClient::submit_multi`] and keep the returned request id.
//! 2. Poll with [`VisionClient::get_status`], or block in
//!    [`VisionClient::wait_for_completion`] until the job completes or fails.
//! 3. Fetch the model with [`VisionClient::download`] in one of the
//!    [`DownloadFormat`]s.
//!
//! No operation retries by itself. Every failure surfaces as a [`VisionError`].

pub mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod poll;
pub mod submit;
pub mod types;

pub use client::VisionClient;
pub use config::ClientConfig;
pub use download::resolve_output_path;
pub use error::VisionError;
pub use types::{
    DownloadFormat, JobState, JobStatus, MultiViewImages, ProcessingOptions, SubmitResponse,
    Viewpoint,
};
