//! This example demonstrates the full single-image workflow:
//! 1. Submitting an image from the command line.
//! 2. Polling the request until it finishes.
//! 3. Downloading the resulting GLB model into the working directory if it completed.
//!
//! To run this example, you must have the `VISION_API_KEY` environment variable set.
//!
//! Usage:
//! `cargo run --example wait_and_download <IMAGE_PATH>`

use std::env;
use vision3d::{DownloadFormat, ProcessingOptions, VisionClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Reads VISION_API_KEY and friends, loading a .env file if present.
    let client = VisionClient::from_env()?;

    let image = env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("Please provide an image path as a command-line argument."))?;

    let request_id = client
        .submit_single(&image, ProcessingOptions::new(true, true))
        .await?;
    println!("Submitted `{}` as request `{}`", image, request_id);

    let final_status = client
        .wait_for_completion(&request_id, |status| {
            println!("  {} ({}%)", status.status, status.progress);
        })
        .await?;

    if !final_status.is_completed() {
        println!(
            "\nRequest finished with an error: {}",
            final_status.error_message()
        );
        return Ok(());
    }

    let path = client
        .download_artifact(&request_id, DownloadFormat::Glb, None)
        .await?;
    println!("\nModel downloaded to {}", path.display());

    Ok(())
}
