//! This example checks the status of an existing request once.
//!
//! To run this example, you must have the `VISION_API_KEY` environment variable set.
//!
//! Usage:
//! `cargo run --example get_status <REQUEST_ID>`

use std::env;
use vision3d::VisionClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = VisionClient::from_env()?;

    let request_id = env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("Please provide a request ID as a command-line argument."))?;

    let status = client.get_status(&request_id).await?;
    println!("Status: {}, progress: {}%", status.status, status.progress);
    if status.is_failed() {
        println!("Error: {}", status.error_message());
    }

    Ok(())
}
