//! Vision image-to-3D command-line client

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vision3d::config::{DEFAULT_API_URL, DEFAULT_POLL_INTERVAL};
use vision3d::{ClientConfig, JobStatus, MultiViewImages, ProcessingOptions, VisionClient};

const FORMATS: [&str; 4] = ["original", "fbx", "glb", "stl"];

#[derive(Parser)]
#[command(name = "vision3d")]
#[command(about = "Client for the Vision image-to-3D model conversion API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API key sent with every request
    #[arg(long, env = "VISION_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Base URL of the service
    #[arg(long, env = "VISION_BASE_URL", default_value = DEFAULT_API_URL, global = true)]
    base_url: String,

    /// Seconds between status checks while waiting
    #[arg(
        long,
        env = "VISION_POLL_INTERVAL_SECS",
        default_value_t = DEFAULT_POLL_INTERVAL.as_secs(),
        global = true
    )]
    poll_interval: u64,

    /// Give up waiting after this many seconds (waits forever if unset)
    #[arg(long, env = "VISION_MAX_WAIT_SECS", global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single image
    Single {
        /// Path to the image
        image: PathBuf,

        #[command(flatten)]
        options: OptionArgs,

        #[command(flatten)]
        follow: FollowArgs,
    },

    /// Convert several views of the same object
    Multi {
        /// Front view image
        #[arg(long)]
        front: Option<PathBuf>,

        /// Back view image
        #[arg(long)]
        back: Option<PathBuf>,

        /// Left view image
        #[arg(long)]
        left: Option<PathBuf>,

        /// Right view image
        #[arg(long)]
        right: Option<PathBuf>,

        #[command(flatten)]
        options: OptionArgs,

        #[command(flatten)]
        follow: FollowArgs,
    },

    /// Check the status of a request
    Status {
        /// Request ID
        request_id: String,

        #[command(flatten)]
        follow: FollowArgs,
    },

    /// Download the result of a request
    Download {
        /// Request ID
        request_id: String,

        /// Format to download
        #[arg(long, default_value = "original", value_parser = FORMATS)]
        format: String,

        /// Output path including file name
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct OptionArgs {
    /// Apply quad remeshing
    #[arg(long)]
    remesh: bool,

    /// Apply texturing
    #[arg(long)]
    texture: bool,
}

impl From<&OptionArgs> for ProcessingOptions {
    fn from(args: &OptionArgs) -> Self {
        ProcessingOptions::new(args.remesh, args.texture)
    }
}

#[derive(Args)]
struct FollowArgs {
    /// Wait for processing to finish
    #[arg(long)]
    wait: bool,

    /// Download the result in this format once finished
    #[arg(long, requires = "wait", value_parser = FORMATS)]
    download: Option<String>,

    /// Output path including file name
    #[arg(long, requires = "download")]
    output: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vision3d=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let client = build_client(&cli)?;

    match &cli.command {
        Commands::Single {
            image,
            options,
            follow,
        } => {
            println!("Submitting {} for processing...", image.display());
            let request_id = client.submit_single(image, options.into()).await?;
            println!("Request submitted. Request ID: {request_id}");
            follow_up(&client, &request_id, follow).await
        }
        Commands::Multi {
            front,
            back,
            left,
            right,
            options,
            follow,
        } => {
            let images = MultiViewImages {
                front: front.clone(),
                back: back.clone(),
                left: left.clone(),
                right: right.clone(),
            };
            println!("Submitting images for processing...");
            let request_id = client.submit_multi(&images, options.into()).await?;
            println!("Request submitted. Request ID: {request_id}");
            follow_up(&client, &request_id, follow).await
        }
        Commands::Status { request_id, follow } => {
            if follow.wait {
                follow_up(&client, request_id, follow).await
            } else {
                let status = client.get_status(request_id).await?;
                println!("Status: {}, Progress: {}%", status.status, status.progress);
                if status.is_failed() {
                    println!("Error: {}", status.error_message());
                }
                Ok(ExitCode::SUCCESS)
            }
        }
        Commands::Download {
            request_id,
            format,
            output,
        } => {
            download(&client, request_id, format, output.as_deref()).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_client(cli: &Cli) -> Result<VisionClient> {
    let api_key = cli
        .api_key
        .clone()
        .ok_or(vision3d::VisionError::MissingApiKey)?;
    let config = ClientConfig::new(api_key)
        .with_base_url(&cli.base_url)
        .with_poll_interval(Duration::from_secs(cli.poll_interval))
        .with_max_wait(cli.timeout.map(Duration::from_secs));
    Ok(VisionClient::new(config)?)
}

async fn follow_up(
    client: &VisionClient,
    request_id: &str,
    follow: &FollowArgs,
) -> Result<ExitCode> {
    if !follow.wait {
        return Ok(ExitCode::SUCCESS);
    }

    println!("Waiting for request {request_id} to finish...");
    let status = wait_with_progress(client, request_id).await?;
    if status.is_failed() {
        eprintln!("Processing failed: {}", status.error_message());
        return Ok(ExitCode::FAILURE);
    }

    println!("Processing finished successfully!");
    if let Some(format) = &follow.download {
        download(client, request_id, format, follow.output.as_deref()).await?;
    }
    Ok(ExitCode::SUCCESS)
}

async fn wait_with_progress(client: &VisionClient, request_id: &str) -> Result<JobStatus> {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}")?
            .progress_chars("#>-"),
    );
    pb.enable_steady_tick(Duration::from_millis(120));

    let result = client
        .wait_for_completion(request_id, |status| {
            pb.set_position(u64::from(status.progress.min(100)));
            pb.set_message(status.status.to_string());
        })
        .await;

    match &result {
        Ok(status) if status.is_completed() => pb.finish_with_message("completed"),
        Ok(status) => pb.abandon_with_message(format!("error: {}", status.error_message())),
        Err(_) => pb.abandon(),
    }
    Ok(result?)
}

async fn download(
    client: &VisionClient,
    request_id: &str,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    println!("Downloading result as {format}...");
    let path = client.download(request_id, format, output).await?;
    println!("Result saved to {}", path.display());
    Ok(())
}
