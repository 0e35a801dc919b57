//! Job submission: uploading images to start a conversion.

use crate::client::{decode_json, ensure_success, VisionClient};
use crate::error::VisionError;
use crate::types::{MultiViewImages, ProcessingOptions, SubmitResponse};
use reqwest::multipart::{Form, Part};
use std::path::Path;
use tokio::fs::{self, File};
use tokio_util::codec::{BytesCodec, FramedRead};

/// Multipart field carrying the image of a single-image submission.
const SINGLE_IMAGE_FIELD: &str = "image";

impl VisionClient {
    /// Uploads one image and starts a conversion job.
    ///
    /// # Arguments
    ///
    /// * `image_path` - Path to a local image file.
    /// * `options` - Remeshing and texturing flags for the job.
    ///
    /// # Returns
    ///
    /// The `request_id` of the newly created job.
    ///
    /// # Errors
    ///
    /// - `VisionError::InputNotFound` if `image_path` is not an existing file. No
    ///   request is sent in that case.
    /// - `VisionError::RemoteRejected` if the service answers with a non-success status.
    /// - `VisionError::Transport` on connection failures.
    pub async fn submit_single<P: AsRef<Path>>(
        &self,
        image_path: P,
        options: ProcessingOptions,
    ) -> Result<String, VisionError> {
        let image_path = image_path.as_ref();
        if !is_existing_file(image_path).await {
            return Err(VisionError::InputNotFound {
                path: image_path.to_path_buf(),
            });
        }

        tracing::info!(image = %image_path.display(), ?options, "submitting image");
        let form = Form::new().part(SINGLE_IMAGE_FIELD, file_part(image_path).await?);
        self.submit(&["single"], form, options, "Single-image submission")
            .await
    }

    /// Uploads up to four images of the same subject, one per viewpoint, and starts a
    /// conversion job.
    ///
    /// Only the provided paths that exist on disk are attached, each under its
    /// viewpoint's field name. Paths that do not exist are skipped as long as at least
    /// one other image remains.
    ///
    /// # Errors
    ///
    /// - `VisionError::NoValidInputs` if no provided path exists. No request is sent.
    /// - `VisionError::RemoteRejected` / `VisionError::Transport` as for
    ///   [`submit_single`](Self::submit_single).
    pub async fn submit_multi(
        &self,
        images: &MultiViewImages,
        options: ProcessingOptions,
    ) -> Result<String, VisionError> {
        let mut form = Form::new();
        let mut attached = Vec::new();

        for (viewpoint, path) in images.provided() {
            if !is_existing_file(path).await {
                tracing::debug!(%viewpoint, path = %path.display(), "skipping missing image");
                continue;
            }
            form = form.part(viewpoint.field_name(), file_part(path).await?);
            attached.push(viewpoint.field_name());
        }

        if attached.is_empty() {
            return Err(VisionError::NoValidInputs);
        }

        tracing::info!(views = ?attached, ?options, "submitting multi-view images");
        self.submit(&["multi"], form, options, "Multi-image submission")
            .await
    }

    async fn submit(
        &self,
        endpoint: &[&str],
        form: Form,
        options: ProcessingOptions,
        operation: &str,
    ) -> Result<String, VisionError> {
        let url = self.models_url(endpoint);
        let response = self
            .client
            .post(url)
            .query(&options.query_params())
            .multipart(form)
            .send()
            .await?;

        let response = ensure_success(response, || operation.to_string()).await?;
        let submitted: SubmitResponse =
            decode_json(response, || operation.to_string()).await?;
        tracing::info!(request_id = %submitted.request_id, "job submitted");
        Ok(submitted.request_id)
    }
}

async fn is_existing_file(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// Streams a file into a multipart part. The file handle lives inside the part's body
/// and is closed when the request is dropped, whatever its outcome.
async fn file_part(path: &Path) -> Result<Part, VisionError> {
    let file = File::open(path).await?;
    let length = file.metadata().await?.len();
    let body = reqwest::Body::wrap_stream(FramedRead::new(file, BytesCodec::new()));

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| SINGLE_IMAGE_FIELD.to_string());
    let mime_type = mime_guess::from_path(path).first_or_octet_stream();

    Ok(Part::stream_with_length(body, length)
        .file_name(file_name)
        .mime_str(mime_type.as_ref())?)
}
