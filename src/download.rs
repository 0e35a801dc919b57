//! Retrieving finished models.

use crate::client::{ensure_success, VisionClient};
use crate::error::VisionError;
use crate::types::DownloadFormat;
use futures_util::StreamExt;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::CONTENT_DISPOSITION;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Prefix of the file name used when neither the caller nor the server names the file.
const DEFAULT_FILE_PREFIX: &str = "model_";

static FILENAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"filename="([^"]+)""#).unwrap());

impl VisionClient {
    /// Downloads the result of a job, validating `format` before anything is sent.
    ///
    /// This is the string-typed entry point for user input; see
    /// [`download_artifact`](Self::download_artifact) for the details.
    ///
    /// # Errors
    ///
    /// `VisionError::UnsupportedFormat` if `format` is not one of `original`, `fbx`,
    /// `glb` or `stl`, plus everything `download_artifact` can return.
    pub async fn download(
        &self,
        request_id: &str,
        format: &str,
        output: Option<&Path>,
    ) -> Result<PathBuf, VisionError> {
        let format: DownloadFormat = format.parse()?;
        self.download_artifact(request_id, format, output).await
    }

    /// Downloads the result of a job in the given format and saves it locally.
    ///
    /// The destination is chosen in this order:
    /// 1. `output`, with `.<format>` appended unless it already ends that way. Missing
    ///    parent directories are created.
    /// 2. The file name suggested by the server's `Content-Disposition` header.
    /// 3. `model_<request_id>.<format>` in the working directory.
    ///
    /// The body is streamed to a temporary file next to the destination and renamed
    /// into place once complete, so a failed download never leaves a truncated file.
    ///
    /// # Returns
    ///
    /// The path the model was written to.
    ///
    /// # Errors
    ///
    /// - `VisionError::RemoteRejected` with the server's error body on a non-success status.
    /// - `VisionError::Transport` if the connection fails, including mid-stream.
    /// - `VisionError::LocalIo` if the file cannot be written.
    pub async fn download_artifact(
        &self,
        request_id: &str,
        format: DownloadFormat,
        output: Option<&Path>,
    ) -> Result<PathBuf, VisionError> {
        let url = self.models_url(&[request_id, "download"]);
        tracing::info!(request_id, %format, "downloading result");

        let response = self
            .client
            .get(url)
            .query(&[("format", format.as_str())])
            .send()
            .await?;
        let response = ensure_success(response, || {
            format!("Download of job {request_id} as {format}")
        })
        .await?;

        let disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok());
        let path = resolve_output_path(request_id, format, output, disposition);

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if output.is_some() {
            fs::create_dir_all(&dir).await?;
        }

        let temp = tempfile::Builder::new()
            .prefix(".vision3d-")
            .suffix(".part")
            .tempfile_in(&dir)?;
        let (std_file, temp_path) = temp.into_parts();
        let mut file = fs::File::from_std(std_file);

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        drop(file);

        temp_path.persist(&path).map_err(|e| e.error)?;
        tracing::info!(request_id, path = %path.display(), bytes = written, "result saved");
        Ok(path)
    }
}

/// Picks the destination for a download. See [`VisionClient::download_artifact`].
pub fn resolve_output_path(
    request_id: &str,
    format: DownloadFormat,
    output: Option<&Path>,
    content_disposition: Option<&str>,
) -> PathBuf {
    let extension = format!(".{format}");

    if let Some(output) = output {
        if output.to_string_lossy().ends_with(&extension) {
            return output.to_path_buf();
        }
        let mut with_extension = OsString::from(output.as_os_str());
        with_extension.push(&extension);
        return PathBuf::from(with_extension);
    }

    content_disposition
        .and_then(filename_from_disposition)
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            PathBuf::from(format!("{DEFAULT_FILE_PREFIX}{request_id}{extension}"))
        })
}

/// Extracts `filename="..."` from a `Content-Disposition` value. Directory components
/// are dropped so the name always lands in the working directory.
fn filename_from_disposition(header: &str) -> Option<String> {
    let quoted = FILENAME_RE.captures(header)?.get(1)?.as_str();
    Path::new(quoted)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_output_gets_format_extension() {
        assert_eq!(
            resolve_output_path(
                "abc123",
                DownloadFormat::Glb,
                Some(Path::new("/tmp/model")),
                None
            ),
            PathBuf::from("/tmp/model.glb")
        );
        assert_eq!(
            resolve_output_path(
                "abc123",
                DownloadFormat::Glb,
                Some(Path::new("/tmp/model.glb")),
                None
            ),
            PathBuf::from("/tmp/model.glb")
        );
    }

    #[test]
    fn explicit_output_wins_over_server_hint() {
        assert_eq!(
            resolve_output_path(
                "abc123",
                DownloadFormat::Stl,
                Some(Path::new("out/part.glb")),
                Some(r#"attachment; filename="server.stl""#)
            ),
            PathBuf::from("out/part.glb.stl")
        );
    }

    #[test]
    fn server_hint_is_used_without_explicit_output() {
        assert_eq!(
            resolve_output_path(
                "abc123",
                DownloadFormat::Fbx,
                None,
                Some(r#"attachment; filename="chair.fbx""#)
            ),
            PathBuf::from("chair.fbx")
        );
    }

    #[test]
    fn falls_back_to_default_name() {
        assert_eq!(
            resolve_output_path("abc123", DownloadFormat::Stl, None, None),
            PathBuf::from("model_abc123.stl")
        );
        assert_eq!(
            resolve_output_path("abc123", DownloadFormat::Original, None, Some("attachment")),
            PathBuf::from("model_abc123.original")
        );
    }

    #[test]
    fn hint_cannot_escape_working_directory() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="../../etc/passwd""#),
            Some("passwd".to_string())
        );
        assert_eq!(filename_from_disposition(r#"attachment; filename="..""#), None);
        assert_eq!(filename_from_disposition("inline"), None);
        assert_eq!(filename_from_disposition(r#"attachment; filename="""#), None);
    }

    #[test]
    fn hint_stops_at_closing_quote() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="a.glb"; x="y""#),
            Some("a.glb".to_string())
        );
    }
}
