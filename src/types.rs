use crate::error::VisionError;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Processing options applied to a submission.
///
/// Both flags are sent as `"true"`/`"false"` query parameters alongside the upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingOptions {
    /// Remesh the result into quad topology.
    pub quads_remesh: bool,
    /// Bake a texture onto the result.
    pub textured: bool,
}

impl ProcessingOptions {
    pub fn new(quads_remesh: bool, textured: bool) -> Self {
        Self {
            quads_remesh,
            textured,
        }
    }

    pub(crate) fn query_params(&self) -> [(&'static str, &'static str); 2] {
        fn flag(value: bool) -> &'static str {
            if value {
                "true"
            } else {
                "false"
            }
        }
        [
            ("quads_remesh", flag(self.quads_remesh)),
            ("textured", flag(self.textured)),
        ]
    }
}

/// The side of the subject an image in a multi-view submission shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewpoint {
    Front,
    Back,
    Left,
    Right,
}

impl Viewpoint {
    pub const ALL: [Viewpoint; 4] = [
        Viewpoint::Front,
        Viewpoint::Back,
        Viewpoint::Left,
        Viewpoint::Right,
    ];

    /// The multipart field name the service expects for this viewpoint.
    pub fn field_name(&self) -> &'static str {
        match self {
            Viewpoint::Front => "front",
            Viewpoint::Back => "back",
            Viewpoint::Left => "left",
            Viewpoint::Right => "right",
        }
    }
}

impl fmt::Display for Viewpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Up to four images of the same subject, one per [`Viewpoint`].
#[derive(Debug, Clone, Default)]
pub struct MultiViewImages {
    pub front: Option<PathBuf>,
    pub back: Option<PathBuf>,
    pub left: Option<PathBuf>,
    pub right: Option<PathBuf>,
}

impl MultiViewImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, viewpoint: Viewpoint, path: impl Into<PathBuf>) -> Self {
        let path = Some(path.into());
        match viewpoint {
            Viewpoint::Front => self.front = path,
            Viewpoint::Back => self.back = path,
            Viewpoint::Left => self.left = path,
            Viewpoint::Right => self.right = path,
        }
        self
    }

    pub fn get(&self, viewpoint: Viewpoint) -> Option<&Path> {
        match viewpoint {
            Viewpoint::Front => self.front.as_deref(),
            Viewpoint::Back => self.back.as_deref(),
            Viewpoint::Left => self.left.as_deref(),
            Viewpoint::Right => self.right.as_deref(),
        }
    }

    /// The provided paths in viewpoint order, whether or not they exist.
    pub fn provided(&self) -> impl Iterator<Item = (Viewpoint, &Path)> + '_ {
        Viewpoint::ALL
            .into_iter()
            .filter_map(move |viewpoint| self.get(viewpoint).map(|path| (viewpoint, path)))
    }
}

/// The response from a successful submission.
#[derive(Deserialize, Debug, Clone)]
pub struct SubmitResponse {
    /// The opaque identifier of the newly created job.
    pub request_id: String,
}

/// Server-reported state of a job.
///
/// Only `completed` and `error` carry meaning for the client; every other value is
/// kept verbatim and treated as "still working".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum JobState {
    Completed,
    Error,
    InProgress(String),
}

impl JobState {
    /// Terminal states are final: once observed, the job will not change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Error)
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobState::Completed => "completed",
            JobState::Error => "error",
            JobState::InProgress(other) => other,
        }
    }
}

impl From<String> for JobState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "completed" => JobState::Completed,
            "error" => JobState::Error,
            _ => JobState::InProgress(value),
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A snapshot of a job as returned by the status endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatus {
    pub status: JobState,
    /// Completion percentage, 0 to 100. Absent or `null` reads as 0.
    #[serde(default, deserialize_with = "progress_or_zero")]
    pub progress: u8,
    #[serde(default)]
    pub error: Option<String>,
}

fn progress_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    Ok(Option::<u8>::deserialize(deserializer)?.unwrap_or(0))
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_completed(&self) -> bool {
        self.status == JobState::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.status == JobState::Error
    }

    /// The server's error message, or a placeholder when a failed job has none.
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or("unknown error")
    }
}

/// Output formats the download endpoint can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadFormat {
    #[default]
    Original,
    Fbx,
    Glb,
    Stl,
}

impl DownloadFormat {
    pub const ALL: [DownloadFormat; 4] = [
        DownloadFormat::Original,
        DownloadFormat::Fbx,
        DownloadFormat::Glb,
        DownloadFormat::Stl,
    ];

    /// The value of the `format` query parameter, also used as the file extension.
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadFormat::Original => "original",
            DownloadFormat::Fbx => "fbx",
            DownloadFormat::Glb => "glb",
            DownloadFormat::Stl => "stl",
        }
    }
}

impl FromStr for DownloadFormat {
    type Err = VisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DownloadFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| VisionError::UnsupportedFormat(s.to_string()))
    }
}

impl fmt::Display for DownloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
