use std::fmt;
use std::path::PathBuf;

use crate::job::JobId;

/// A precondition that blocks an export.
///
/// The GUI lists every issue at once in the "Missing Fields" dialog, so
/// validation collects them instead of stopping at the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportIssue {
    MissingDirectory,
    NoSelection,
    NotEdited,
    MissingFormat,
    MissingFileName,
}

impl ExportIssue {
    pub fn message(&self) -> &'static str {
        match self {
            ExportIssue::MissingDirectory => "No export directory has been chosen.",
            ExportIssue::NoSelection => "No image is selected for export.",
            ExportIssue::NotEdited => "The selected image has not been edited yet.",
            ExportIssue::MissingFormat => "No image format has been chosen.",
            ExportIssue::MissingFileName => "No file name has been entered.",
        }
    }
}

impl fmt::Display for ExportIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("no image is selected")]
    NoActiveJob,

    #[error("image {0} is no longer loaded")]
    UnknownJob(JobId),

    #[error("{field} must be a finite number, got {value}")]
    InvalidValue { field: &'static str, value: f32 },

    #[error("cannot export: {}", join_issues(.0))]
    ExportPreconditions(Vec<ExportIssue>),

    #[error("failed to read or write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode or encode {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Processing(#[from] anyhow::Error),
}

impl EditorError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EditorError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        EditorError::Image {
            path: path.into(),
            source,
        }
    }

    /// Issues to show in the export dialog, if this is a validation failure.
    pub fn export_issues(&self) -> Option<&[ExportIssue]> {
        match self {
            EditorError::ExportPreconditions(issues) => Some(issues),
            _ => None,
        }
    }
}

fn join_issues(issues: &[ExportIssue]) -> String {
    issues
        .iter()
        .map(ExportIssue::message)
        .collect::<Vec<_>>()
        .join(" ")
}

pub type Result<T> = std::result::Result<T, EditorError>;
