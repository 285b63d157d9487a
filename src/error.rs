use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// Main error type for the batch engine.

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Image error on {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Failed to serialize summary: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Image has no pixels: {0}")]
    EmptyImage(PathBuf),
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
    #[error("Task panicked: {0}")]
    TaskPanicked(String),
    #[error("The batch was cancelled.")]
    Cancelled,
    #[error("The batch did not finish within {0:?}")]
    TimedOut(Duration),
}

impl VisionError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        VisionError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        VisionError::Image {
            path: path.into(),
            source,
        }
    }
}

pub type VisionResult<T> = Result<T, VisionError>;
