use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure is terminal to the single action that produced it. State is
/// left as it was before the action started.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to load image {path:?}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("no image loaded")]
    NoImage,
    #[error("OCR engine `{engine}` failed: {message}")]
    Ocr { engine: String, message: String },
    #[error("failed to write transcript to {path:?}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write frame to {path:?}: {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{0}")]
    Command(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}
