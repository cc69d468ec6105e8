use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the flipbook engine.
///
/// Runtime degradations (missing page images, no audio device, unknown mode
/// names) are not errors; they are logged and the engine carries on.
#[derive(Debug, Error)]
pub enum FlipbookError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode page {page}: {source}")]
    Decode {
        page: u32,
        #[source]
        source: image::ImageError,
    },

    #[error("decode task for page {page} failed: {source}")]
    DecodeTask {
        page: u32,
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("page {0} not found")]
    MissingPage(u32),

    #[error("invalid configuration in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("audio output unavailable: {0}")]
    Audio(String),
}

pub type Result<T> = std::result::Result<T, FlipbookError>;
