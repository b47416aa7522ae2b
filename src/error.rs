use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid surface size {width}x{height}")]
    InvalidSurface { width: u32, height: u32 },

    #[error("Face detector error: {0}")]
    Detector(String),
}

pub type Result<T> = std::result::Result<T, Error>;
