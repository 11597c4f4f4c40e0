//! Error types for scene construction and rendering.

use thiserror::Error;

/// Errors that can occur while building a scene or rendering it.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Scene contains no objects")]
    EmptyScene,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Pixel ({x}, {y}) was written {count} times, expected exactly once")]
    Coverage { x: u32, y: u32, count: u32 },

    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),
}

pub type RenderResult<T> = Result<T, RenderError>;
