use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid scale factor: {0}")]
    InvalidScale(f32),

    #[error("Image has no pixels")]
    EmptyImage,
}
