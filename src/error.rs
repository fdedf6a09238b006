use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CropperError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Unsupported file type: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("TOML deserialization error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid color {0:?}, expected a hex value like #0000FF")]
    InvalidColor(String),
}
