use thiserror::Error;

/// Library error type for the filter pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The source image could not be decoded.
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// The rendered bitmap could not be encoded.
    #[error("failed to encode image as {format}: {source}")]
    Encode {
        format: &'static str,
        #[source]
        source: image::ImageError,
    },

    /// A raw pixel buffer does not match its declared dimensions.
    #[error("invalid pixel buffer: {0}")]
    InvalidBuffer(String),

    /// The canvas exceeds the supported pixel count.
    #[error("image of {width}x{height} exceeds the {max}x{max} canvas limit")]
    ImageTooLarge { width: usize, height: usize, max: usize },

    /// A parameter file could not be parsed.
    #[error("invalid filter parameters: {0}")]
    Parameters(String),

    /// Export format name not recognised.
    #[error("unknown export format: {0}")]
    UnknownFormat(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Parameters(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parameters(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
