use thiserror::Error;

#[derive(Error, Debug)]
pub enum RipenessError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image has zero area ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("No image loaded")]
    NoImageLoaded,

    #[error("Unsupported image extension: {0}")]
    UnsupportedExtension(String),

    #[error("Unsupported config format. Please use .toml or .json files")]
    UnsupportedConfigFormat,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed annotation line: {0}")]
    MalformedAnnotation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RipenessError>;
