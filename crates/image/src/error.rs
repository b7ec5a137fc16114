use {crate::fourcc_to_string, std::fmt};

#[derive(Debug)]
pub enum ImageError {
    /// The frame's pixel-format tag is not one the converter understands.
    UnsupportedFormat(u32),
    Decode(String),
    /// Planes or sizes that do not agree with the declared frame geometry.
    Geometry(String),
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::UnsupportedFormat(tag) => {
                write!(f, "unsupported pixel format: {}", fourcc_to_string(*tag))
            }
            ImageError::Decode(msg) => write!(f, "decode error: {msg}"),
            ImageError::Geometry(msg) => write!(f, "geometry error: {msg}"),
        }
    }
}

impl std::error::Error for ImageError {}

impl From<crates_image::ImageError> for ImageError {
    fn from(err: crates_image::ImageError) -> Self {
        ImageError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for ImageError {
    fn from(err: std::io::Error) -> Self {
        ImageError::Decode(err.to_string())
    }
}
