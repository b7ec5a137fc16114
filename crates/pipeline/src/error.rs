use {
    image::{ImageError, fourcc_to_string},
    inference::InferError,
    std::fmt,
};

/// Why a classification request did not produce a result.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifyError {
    UnsupportedFormat(u32),
    Decode(String),
    InvalidShape(String),
    ModelNotLoaded,
    Inference(String),
    EmptyScoreVector,
    Busy,
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifyError::UnsupportedFormat(tag) => {
                write!(f, "unsupported pixel format: {}", fourcc_to_string(*tag))
            }
            ClassifyError::Decode(msg) => write!(f, "could not decode image: {msg}"),
            ClassifyError::InvalidShape(msg) => write!(f, "invalid shape: {msg}"),
            ClassifyError::ModelNotLoaded => write!(f, "model not loaded"),
            ClassifyError::Inference(msg) => write!(f, "inference failed: {msg}"),
            ClassifyError::EmptyScoreVector => write!(f, "model returned no scores"),
            ClassifyError::Busy => write!(f, "a classification is already in progress"),
        }
    }
}

impl std::error::Error for ClassifyError {}

impl From<ImageError> for ClassifyError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::UnsupportedFormat(tag) => ClassifyError::UnsupportedFormat(tag),
            ImageError::Decode(msg) | ImageError::Geometry(msg) => ClassifyError::Decode(msg),
        }
    }
}

impl From<InferError> for ClassifyError {
    fn from(err: InferError) -> Self {
        match err {
            InferError::ModelNotLoaded | InferError::ModelLoad(_) => ClassifyError::ModelNotLoaded,
            InferError::InvalidShape(msg) => ClassifyError::InvalidShape(msg),
            InferError::EmptyScoreVector => ClassifyError::EmptyScoreVector,
            InferError::Inference(msg) | InferError::Io(msg) => ClassifyError::Inference(msg),
            InferError::UnsupportedDevice(device) => {
                ClassifyError::Inference(format!("unsupported device: {device}"))
            }
        }
    }
}

impl From<std::io::Error> for ClassifyError {
    fn from(err: std::io::Error) -> Self {
        ClassifyError::Decode(err.to_string())
    }
}
