use {crate::Device, base::TensorError, std::fmt};

#[derive(Debug, Clone, PartialEq)]
pub enum InferError {
    ModelNotLoaded,
    ModelLoad(String),
    InvalidShape(String),
    Inference(String),
    EmptyScoreVector,
    UnsupportedDevice(Device),
    Io(String),
}

impl fmt::Display for InferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferError::ModelNotLoaded => write!(f, "model not loaded"),
            InferError::ModelLoad(msg) => write!(f, "model load error: {msg}"),
            InferError::InvalidShape(msg) => write!(f, "invalid shape: {msg}"),
            InferError::Inference(msg) => write!(f, "inference error: {msg}"),
            InferError::EmptyScoreVector => write!(f, "empty score vector"),
            InferError::UnsupportedDevice(device) => write!(f, "unsupported device: {device}"),
            InferError::Io(msg) => write!(f, "io error: {msg}"),
        }
    }
}

impl std::error::Error for InferError {}

impl From<std::io::Error> for InferError {
    fn from(err: std::io::Error) -> Self {
        InferError::Io(err.to_string())
    }
}

impl From<ort::Error> for InferError {
    fn from(err: ort::Error) -> Self {
        InferError::Inference(err.to_string())
    }
}

impl From<serde_json::Error> for InferError {
    fn from(err: serde_json::Error) -> Self {
        InferError::ModelLoad(err.to_string())
    }
}

impl From<TensorError> for InferError {
    fn from(err: TensorError) -> Self {
        InferError::InvalidShape(err.to_string())
    }
}
