use {
    crate::{Device, InferError, InputShape, ScoreKind},
    base::Tensor,
};

/// What a loaded graph declares about itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSignature {
    pub input: InputShape,
    /// Length of the score vector, when the graph fixes it.
    pub output_len: Option<usize>,
    pub labels: Option<Vec<String>>,
    pub scores: Option<ScoreKind>,
}

impl ModelSignature {
    pub fn new(input: InputShape) -> Self {
        Self {
            input,
            output_len: None,
            labels: None,
            scores: None,
        }
    }

    pub fn with_output_len(mut self, output_len: usize) -> Self {
        self.output_len = Some(output_len);
        self
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn with_scores(mut self, scores: ScoreKind) -> Self {
        self.scores = Some(scores);
        self
    }
}

/// An opened model bound to one device.
pub trait Session: Send {
    fn signature(&self) -> &ModelSignature;
    fn run(&mut self, input: &Tensor<f32>) -> Result<Vec<f32>, InferError>;
}

/// Turns model bytes into sessions.
pub trait Backend: Send + Sync {
    fn name(&self) -> &str;
    fn open(&self, model: &[u8], device: &Device) -> Result<Box<dyn Session>, InferError>;
}
