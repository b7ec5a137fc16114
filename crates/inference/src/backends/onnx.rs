use {
    crate::*,
    base::Tensor,
    ndarray::ArrayD,
    ort::{inputs, session::Session as OrtSession, value::TensorRef},
};

/// ONNX Runtime backend.
///
/// The graph's first input defines the input shape and layout; its first output the score
/// vector length. Optional custom metadata keys `labels` and `scores` describe the classes.
pub struct OnnxBackend {
    intra_threads: usize,
}

impl OnnxBackend {
    pub fn new() -> Self {
        Self { intra_threads: 1 }
    }

    pub fn with_intra_threads(mut self, intra_threads: usize) -> Self {
        self.intra_threads = intra_threads.max(1);
        self
    }
}

impl Default for OnnxBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for OnnxBackend {
    fn name(&self) -> &str {
        "onnx"
    }

    fn open(&self, model: &[u8], device: &Device) -> Result<Box<dyn Session>, InferError> {
        let builder = OrtSession::builder()
            .map_err(|e| InferError::ModelLoad(format!("failed to create session builder: {e}")))?
            .with_intra_threads(self.intra_threads)
            .map_err(|e| InferError::ModelLoad(format!("failed to set threads: {e}")))?;

        let mut builder = match device {
            Device::Cpu => builder,
            #[cfg(feature = "cuda")]
            Device::Cuda { device_id } => {
                use ort::execution_providers::CUDAExecutionProvider;
                let ep = CUDAExecutionProvider::default()
                    .with_device_id(*device_id)
                    .build()
                    .error_on_failure();
                builder
                    .with_execution_providers([ep])
                    .map_err(|_| InferError::UnsupportedDevice(device.clone()))?
            }
            #[cfg(not(feature = "cuda"))]
            Device::Cuda { .. } => {
                return Err(InferError::UnsupportedDevice(device.clone()));
            }
        };

        let session = builder
            .commit_from_memory(model)
            .map_err(|e| InferError::ModelLoad(format!("failed to load model: {e}")))?;
        let signature = read_signature(&session)?;
        base::log_debug!("onnx session on {}: {:?}", device, signature);
        Ok(Box::new(OnnxSession { session, signature }))
    }
}

fn read_signature(session: &OrtSession) -> Result<ModelSignature, InferError> {
    let input = session
        .inputs()
        .first()
        .ok_or_else(|| InferError::ModelLoad("model has no inputs".to_string()))?;
    let dims = input.dtype().tensor_shape().ok_or_else(|| {
        InferError::ModelLoad(format!("input '{}' is not a tensor", input.name()))
    })?;
    let mut signature = ModelSignature::new(InputShape::from_dims(dims)?);

    let output = session
        .outputs()
        .first()
        .ok_or_else(|| InferError::ModelLoad("model has no outputs".to_string()))?;
    if let Some(&len) = output
        .dtype()
        .tensor_shape()
        .and_then(|shape| shape.last())
    {
        if len > 0 {
            signature = signature.with_output_len(len as usize);
        }
    }

    if let Some(text) = custom_metadata(session, "labels") {
        signature = signature.with_labels(parse_labels(&text)?);
    }
    if let Some(text) = custom_metadata(session, "scores") {
        match ScoreKind::parse(&text) {
            Some(kind) => signature = signature.with_scores(kind),
            None => base::log_warn!("ignoring unknown score kind '{}' in model metadata", text),
        }
    }
    Ok(signature)
}

fn custom_metadata(session: &OrtSession, key: &str) -> Option<String> {
    session.metadata().ok()?.custom(key)
}

pub struct OnnxSession {
    session: OrtSession,
    signature: ModelSignature,
}

impl Session for OnnxSession {
    fn signature(&self) -> &ModelSignature {
        &self.signature
    }

    fn run(&mut self, input: &Tensor<f32>) -> Result<Vec<f32>, InferError> {
        let array = ArrayD::from_shape_vec(input.shape.clone(), input.data.clone())
            .map_err(|e| InferError::Inference(format!("input does not fit its shape: {e}")))?;
        let tensor = TensorRef::from_array_view(array.view())
            .map_err(|e| InferError::Inference(format!("failed to create tensor ref: {e}")))?;
        let outputs = self
            .session
            .run(inputs![tensor])
            .map_err(|e| InferError::Inference(format!("inference failed: {e}")))?;
        let scores = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| InferError::Inference(format!("output is not f32: {e}")))?;
        Ok(scores.iter().copied().collect())
    }
}
