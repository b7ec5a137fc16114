use {
    crate::*,
    base::Tensor,
    std::sync::Arc,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    Unloaded,
    Loaded,
    Ready,
    LoadFailed,
}

/// A classifier model with an optional accelerated path.
///
/// The standard (CPU) session is opened by `load`. When the options name an accelerated
/// device, that session is opened on the first `classify`; any failure there disables
/// acceleration for the rest of the model's life and the call is served by the standard
/// session instead. `classify` takes `&mut self`, so one model runs one inference at a time.
pub struct Model {
    backend: Arc<dyn Backend>,
    options: ModelOptions,
    state: ModelState,
    config: Option<Arc<ModelConfig>>,
    bytes: Option<ModelBytes>,
    standard: Option<Box<dyn Session>>,
    accelerated: Option<Box<dyn Session>>,
    acceleration_enabled: bool,
}

impl Model {
    pub fn new(backend: Arc<dyn Backend>, options: ModelOptions) -> Self {
        let acceleration_enabled = options
            .acceleration
            .as_ref()
            .is_some_and(Device::is_accelerated);
        Self {
            backend,
            options,
            state: ModelState::Unloaded,
            config: None,
            bytes: None,
            standard: None,
            accelerated: None,
            acceleration_enabled,
        }
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    pub fn acceleration_enabled(&self) -> bool {
        self.acceleration_enabled
    }

    pub fn config(&self) -> Option<Arc<ModelConfig>> {
        self.config.clone()
    }

    /// Load the model and resolve its configuration.
    ///
    /// A model that failed to load stays failed: later calls return an error without
    /// reading the source or touching the backend.
    pub fn load(&mut self, source: ModelSource) -> Result<Arc<ModelConfig>, InferError> {
        match self.state {
            ModelState::Unloaded => {}
            ModelState::LoadFailed => {
                return Err(InferError::ModelLoad(
                    "model previously failed to load".to_string(),
                ));
            }
            ModelState::Loaded | ModelState::Ready => {
                return Err(InferError::ModelLoad("model is already loaded".to_string()));
            }
        }
        let artifact = source.name();
        match self.open_standard(&artifact, source) {
            Ok(config) => {
                base::log_info!(
                    "loaded {} via {}: input {}, {} labels, {:?} scores",
                    artifact,
                    self.backend.name(),
                    config.input,
                    config.labels.len(),
                    config.scores
                );
                self.state = ModelState::Ready;
                Ok(config)
            }
            Err(error) => {
                self.state = ModelState::LoadFailed;
                self.standard = None;
                self.bytes = None;
                let error = match error {
                    InferError::ModelLoad(_) => error,
                    other => InferError::ModelLoad(other.to_string()),
                };
                base::log_error!("failed to load {}: {}", artifact, error);
                Err(error)
            }
        }
    }

    fn open_standard(
        &mut self,
        artifact: &str,
        source: ModelSource,
    ) -> Result<Arc<ModelConfig>, InferError> {
        let bytes = source.open()?;
        self.state = ModelState::Loaded;
        let session = self.backend.open(&bytes, &Device::Cpu)?;
        let config = Arc::new(ModelConfig::resolve(
            artifact,
            &self.options,
            session.signature(),
        )?);
        self.standard = Some(session);
        self.config = Some(Arc::clone(&config));
        if self.acceleration_enabled {
            self.bytes = Some(bytes);
        }
        Ok(config)
    }

    /// Run one preprocessed input through the model.
    pub fn classify(&mut self, input: &Tensor<f32>) -> Result<ScoreVector, InferError> {
        let config = match (self.state, &self.config) {
            (ModelState::Ready, Some(config)) => Arc::clone(config),
            _ => return Err(InferError::ModelNotLoaded),
        };
        let expected = config.input.dims();
        if input.shape != expected {
            return Err(InferError::Inference(format!(
                "input {:?} does not match model input {:?}",
                input.shape, expected
            )));
        }
        let scores = match self.run_accelerated(input, config.labels.len()) {
            Some(scores) => scores,
            None => {
                let session = self.standard.as_mut().ok_or(InferError::ModelNotLoaded)?;
                session.run(input)?
            }
        };
        if scores.is_empty() {
            return Err(InferError::EmptyScoreVector);
        }
        if scores.len() != config.labels.len() {
            return Err(InferError::Inference(format!(
                "model produced {} scores for {} labels",
                scores.len(),
                config.labels.len()
            )));
        }
        Ok(ScoreVector::new(scores))
    }

    fn run_accelerated(&mut self, input: &Tensor<f32>, expected_len: usize) -> Option<Vec<f32>> {
        if !self.acceleration_enabled {
            return None;
        }
        let device = self.options.acceleration.clone()?;
        if self.accelerated.is_none() {
            let bytes = self.bytes.as_ref()?;
            match self.backend.open(bytes, &device) {
                Ok(session) => self.accelerated = Some(session),
                Err(error) => {
                    self.disable_acceleration(&device, &error.to_string());
                    return None;
                }
            }
        }
        let session = self.accelerated.as_mut()?;
        match session.run(input) {
            Ok(scores) if scores.len() == expected_len => Some(scores),
            Ok(scores) => {
                let reason = format!("{} scores for {} labels", scores.len(), expected_len);
                self.disable_acceleration(&device, &reason);
                None
            }
            Err(error) => {
                self.disable_acceleration(&device, &error.to_string());
                None
            }
        }
    }

    fn disable_acceleration(&mut self, device: &Device, reason: &str) {
        self.acceleration_enabled = false;
        self.accelerated = None;
        self.bytes = None;
        base::log_warn!(
            "{} acceleration failed ({}), falling back to {}",
            device,
            reason,
            Device::Cpu
        );
    }
}
