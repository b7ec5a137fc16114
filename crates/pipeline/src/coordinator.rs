use {
    crate::*,
    history::{FileStore, HistoryError, HistoryStore},
    image::RawFrame,
    inference::{
        Backend, ClassificationResult, InferError, Model, ModelConfig, ModelSource,
        interpret_with, preprocess, rank,
    },
    std::{
        path::Path,
        sync::{Arc, Mutex, Weak},
    },
    tokio::{sync::watch, task::JoinHandle},
};

/// A frame handed over by the capture collaborator.
pub struct Capture {
    /// Opaque reference to where the image came from, kept with the result.
    pub source: String,
    pub frame: RawFrame,
}

impl Capture {
    pub fn new(source: impl Into<String>, frame: RawFrame) -> Self {
        Self {
            source: source.into(),
            frame,
        }
    }

    /// Read a compressed image file as a capture of unknown size.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ClassifyError> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| ClassifyError::Decode(format!("{}: {e}", path.display())))?;
        Ok(Self::new(path.display().to_string(), RawFrame::compressed(data)))
    }
}

/// Runs captures through conversion, preprocessing, inference and interpretation off the
/// caller's task, one request at a time, and hands the outcome to a delivery target.
pub struct Coordinator {
    model: Arc<Mutex<Model>>,
    config: Option<Arc<ModelConfig>>,
    load_error: Option<InferError>,
    history: Arc<tokio::sync::Mutex<HistoryStore>>,
    phase: Arc<watch::Sender<Phase>>,
}

impl Coordinator {
    /// Wrap an already loaded (or failed) model and a history store.
    pub fn new(model: Model, history: HistoryStore) -> Self {
        let config = model.config();
        let (phase, _) = watch::channel(Phase::Idle);
        Self {
            model: Arc::new(Mutex::new(model)),
            config,
            load_error: None,
            history: Arc::new(tokio::sync::Mutex::new(history)),
            phase: Arc::new(phase),
        }
    }

    /// Start a session: load the model once and open the file-backed history.
    ///
    /// A model that fails to load does not fail the session; the error is kept in
    /// `load_error` and every submission is answered with `ModelNotLoaded`.
    pub fn start(config: &PipelineConfig, backend: Arc<dyn Backend>) -> Result<Self, HistoryError> {
        let storage = FileStore::new(&config.history_dir, &config.history_namespace)?;
        let history = HistoryStore::new(Box::new(storage), config.history_key.clone());

        let mut model = Model::new(backend, config.model_options());
        let load_error = model
            .load(ModelSource::File(config.model_path.clone()))
            .err();

        let mut coordinator = Self::new(model, history);
        coordinator.load_error = load_error;
        Ok(coordinator)
    }

    pub fn model_config(&self) -> Option<Arc<ModelConfig>> {
        self.config.clone()
    }

    pub fn load_error(&self) -> Option<&InferError> {
        self.load_error.as_ref()
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    pub fn is_busy(&self) -> bool {
        self.phase().is_busy()
    }

    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// The capture collaborator starts acquiring a frame.
    pub fn begin_capture(&self) -> Result<(), ClassifyError> {
        let started = self.phase.send_if_modified(|phase| {
            if *phase == Phase::Idle {
                *phase = Phase::Capturing;
                true
            } else {
                false
            }
        });
        if started { Ok(()) } else { Err(ClassifyError::Busy) }
    }

    /// Abandon a capture that was started but never submitted.
    pub fn cancel_capture(&self) -> bool {
        self.phase.send_if_modified(|phase| {
            if *phase == Phase::Capturing {
                *phase = Phase::Idle;
                true
            } else {
                false
            }
        })
    }

    /// Accept a capture for classification.
    ///
    /// The outcome goes to `target` if it is still alive when the work finishes; a successful
    /// result is recorded in history first. A dead target skips both.
    pub fn submit(
        &self,
        capture: Capture,
        target: Weak<dyn Delivery>,
    ) -> Result<JoinHandle<()>, ClassifyError> {
        let accepted = self.phase.send_if_modified(|phase| {
            if phase.accepts_submit() {
                *phase = Phase::Processing;
                true
            } else {
                false
            }
        });
        if !accepted {
            base::log_debug!("rejecting capture from {}: {}", capture.source, self.phase());
            return Err(ClassifyError::Busy);
        }
        base::log_info!("classifying {}", capture.source);

        let model = Arc::clone(&self.model);
        let config = self.config.clone();
        let history = Arc::clone(&self.history);
        let phase = Arc::clone(&self.phase);

        Ok(tokio::spawn(async move {
            let _idle = IdleOnDrop(Arc::clone(&phase));
            let source = capture.source.clone();
            let outcome = match tokio::task::spawn_blocking(move || {
                classify(&model, config.as_deref(), capture)
            })
            .await
            {
                Ok(outcome) => outcome,
                Err(e) => Err(ClassifyError::Inference(format!("classification task failed: {e}"))),
            };

            let Some(target) = target.upgrade() else {
                base::log_debug!("delivery target for {} is gone, dropping outcome", source);
                return;
            };

            match outcome {
                Ok(classification) => {
                    let result = classification.result.clone();
                    match tokio::task::spawn_blocking(move || history.blocking_lock().append(&result))
                        .await
                    {
                        Ok(Ok(())) => {}
                        Ok(Err(error)) => {
                            base::log_error!("failed to record {} in history: {}", source, error);
                        }
                        Err(error) => {
                            base::log_error!("history task for {} failed: {}", source, error);
                        }
                    }
                    base::log_info!(
                        "{}: {} ({:.1}%)",
                        source,
                        classification.result.label,
                        classification.result.confidence
                    );
                    phase.send_replace(Phase::Delivering);
                    target.deliver(Ok(classification));
                }
                Err(error) => {
                    base::log_warn!("{}: {}", source, error);
                    phase.send_replace(Phase::Error);
                    target.deliver(Err(error));
                }
            }
        }))
    }

    /// Past results, newest first.
    pub async fn history(&self) -> Vec<ClassificationResult> {
        self.history.lock().await.load()
    }

    pub async fn clear_history(&self) -> Result<(), HistoryError> {
        self.history.lock().await.clear()
    }
}

// puts the phase back to Idle when the request task ends, panics included
struct IdleOnDrop(Arc<watch::Sender<Phase>>);

impl Drop for IdleOnDrop {
    fn drop(&mut self) {
        self.0.send_replace(Phase::Idle);
    }
}

fn classify(
    model: &Mutex<Model>,
    config: Option<&ModelConfig>,
    capture: Capture,
) -> Result<Classification, ClassifyError> {
    let config = config.ok_or(ClassifyError::ModelNotLoaded)?;
    let image = image::convert(&capture.frame)?;
    drop(capture.frame);
    let input = preprocess(&image, &config.input, &config.normalization)?;
    let scores = {
        let mut model = model
            .lock()
            .map_err(|_| ClassifyError::Inference("model lock poisoned".to_string()))?;
        model.classify(&input)?
    };
    let result = interpret_with(&scores, config, &capture.source, base::now_millis())?;
    let ranking = rank(&inference::probabilities(&scores, config.scores), &config.labels)?;
    Ok(Classification { result, ranking })
}
