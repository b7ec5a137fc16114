use {
    base::{Tensor, Vec2},
    history::{HistoryStore, MemoryStore},
    image::RawFrame,
    inference::*,
    pipeline::*,
    std::sync::{Arc, Barrier, Weak},
};

struct FixedBackend {
    scores: Vec<f32>,
}

struct FixedSession {
    signature: ModelSignature,
    scores: Vec<f32>,
}

impl Session for FixedSession {
    fn signature(&self) -> &ModelSignature {
        &self.signature
    }

    fn run(&mut self, input: &Tensor<f32>) -> Result<Vec<f32>, InferError> {
        assert_eq!(input.shape, vec![1, 4, 4, 3]);
        Ok(self.scores.clone())
    }
}

impl Backend for FixedBackend {
    fn name(&self) -> &str {
        "fixed"
    }

    fn open(&self, _model: &[u8], _device: &Device) -> Result<Box<dyn Session>, InferError> {
        Ok(Box::new(FixedSession {
            signature: ModelSignature::new(InputShape::new(4, 4, 3, Layout::Nhwc))
                .with_output_len(self.scores.len()),
            scores: self.scores.clone(),
        }))
    }
}

// holds inference at two rendezvous: one when it starts, one to let it finish
struct GatedBackend {
    gate: Arc<Barrier>,
}

struct GatedSession {
    signature: ModelSignature,
    gate: Arc<Barrier>,
}

impl Session for GatedSession {
    fn signature(&self) -> &ModelSignature {
        &self.signature
    }

    fn run(&mut self, _input: &Tensor<f32>) -> Result<Vec<f32>, InferError> {
        self.gate.wait();
        self.gate.wait();
        Ok(vec![0.1, 0.05, 0.7, 0.15])
    }
}

impl Backend for GatedBackend {
    fn name(&self) -> &str {
        "gated"
    }

    fn open(&self, _model: &[u8], _device: &Device) -> Result<Box<dyn Session>, InferError> {
        Ok(Box::new(GatedSession {
            signature: ModelSignature::new(InputShape::new(4, 4, 3, Layout::Nhwc))
                .with_output_len(4),
            gate: Arc::clone(&self.gate),
        }))
    }
}

async fn pass(gate: &Arc<Barrier>) {
    let gate = Arc::clone(gate);
    tokio::task::spawn_blocking(move || {
        gate.wait();
    })
    .await
    .unwrap();
}

struct PanickingDelivery;

impl Delivery for PanickingDelivery {
    fn deliver(&self, _outcome: Outcome) {
        panic!("result screen crashed");
    }
}

fn coordinator() -> Coordinator {
    coordinator_with(FixedBackend {
        scores: vec![0.1, 0.05, 0.7, 0.15],
    })
}

fn coordinator_with(backend: impl Backend + 'static) -> Coordinator {
    let mut model = Model::new(Arc::new(backend), ModelOptions::default());
    model.load(ModelSource::Memory(vec![1, 2, 3])).unwrap();
    let history = HistoryStore::new(Box::new(MemoryStore::new()), "analysis_history");
    Coordinator::new(model, history)
}

fn capture(name: &str) -> Capture {
    Capture::new(name, RawFrame::rgb(Vec2::new(8, 8), vec![128; 8 * 8 * 3]))
}

fn target() -> (Arc<ChannelDelivery>, tokio::sync::mpsc::UnboundedReceiver<Outcome>, Weak<dyn Delivery>) {
    let (delivery, rx) = ChannelDelivery::new();
    let weak: Weak<dyn Delivery> = Arc::downgrade(&delivery) as Weak<dyn Delivery>;
    (delivery, rx, weak)
}

#[tokio::test]
async fn test_submit_delivers_and_records() {
    let coordinator = coordinator();
    let (_delivery, mut rx, weak) = target();

    let handle = coordinator.submit(capture("content://media/1"), weak).unwrap();
    handle.await.unwrap();

    let classification = rx.recv().await.unwrap().unwrap();
    assert_eq!(classification.result.label, "psoriasis");
    assert!((classification.result.confidence - 70.0).abs() < 1e-4);
    assert_eq!(classification.result.source, "content://media/1");
    assert_eq!(classification.ranking.len(), 4);
    assert_eq!(classification.ranking[0].label, "psoriasis");
    assert_eq!(classification.ranking[1].label, "rosacea");

    let history = coordinator.history().await;
    assert_eq!(history, vec![classification.result]);
    assert_eq!(coordinator.phase(), Phase::Idle);
}

#[tokio::test]
async fn test_busy_while_processing() {
    let coordinator = coordinator();
    let (_delivery, mut rx, weak) = target();

    let handle = coordinator.submit(capture("first"), weak.clone()).unwrap();
    assert!(coordinator.is_busy());
    assert!(matches!(
        coordinator.submit(capture("second"), weak.clone()),
        Err(ClassifyError::Busy)
    ));
    assert_eq!(coordinator.begin_capture(), Err(ClassifyError::Busy));
    handle.await.unwrap();

    assert!(rx.recv().await.unwrap().is_ok());
    assert!(!coordinator.is_busy());
    let handle = coordinator.submit(capture("third"), weak).unwrap();
    handle.await.unwrap();
    assert!(rx.recv().await.unwrap().is_ok());
    assert_eq!(coordinator.history().await.len(), 2);
}

#[tokio::test]
async fn test_dead_target_skips_delivery_and_history() {
    let coordinator = coordinator();
    let (delivery, mut rx, weak) = target();
    drop(delivery);

    let handle = coordinator.submit(capture("torn down"), weak).unwrap();
    handle.await.unwrap();

    assert!(rx.recv().await.is_none());
    assert!(coordinator.history().await.is_empty());
    assert_eq!(coordinator.phase(), Phase::Idle);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_target_torn_down_during_processing() {
    let gate = Arc::new(Barrier::new(2));
    let coordinator = coordinator_with(GatedBackend {
        gate: Arc::clone(&gate),
    });
    let (delivery, mut rx, weak) = target();

    let handle = coordinator.submit(capture("left the screen"), weak).unwrap();
    pass(&gate).await;
    assert_eq!(coordinator.phase(), Phase::Processing);
    drop(delivery);
    pass(&gate).await;
    handle.await.unwrap();

    assert!(rx.recv().await.is_none());
    assert!(coordinator.history().await.is_empty());
    assert_eq!(coordinator.phase(), Phase::Idle);
}

#[tokio::test]
async fn test_panicking_delivery_does_not_wedge_the_pipeline() {
    let coordinator = coordinator();
    let crashing: Arc<dyn Delivery> = Arc::new(PanickingDelivery);

    let handle = coordinator
        .submit(capture("first"), Arc::downgrade(&crashing))
        .unwrap();
    assert!(handle.await.unwrap_err().is_panic());
    assert_eq!(coordinator.phase(), Phase::Idle);
    assert_eq!(coordinator.history().await.len(), 1);

    let (_delivery, mut rx, weak) = target();
    coordinator.submit(capture("second"), weak).unwrap().await.unwrap();
    assert!(rx.recv().await.unwrap().is_ok());
    assert_eq!(coordinator.history().await.len(), 2);
}

#[tokio::test]
async fn test_errors_are_delivered() {
    let coordinator = coordinator();
    let (_delivery, mut rx, weak) = target();

    let nv12 = u32::from_le_bytes(*b"NV12");
    let frame = RawFrame::new(nv12, Vec2::new(8, 8), Vec::new());
    let handle = coordinator.submit(Capture::new("camera", frame), weak.clone()).unwrap();
    handle.await.unwrap();
    assert_eq!(
        rx.recv().await.unwrap(),
        Err(ClassifyError::UnsupportedFormat(nv12))
    );

    let garbage = RawFrame::compressed(vec![0xde, 0xad, 0xbe, 0xef]);
    let handle = coordinator.submit(Capture::new("gallery", garbage), weak).unwrap();
    handle.await.unwrap();
    assert!(matches!(
        rx.recv().await.unwrap(),
        Err(ClassifyError::Decode(_))
    ));

    assert!(coordinator.history().await.is_empty());
    assert_eq!(coordinator.phase(), Phase::Idle);
}

#[tokio::test]
async fn test_failed_model_answers_not_loaded() {
    let dir = std::env::temp_dir().join(format!("pipeline-test-{}-noload", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let config = PipelineConfig::default()
        .with_model_path(dir.join("missing.onnx"))
        .with_history_dir(&dir);
    let backend = FixedBackend {
        scores: vec![0.1, 0.05, 0.7, 0.15],
    };
    let coordinator = Coordinator::start(&config, Arc::new(backend)).unwrap();
    assert!(matches!(coordinator.load_error(), Some(InferError::ModelLoad(_))));
    assert!(coordinator.model_config().is_none());

    let (_delivery, mut rx, weak) = target();
    for _ in 0..2 {
        let handle = coordinator.submit(capture("any"), weak.clone()).unwrap();
        handle.await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), Err(ClassifyError::ModelNotLoaded));
    }

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_started_session_persists_history() {
    let dir = std::env::temp_dir().join(format!("pipeline-test-{}-persist", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let model_path = dir.join("model.onnx");
    std::fs::write(&model_path, b"graph").unwrap();
    let config = PipelineConfig::default()
        .with_model_path(&model_path)
        .with_history_dir(&dir);

    {
        let backend = FixedBackend {
            scores: vec![0.1, 0.05, 0.7, 0.15],
        };
        let coordinator = Coordinator::start(&config, Arc::new(backend)).unwrap();
        assert!(coordinator.load_error().is_none());
        let (_delivery, mut rx, weak) = target();
        coordinator.submit(capture("saved"), weak).unwrap().await.unwrap();
        assert!(rx.recv().await.unwrap().is_ok());
    }

    let backend = FixedBackend {
        scores: vec![0.1, 0.05, 0.7, 0.15],
    };
    let coordinator = Coordinator::start(&config, Arc::new(backend)).unwrap();
    let history = coordinator.history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].source, "saved");

    coordinator.clear_history().await.unwrap();
    assert!(coordinator.history().await.is_empty());

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_capture_lifecycle() {
    let coordinator = coordinator();
    let mut phases = coordinator.subscribe();

    coordinator.begin_capture().unwrap();
    assert_eq!(coordinator.phase(), Phase::Capturing);
    assert!(phases.has_changed().unwrap());
    assert_eq!(*phases.borrow_and_update(), Phase::Capturing);
    assert_eq!(coordinator.begin_capture(), Err(ClassifyError::Busy));

    assert!(coordinator.cancel_capture());
    assert!(!coordinator.cancel_capture());
    assert_eq!(coordinator.phase(), Phase::Idle);

    coordinator.begin_capture().unwrap();
    let (_delivery, mut rx, weak) = target();
    coordinator.submit(capture("from camera"), weak).unwrap().await.unwrap();
    assert!(rx.recv().await.unwrap().is_ok());
    assert_eq!(coordinator.phase(), Phase::Idle);
}
