use {
    crate::ClassifyError,
    inference::{ClassificationResult, LabelScore},
    std::sync::Arc,
    tokio::sync::mpsc,
};

/// A successful classification with the score of every label, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub result: ClassificationResult,
    pub ranking: Vec<LabelScore>,
}

pub type Outcome = Result<Classification, ClassifyError>;

/// Receives the outcome of a submitted capture.
pub trait Delivery: Send + Sync {
    fn deliver(&self, outcome: Outcome);
}

/// Forwards outcomes into an unbounded channel.
pub struct ChannelDelivery {
    tx: mpsc::UnboundedSender<Outcome>,
}

impl ChannelDelivery {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Outcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl Delivery for ChannelDelivery {
    fn deliver(&self, outcome: Outcome) {
        if self.tx.send(outcome).is_err() {
            base::log_debug!("delivery receiver closed");
        }
    }
}
