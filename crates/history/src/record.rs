use {
    inference::ClassificationResult,
    serde::{Deserialize, Serialize},
};

/// One persisted history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub condition: String,
    pub confidence: f32,
    pub image_path: String,
    pub timestamp: i64,
}

// JSON cannot carry NaN or infinity
fn storable_confidence(confidence: f32) -> f32 {
    if confidence.is_finite() {
        confidence.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

impl From<&ClassificationResult> for HistoryRecord {
    fn from(result: &ClassificationResult) -> Self {
        Self {
            condition: result.label.clone(),
            confidence: storable_confidence(result.confidence),
            image_path: result.source.clone(),
            timestamp: result.timestamp,
        }
    }
}

impl From<HistoryRecord> for ClassificationResult {
    fn from(record: HistoryRecord) -> Self {
        Self {
            label: record.condition,
            confidence: record.confidence,
            source: record.image_path,
            timestamp: record.timestamp,
        }
    }
}
