use inference::{ClassificationResult, LabelScore};

pub fn format_confidence(confidence: f32) -> String {
    format!("Confidence: {confidence:.1}%")
}

/// One history line: condition, confidence and UTC date.
pub fn format_entry(result: &ClassificationResult) -> String {
    format!(
        "{:<12} {}  {}",
        result.label,
        format_confidence(result.confidence),
        base::format_millis(result.timestamp)
    )
}

pub fn format_ranking(ranking: &[LabelScore]) -> Vec<String> {
    ranking
        .iter()
        .map(|score| format!("  {:<12} {:5.1}%", score.label, score.confidence))
        .collect()
}
