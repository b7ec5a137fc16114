use crate::{
    ClassificationResult, InferError, LabelScore, ModelConfig, ScoreKind, ScoreVector,
};

#[inline]
fn sanitize(score: f32) -> f32 {
    if score.is_finite() { score } else { 0.0 }
}

#[inline]
fn to_percent(score: f32) -> f32 {
    (sanitize(score) * 100.0).clamp(0.0, 100.0)
}

fn check(scores: &ScoreVector, labels: &[String]) -> Result<(), InferError> {
    if scores.is_empty() {
        return Err(InferError::EmptyScoreVector);
    }
    if scores.len() != labels.len() {
        return Err(InferError::Inference(format!(
            "{} scores for {} labels",
            scores.len(),
            labels.len()
        )));
    }
    Ok(())
}

/// Numerically stable softmax. Non-finite logits count as 0.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let logits: Vec<f32> = logits.iter().copied().map(sanitize).collect();
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Bring a raw score vector into probability space.
pub fn probabilities(scores: &ScoreVector, kind: ScoreKind) -> ScoreVector {
    match kind {
        ScoreKind::Probabilities => scores.clone(),
        ScoreKind::Logits if scores.is_empty() => scores.clone(),
        ScoreKind::Logits => ScoreVector::new(softmax(scores.as_slice())),
    }
}

/// Pick the best scoring label. Ties go to the lowest index.
pub fn interpret(
    scores: &ScoreVector,
    labels: &[String],
    source: &str,
    timestamp: i64,
) -> Result<ClassificationResult, InferError> {
    check(scores, labels)?;
    let mut best = 0;
    let mut best_score = sanitize(scores.as_slice()[0]);
    for (i, &score) in scores.as_slice().iter().enumerate().skip(1) {
        let score = sanitize(score);
        if score > best_score {
            best = i;
            best_score = score;
        }
    }
    Ok(ClassificationResult {
        label: labels[best].clone(),
        confidence: to_percent(best_score),
        source: source.to_string(),
        timestamp,
    })
}

/// `interpret` after converting the scores according to the model's score kind.
pub fn interpret_with(
    scores: &ScoreVector,
    config: &ModelConfig,
    source: &str,
    timestamp: i64,
) -> Result<ClassificationResult, InferError> {
    interpret(
        &probabilities(scores, config.scores),
        &config.labels,
        source,
        timestamp,
    )
}

/// Every label with its confidence, best first. Ties keep label order.
pub fn rank(scores: &ScoreVector, labels: &[String]) -> Result<Vec<LabelScore>, InferError> {
    check(scores, labels)?;
    let mut order: Vec<(usize, f32)> = scores
        .as_slice()
        .iter()
        .map(|&score| sanitize(score))
        .enumerate()
        .collect();
    // stable sort, so equal scores stay in index order
    order.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(order
        .into_iter()
        .map(|(i, score)| LabelScore {
            label: labels[i].clone(),
            confidence: to_percent(score),
        })
        .collect())
}
