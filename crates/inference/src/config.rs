use {
    crate::{Device, InferError, ModelSignature},
    serde::{Deserialize, Serialize},
    std::fmt,
};

pub const DEFAULT_LABELS: [&str; 4] = ["acne", "eczema", "psoriasis", "rosacea"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Nhwc,
    Nchw,
}

/// Spatial input geometry expected by a model. Batch is always 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputShape {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
    pub layout: Layout,
}

impl InputShape {
    pub fn new(height: usize, width: usize, channels: usize, layout: Layout) -> Self {
        Self {
            height,
            width,
            channels,
            layout,
        }
    }

    /// Derive the shape from a graph's 4-D input dimensions.
    ///
    /// A trailing dimension of 1 or 3 is read as NHWC, otherwise a second dimension of 1 or 3
    /// is read as NCHW. Dynamic (non-positive) spatial dimensions are rejected.
    pub fn from_dims(dims: &[i64]) -> Result<Self, InferError> {
        let &[batch, d1, d2, d3] = dims else {
            return Err(InferError::ModelLoad(format!(
                "expected a 4-D image input, got {dims:?}"
            )));
        };
        if batch > 1 {
            return Err(InferError::ModelLoad(format!(
                "batch dimension must be 1, got {batch}"
            )));
        }
        let is_channels = |d: i64| d == 1 || d == 3;
        let (layout, height, width, channels) = if is_channels(d3) {
            (Layout::Nhwc, d1, d2, d3)
        } else if is_channels(d1) {
            (Layout::Nchw, d2, d3, d1)
        } else {
            return Err(InferError::ModelLoad(format!(
                "cannot find a 1 or 3 channel axis in {dims:?}"
            )));
        };
        if height <= 0 || width <= 0 {
            return Err(InferError::ModelLoad(format!(
                "dynamic spatial dimensions are not supported: {dims:?}"
            )));
        }
        Ok(Self::new(
            height as usize,
            width as usize,
            channels as usize,
            layout,
        ))
    }

    pub fn dims(&self) -> Vec<usize> {
        match self.layout {
            Layout::Nhwc => vec![1, self.height, self.width, self.channels],
            Layout::Nchw => vec![1, self.channels, self.height, self.width],
        }
    }

    pub fn element_count(&self) -> usize {
        self.height * self.width * self.channels
    }

    pub fn validate(&self) -> Result<(), InferError> {
        if self.height == 0 || self.width == 0 {
            return Err(InferError::InvalidShape(format!(
                "input extent {}x{} is empty",
                self.width, self.height
            )));
        }
        if self.channels != 1 && self.channels != 3 {
            return Err(InferError::InvalidShape(format!(
                "unsupported channel count {}",
                self.channels
            )));
        }
        Ok(())
    }
}

impl fmt::Display for InputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?}", self.layout, self.dims())
    }
}

/// Affine mapping from a `[0, 255]` channel value to the model's input range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    pub scale: f32,
    pub offset: f32,
}

impl Normalization {
    pub fn unit() -> Self {
        Self {
            scale: 1.0 / 255.0,
            offset: 0.0,
        }
    }

    pub fn symmetric() -> Self {
        Self {
            scale: 2.0 / 255.0,
            offset: -1.0,
        }
    }

    pub fn raw() -> Self {
        Self {
            scale: 1.0,
            offset: 0.0,
        }
    }

    #[inline]
    pub fn apply(&self, value: f32) -> f32 {
        value * self.scale + self.offset
    }
}

impl Default for Normalization {
    fn default() -> Self {
        Self::unit()
    }
}

/// What the model's output vector holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreKind {
    #[default]
    Probabilities,
    Logits,
}

impl ScoreKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "probabilities" | "probs" | "softmax" => Some(ScoreKind::Probabilities),
            "logits" => Some(ScoreKind::Logits),
            _ => None,
        }
    }
}

/// Parse a label list from model metadata: a JSON string array or a comma separated list.
pub fn parse_labels(text: &str) -> Result<Vec<String>, InferError> {
    let text = text.trim();
    let labels: Vec<String> = if text.starts_with('[') {
        serde_json::from_str(text)?
    } else {
        text.split(',')
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty())
            .collect()
    };
    Ok(labels)
}

/// Caller-side settings handed to a model before it is loaded.
#[derive(Debug, Clone)]
pub struct ModelOptions {
    pub labels: Vec<String>,
    pub normalization: Normalization,
    pub scores: ScoreKind,
    pub acceleration: Option<Device>,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            labels: DEFAULT_LABELS.iter().map(|label| label.to_string()).collect(),
            normalization: Normalization::default(),
            scores: ScoreKind::default(),
            acceleration: None,
        }
    }
}

impl ModelOptions {
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn with_scores(mut self, scores: ScoreKind) -> Self {
        self.scores = scores;
        self
    }

    pub fn with_acceleration(mut self, device: Device) -> Self {
        self.acceleration = Some(device);
        self
    }
}

/// Resolved model configuration, fixed once the model is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub artifact: String,
    pub input: InputShape,
    pub labels: Vec<String>,
    pub normalization: Normalization,
    pub scores: ScoreKind,
}

impl ModelConfig {
    /// Combine what the model declares about itself with the caller's options.
    ///
    /// Labels and score kind embedded in the model win over the options.
    pub fn resolve(
        artifact: impl Into<String>,
        options: &ModelOptions,
        signature: &ModelSignature,
    ) -> Result<Self, InferError> {
        signature
            .input
            .validate()
            .map_err(|e| InferError::ModelLoad(e.to_string()))?;
        let labels = match &signature.labels {
            Some(labels) if !labels.is_empty() => labels.clone(),
            _ => options.labels.clone(),
        };
        if labels.is_empty() {
            return Err(InferError::ModelLoad("label set is empty".to_string()));
        }
        if let Some(output_len) = signature.output_len {
            if output_len != labels.len() {
                return Err(InferError::ModelLoad(format!(
                    "model produces {output_len} scores but {} labels are configured",
                    labels.len()
                )));
            }
        }
        Ok(Self {
            artifact: artifact.into(),
            input: signature.input,
            labels,
            normalization: options.normalization,
            scores: signature.scores.unwrap_or(options.scores),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dims_layouts() {
        let nhwc = InputShape::from_dims(&[1, 224, 224, 3]).unwrap();
        assert_eq!(nhwc.layout, Layout::Nhwc);
        assert_eq!(nhwc.dims(), vec![1, 224, 224, 3]);

        let nchw = InputShape::from_dims(&[1, 3, 256, 192]).unwrap();
        assert_eq!(nchw.layout, Layout::Nchw);
        assert_eq!((nchw.height, nchw.width), (256, 192));
        assert_eq!(nchw.dims(), vec![1, 3, 256, 192]);

        let gray = InputShape::from_dims(&[-1, 1, 28, 28]).unwrap();
        assert_eq!(gray.layout, Layout::Nchw);
        assert_eq!(gray.channels, 1);
    }

    #[test]
    fn test_from_dims_rejects_dynamic_and_odd_shapes() {
        assert!(InputShape::from_dims(&[1, -1, -1, 3]).is_err());
        assert!(InputShape::from_dims(&[1, 224, 224]).is_err());
        assert!(InputShape::from_dims(&[1, 5, 224, 224]).is_err());
        assert!(InputShape::from_dims(&[4, 224, 224, 3]).is_err());
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!(
            parse_labels(r#"["acne", "eczema"]"#).unwrap(),
            vec!["acne", "eczema"]
        );
        assert_eq!(
            parse_labels(" acne, eczema ,,psoriasis ").unwrap(),
            vec!["acne", "eczema", "psoriasis"]
        );
        assert!(parse_labels("[not json").is_err());
    }

    #[test]
    fn test_score_kind_parse() {
        assert_eq!(ScoreKind::parse("Logits"), Some(ScoreKind::Logits));
        assert_eq!(ScoreKind::parse("softmax"), Some(ScoreKind::Probabilities));
        assert_eq!(ScoreKind::parse("odds"), None);
    }

    #[test]
    fn test_normalization_presets() {
        assert_eq!(Normalization::unit().apply(255.0), 1.0);
        assert_eq!(Normalization::symmetric().apply(0.0), -1.0);
        assert!((Normalization::symmetric().apply(255.0) - 1.0).abs() < 1e-6);
        assert_eq!(Normalization::raw().apply(128.0), 128.0);
    }
}
