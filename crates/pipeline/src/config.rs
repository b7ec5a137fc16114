use {
    base::Level,
    inference::{DEFAULT_LABELS, Device, ModelOptions, Normalization, ScoreKind},
    serde::{Deserialize, Serialize},
    std::{fmt, path::{Path, PathBuf}},
};

#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "config io error: {msg}"),
            ConfigError::Parse(msg) => write!(f, "config parse error: {msg}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// Session configuration, read from a JSON file. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub model_path: PathBuf,
    pub history_dir: PathBuf,
    pub history_namespace: String,
    pub history_key: String,
    /// Used when the model does not embed its own labels.
    pub labels: Vec<String>,
    pub normalization: Normalization,
    pub scores: ScoreKind,
    pub acceleration: Option<Device>,
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("data/model.onnx"),
            history_dir: PathBuf::from("data/history"),
            history_namespace: "DermoMask".to_string(),
            history_key: "analysis_history".to_string(),
            labels: DEFAULT_LABELS.iter().map(|label| label.to_string()).collect(),
            normalization: Normalization::unit(),
            scores: ScoreKind::Probabilities,
            acceleration: None,
            log_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.labels.is_empty() {
            return Err(ConfigError::Invalid("labels must not be empty".to_string()));
        }
        if !self.normalization.scale.is_finite() || !self.normalization.offset.is_finite() {
            return Err(ConfigError::Invalid("normalization must be finite".to_string()));
        }
        self.level()?;
        Ok(())
    }

    pub fn level(&self) -> Result<Level, ConfigError> {
        self.log_level
            .parse::<Level>()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn model_options(&self) -> ModelOptions {
        let options = ModelOptions::default()
            .with_labels(self.labels.clone())
            .with_normalization(self.normalization)
            .with_scores(self.scores);
        match &self.acceleration {
            Some(device) => options.with_acceleration(device.clone()),
            None => options,
        }
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_history_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.history_dir = dir.into();
        self
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_acceleration(mut self, device: Device) -> Self {
        self.acceleration = Some(device);
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }
}
