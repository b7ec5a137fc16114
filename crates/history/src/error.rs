use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryError {
    Io(String),
    Corrupt(String),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::Io(msg) => write!(f, "history io error: {msg}"),
            HistoryError::Corrupt(msg) => write!(f, "history data corrupt: {msg}"),
        }
    }
}

impl std::error::Error for HistoryError {}

impl From<std::io::Error> for HistoryError {
    fn from(err: std::io::Error) -> Self {
        HistoryError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for HistoryError {
    fn from(err: serde_json::Error) -> Self {
        HistoryError::Corrupt(err.to_string())
    }
}
