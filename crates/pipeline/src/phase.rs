use std::fmt;

/// Where the coordinator is in handling a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Capturing,
    Processing,
    Delivering,
    Error,
}

impl Phase {
    /// New captures and submissions are refused while busy.
    pub fn is_busy(&self) -> bool {
        matches!(self, Phase::Processing | Phase::Delivering)
    }

    pub fn accepts_submit(&self) -> bool {
        matches!(self, Phase::Idle | Phase::Capturing)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Capturing => write!(f, "capturing"),
            Phase::Processing => write!(f, "processing"),
            Phase::Delivering => write!(f, "delivering"),
            Phase::Error => write!(f, "error"),
        }
    }
}
