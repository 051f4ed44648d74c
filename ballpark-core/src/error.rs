use thiserror::Error;

/// Selection of a stadium that is not in the table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StadiumError {
    #[error("Unknown stadium '{0}'. Run `ballpark stadiums` to see the supported names.")]
    Unknown(String),
}

/// Why a position could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable: {0}")]
    PositionUnavailable(String),
    #[error("location request timed out")]
    Timeout,
    #[error("location service unavailable: {0}")]
    Unavailable(String),
}

impl LocationError {
    /// User-facing status line for this failure.
    pub fn status_message(&self) -> String {
        match self {
            LocationError::PermissionDenied => {
                "Location permission denied. Keeping the current stadium.".to_string()
            }
            LocationError::PositionUnavailable(_) => {
                "Your position is unavailable right now. Keeping the current stadium.".to_string()
            }
            LocationError::Timeout => {
                "Location lookup timed out. Keeping the current stadium.".to_string()
            }
            LocationError::Unavailable(_) => {
                "Location is not available. Keeping the current stadium.".to_string()
            }
        }
    }
}

/// Failure while talking to the forecast API.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("forecast request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("forecast API returned status {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },
    #[error("failed to parse forecast response: {0}")]
    Parse(#[from] serde_json::Error),
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
