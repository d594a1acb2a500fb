use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InsightsError {
    #[error("invalid colour '{0}', expected #rrggbb")]
    InvalidColor(String),
    #[error("invalid size range: min={min}, max={max}")]
    InvalidSizeRange { min: f64, max: f64 },
    #[error("invalid threshold {name}={value}")]
    InvalidThreshold { name: &'static str, value: f64 },
}

/// Thresholds must be finite and non-negative.
pub(crate) fn check_threshold(name: &'static str, value: f64) -> Result<f64, InsightsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(InsightsError::InvalidThreshold { name, value })
    }
}
