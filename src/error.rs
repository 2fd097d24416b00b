use thiserror::Error;

/// Errors surfaced by the simulation pipeline and its adapters.
///
/// External price lookup failures are deliberately absent: the lookup is
/// best-effort and recovered internally by the synthetic price fallback.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("no strategy script provided")]
    MissingScript,

    #[error("invalid {field} date '{value}': expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    #[error("initial capital must be positive, got {0}")]
    InvalidCapital(f64),

    #[error("{field} must not be negative, got {value}")]
    InvalidPercent { field: &'static str, value: f64 },

    #[error("strategy '{0}' already exists in the library")]
    StrategyExists(String),

    #[error("strategy '{0}' not found in the library")]
    StrategyNotFound(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("failed to render CSV report: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
