use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Load error: {0}")]
    Load(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl DashError {
    /// Validation failures are recoverable: the caller shows no charts and carries on.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, DashError>;
