use thiserror::Error;

/// Errors that can occur while configuring or running a stand simulation.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: unknown species code '{0}' (expected LP, SP, SA, or LL)")]
    UnknownSpecies(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Convergence error: {0}")]
    Convergence(String),
}
