use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Input not found: {0}")]
    NotFound(String),

    #[error("Malformed model: {0}")]
    MalformedModel(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Schema validation failed: {0}")]
    SchemaValidation(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {field}: {message}")]
    ConfigError { field: String, message: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
