use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Completion failed with provider '{provider}': {message}")]
    CompletionFailed { provider: String, message: String },

    #[error("No JSON object found in model response")]
    NoJsonFound,

    #[error("Malformed JSON in model response: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("Model response does not match the extraction schema: {0}")]
    SchemaViolation(String),

    #[error("Unknown LLM provider: {0}")]
    UnknownProvider(String),

    #[error("Missing API key: {0} environment variable is required")]
    MissingApiKey(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[cfg(feature = "providers")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExtractionError>;
