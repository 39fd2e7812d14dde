use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ManusErr>;

#[derive(Error, Debug)]
pub enum ManusErr {
    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {body}")]
    Provider { status: StatusCode, body: String },

    /// Structured output did not match the requested schema.
    #[error("structured output does not match schema: {0}")]
    SchemaViolation(String),

    /// The provider stream ended unexpectedly or carried a malformed chunk.
    #[error("stream error: {0}")]
    Stream(String),

    #[error("tool `{tool}` failed: {message}")]
    Tool { tool: String, message: String },

    #[error("model requested unknown tool `{0}`")]
    UnknownTool(String),

    #[error("agent `{agent}` did not produce a final answer within {limit} iterations")]
    MaxIterations { agent: String, limit: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
