use thiserror::Error;

/// LLM tester errors
#[derive(Debug, Error)]
pub enum TesterError {
    #[error("No API key given and OPENAI_API_KEY is not set.")]
    MissingApiKey,
    #[error("The chat completion response contained no choices.")]
    EmptyResponse,
    #[error("Request to the chat completion endpoint failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to decode chat completion response: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
