use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable message for the "model declined to call the tool" outcome.
///
/// Consumers match on this to render "no payment attempt" instead of an error.
pub const NO_TOOL_CALL_SENTINEL: &str = "The LLM did not request a tool call.";

/// Errors from the language-model endpoint
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("Failed to send request to LLM API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("LLM API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse LLM API response: {0}")]
    Decode(String),

    #[error("LLM API returned no choices")]
    EmptyResponse,
}

/// Failure of one pipeline task
#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    ModelCall(#[from] LlmError),

    #[error("Invalid model output: {0}")]
    InvalidModelOutput(String),

    #[error("{}", NO_TOOL_CALL_SENTINEL)]
    NoToolInvocation,
}

impl TaskError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TaskError::ModelCall(_) | TaskError::InvalidModelOutput(_) => {
                ErrorKind::ModelCallFailure
            }
            TaskError::NoToolInvocation => ErrorKind::NoToolInvocation,
        }
    }
}

/// Classification of everything that can go other than planned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Network, auth, rate-limit or parse failure around the model call
    ModelCallFailure,
    /// The model chose not to call the tool (expected outcome)
    NoToolInvocation,
    /// The validation endpoint could not be reached
    TransportFailure,
    /// The validation endpoint answered but rejected the payment
    ApplicationFailure,
}

/// Serialized failure shape returned in place of a task result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub kind: ErrorKind,
    pub error: String,
}

impl ErrorResult {
    pub fn is_no_tool_call(&self) -> bool {
        self.kind == ErrorKind::NoToolInvocation
    }
}

impl From<&TaskError> for ErrorResult {
    fn from(err: &TaskError) -> Self {
        Self {
            kind: err.kind(),
            error: err.to_string(),
        }
    }
}

impl From<TaskError> for ErrorResult {
    fn from(err: TaskError) -> Self {
        Self::from(&err)
    }
}
