pub mod error;
pub mod io;
pub mod llm;
pub mod models;
pub mod payment;
pub mod stages;

pub use error::{ErrorKind, ErrorResult, LlmError, TaskError, NO_TOOL_CALL_SENTINEL};
pub use io::{
    load_transcript, read_transcript_stdin, render_summary, CallReport, LoadedTranscript,
    TaskReport,
};
pub use llm::{OpenAiClient, OpenAiConfig};
pub use models::{
    AnalysisReport, AnalysisResult, FailureReason, PaymentCredentials, ToolInvocationArgs, Turn,
    ValidationOutcome, ValidationResponse,
};
pub use payment::{PaymentApiConfig, PaymentValidationClient};
pub use stages::{
    execute_analysis, execute_payment_validation, format_transcript, run_pipeline, Pipeline,
    PipelineConfig,
};
