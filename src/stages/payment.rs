use tracing::{debug, info, warn};

use crate::error::TaskError;
use crate::llm::{
    build_payment_system_prompt, build_payment_user_prompt, validate_payment_tool,
    validate_tool_arguments, OpenAiClient, ToolCall, VALIDATE_PAYMENT_TOOL,
};
use crate::models::ValidationOutcome;
use crate::payment::PaymentValidationClient;
use crate::stages::format_transcript;

/// Run the payment extraction and validation task
///
/// The model sees one tool and decides whether to call it. Only the first
/// requested call is acted on; the validation endpoint is contacted only when
/// that call names the expected tool and carries well-formed arguments.
pub async fn execute_payment_validation(
    llm: &OpenAiClient,
    payments: &PaymentValidationClient,
    transcript: &str,
    transcript_id: &str,
) -> Result<ValidationOutcome, TaskError> {
    let formatted = format_transcript(transcript);
    let system = build_payment_system_prompt();
    let user = build_payment_user_prompt(transcript_id, &formatted);

    let reply = llm
        .send_with_tools(&system, &user, &[validate_payment_tool()])
        .await?;

    let Some(call) = select_tool_call(&reply.tool_calls) else {
        info!("Model made no actionable tool call for {}", transcript_id);
        return Err(TaskError::NoToolInvocation);
    };
    debug!("Tool call {} requested", call.id);

    let args = validate_tool_arguments(&call.function.arguments)
        .map_err(|errors| TaskError::InvalidModelOutput(errors.join("; ")))?;

    if args.transcript_id != transcript_id {
        warn!(
            "Tool call transcript_id {:?} differs from {:?}",
            args.transcript_id, transcript_id
        );
    }

    let response = payments.validate(&args).await;
    info!(
        "Payment validation for {} finished with status {}",
        transcript_id, response.status_code
    );

    Ok(ValidationOutcome::new(args, response))
}

/// First requested call, if it targets the payment tool
fn select_tool_call(calls: &[ToolCall]) -> Option<&ToolCall> {
    let first = calls.first()?;
    if calls.len() > 1 {
        warn!("Model requested {} tool calls; using the first", calls.len());
    }
    if first.function.name != VALIDATE_PAYMENT_TOOL {
        warn!("Model called unknown tool {:?}", first.function.name);
        return None;
    }
    Some(first)
}
