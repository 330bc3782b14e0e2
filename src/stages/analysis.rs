use tracing::{debug, info, warn};

use crate::error::TaskError;
use crate::llm::{build_analysis_prompt, check_analysis_document, OpenAiClient};
use crate::models::AnalysisReport;
use crate::stages::format_transcript;

/// Run the call analysis task
///
/// 1. Format the transcript
/// 2. Send the analysis prompt as a single user message
/// 3. Parse the reply as one JSON document
/// 4. Record (but do not enforce) deviations from the expected structure
pub async fn execute_analysis(
    client: &OpenAiClient,
    transcript: &str,
) -> Result<AnalysisReport, TaskError> {
    let formatted = format_transcript(transcript);
    let prompt = build_analysis_prompt(&formatted);
    debug!("Analysis prompt: {} chars", prompt.len());

    let reply = client.send_message(&prompt).await?;

    let document: serde_json::Value = serde_json::from_str(reply.trim()).map_err(|e| {
        TaskError::InvalidModelOutput(format!("analysis reply is not valid JSON: {}", e))
    })?;

    let (structured, schema_issues) = check_analysis_document(&document);
    if !schema_issues.is_empty() {
        warn!(
            "Analysis document deviates from expected structure: {:?}",
            schema_issues
        );
    }

    info!(
        "Analysis complete (payment_attempted={:?})",
        structured.as_ref().map(|r| r.payment_attempted)
    );

    Ok(AnalysisReport {
        document,
        structured,
        schema_issues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::llm::{OpenAiConfig, DEFAULT_MODEL};
    use crate::models::SentimentClass;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SMALL_TALK: &str = r#"[
        {"role": "agent", "utterance": "Good morning, how are you today?"},
        {"role": "customer", "utterance": "Fine thanks, just calling to say hi."}
    ]"#;

    fn test_client(server: &MockServer) -> OpenAiClient {
        let config = OpenAiConfig::new("test-key".to_string(), DEFAULT_MODEL.to_string())
            .with_base_url(server.uri());
        OpenAiClient::new(config).unwrap()
    }

    async fn mock_reply(server: &MockServer, content: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": content}}]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_small_talk_has_no_payment_attempt() {
        let server = MockServer::start().await;
        let document = json!({
            "payment_attempted": false,
            "customer_intent": false,
            "customer_sentiment": {"classification": "Satisfied", "description": "Friendly"},
            "agent_performance": "The agent was courteous. No issues were raised.",
            "timestamped_events": []
        });
        mock_reply(&server, &document.to_string()).await;

        let report = execute_analysis(&test_client(&server), SMALL_TALK)
            .await
            .unwrap();

        assert_eq!(report.payment_attempted(), Some(false));
        assert!(report.schema_issues.is_empty());
        let structured = report.structured.unwrap();
        assert_eq!(
            structured.customer_sentiment.classification,
            SentimentClass::Satisfied
        );
    }

    #[tokio::test]
    async fn test_prompt_contains_formatted_transcript() {
        let server = MockServer::start().await;
        mock_reply(&server, "{\"payment_attempted\": false}").await;

        execute_analysis(&test_client(&server), SMALL_TALK)
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        let content = messages[0]["content"].as_str().unwrap();
        assert!(content.contains("agent: Good morning, how are you today?"));
        assert_eq!(body["temperature"], 0.0);
    }

    #[tokio::test]
    async fn test_partial_document_still_succeeds() {
        let server = MockServer::start().await;
        mock_reply(&server, "{\"payment_attempted\": true}").await;

        let report = execute_analysis(&test_client(&server), SMALL_TALK)
            .await
            .unwrap();

        assert!(report.structured.is_none());
        assert!(!report.schema_issues.is_empty());
        assert_eq!(report.payment_attempted(), Some(true));
    }

    #[tokio::test]
    async fn test_fenced_reply_is_an_error() {
        let server = MockServer::start().await;
        mock_reply(&server, "```json\n{\"payment_attempted\": true}\n```").await;

        let err = execute_analysis(&test_client(&server), SMALL_TALK)
            .await
            .unwrap_err();

        assert!(matches!(err, TaskError::InvalidModelOutput(_)));
        assert_eq!(err.kind(), ErrorKind::ModelCallFailure);
    }

    #[tokio::test]
    async fn test_endpoint_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let err = execute_analysis(&test_client(&server), SMALL_TALK)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ModelCallFailure);
        assert!(err.to_string().contains("500"));
    }
}
