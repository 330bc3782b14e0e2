use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::io::{CallReport, TaskReport};
use crate::llm::{OpenAiClient, OpenAiConfig};
use crate::payment::{PaymentApiConfig, PaymentValidationClient};
use crate::stages::{execute_analysis, execute_payment_validation, format_transcript};

/// Everything a pipeline run needs, loaded once at startup
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub llm: OpenAiConfig,
    pub payment: PaymentApiConfig,
    /// Run the call analysis task
    pub run_analysis: bool,
    /// Run the payment extraction/validation task
    pub run_validation: bool,
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            llm: OpenAiConfig::from_lookup(&lookup)?,
            payment: PaymentApiConfig::from_lookup(&lookup)?,
            run_analysis: true,
            run_validation: true,
        })
    }
}

/// Both tasks wired to their endpoints
pub struct Pipeline {
    llm: OpenAiClient,
    payments: PaymentValidationClient,
    run_analysis: bool,
    run_validation: bool,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let llm = OpenAiClient::new(config.llm).context("Failed to build LLM client")?;
        let payments = PaymentValidationClient::new(config.payment)
            .context("Failed to build payment API client")?;
        Ok(Self {
            llm,
            payments,
            run_analysis: config.run_analysis,
            run_validation: config.run_validation,
        })
    }

    /// Run the enabled tasks one after the other on a single transcript
    ///
    /// Task failures are captured in the report; this never fails.
    pub async fn run(&self, transcript: &str, transcript_id: &str) -> CallReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline", %run_id, transcript_id);

        async {
            let formatted_transcript = format_transcript(transcript);
            info!("Formatted transcript: {} lines", formatted_transcript.lines().count());

            let analysis = if self.run_analysis {
                info!("Task 1: call analysis...");
                Some(TaskReport::from(execute_analysis(&self.llm, transcript).await))
            } else {
                None
            };

            let payment_validation = if self.run_validation {
                info!("Task 2: payment validation...");
                Some(TaskReport::from(
                    execute_payment_validation(&self.llm, &self.payments, transcript, transcript_id)
                        .await,
                ))
            } else {
                None
            };

            CallReport {
                run_id,
                generated_at: Utc::now(),
                transcript_id: transcript_id.to_string(),
                formatted_transcript,
                analysis,
                payment_validation,
            }
        }
        .instrument(span)
        .await
    }
}

/// Build a pipeline from `config` and run it once
pub async fn run_pipeline(
    config: PipelineConfig,
    transcript: &str,
    transcript_id: &str,
) -> Result<CallReport> {
    let pipeline = Pipeline::new(config)?;
    Ok(pipeline.run(transcript, transcript_id).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{DEFAULT_MODEL, VALIDATE_PAYMENT_TOOL};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> PipelineConfig {
        let mut payment =
            PaymentApiConfig::new(format!("{}/api/validate-payment", server.uri()), "tenant-42");
        payment.max_retries = 0;
        PipelineConfig {
            llm: OpenAiConfig::new("test-key".to_string(), DEFAULT_MODEL.to_string())
                .with_base_url(server.uri()),
            payment,
            run_analysis: true,
            run_validation: true,
        }
    }

    #[tokio::test]
    async fn test_small_talk_run() {
        let server = MockServer::start().await;
        // Tool-calling request
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({"tool_choice": "auto"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Nothing to validate."}}]
            })))
            .with_priority(1)
            .mount(&server)
            .await;
        // Analysis request
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": json!({
                    "payment_attempted": false,
                    "customer_intent": false,
                    "customer_sentiment": {"classification": "Neutral", "description": "Chatty"},
                    "agent_performance": "Friendly and brief.",
                    "timestamped_events": []
                }).to_string()}}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/validate-payment"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let pipeline = Pipeline::new(config_for(&server)).unwrap();
        let transcript = r#"[{"role": "agent", "utterance": "How was your weekend?"},
                             {"role": "customer", "utterance": "Great, thanks!"}]"#;
        let report = pipeline.run(transcript, "call_small_talk").await;

        assert_eq!(
            report.formatted_transcript,
            "agent: How was your weekend?\ncustomer: Great, thanks!"
        );
        match report.analysis.unwrap() {
            TaskReport::Completed(analysis) => {
                assert_eq!(analysis.payment_attempted(), Some(false))
            }
            TaskReport::Failed(e) => panic!("analysis failed: {}", e.error),
        }
        match report.payment_validation.unwrap() {
            TaskReport::Failed(e) => assert!(e.is_no_tool_call()),
            TaskReport::Completed(_) => panic!("expected no tool call"),
        }
    }

    #[tokio::test]
    async fn test_disabled_tasks_are_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut config = config_for(&server);
        config.run_analysis = false;
        config.run_validation = false;
        let pipeline = Pipeline::new(config).unwrap();

        let report = pipeline.run("free text call notes", "pasted-transcript").await;

        assert!(report.analysis.is_none());
        assert!(report.payment_validation.is_none());
        assert_eq!(report.formatted_transcript, "free text call notes");
    }

    #[tokio::test]
    async fn test_failures_are_captured_per_task() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({"tool_choice": "auto"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": VALIDATE_PAYMENT_TOOL, "arguments": json!({
                        "transcript_id": "call_x",
                        "payment_valid": false,
                        "failure_reason": "invalid_luhn",
                        "credentials": {"cardholderName": "Sam Lee", "cardNumber": "4111111111111112"},
                        "amount": 120.5
                    }).to_string()}
                }]}}]
            })))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/validate-payment"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let pipeline = Pipeline::new(config_for(&server)).unwrap();
        let report = pipeline.run("customer reads a card number", "call_x").await;

        match report.analysis.unwrap() {
            TaskReport::Failed(e) => assert!(e.error.contains("503")),
            TaskReport::Completed(_) => panic!("expected analysis failure"),
        }
        match report.payment_validation.unwrap() {
            TaskReport::Completed(outcome) => {
                assert_eq!(outcome.extracted_data.credentials.cardholder_name, "Sam Lee");
                assert_eq!(outcome.status_code, 200);
            }
            TaskReport::Failed(e) => panic!("validation failed: {}", e.error),
        }
    }

    #[tokio::test]
    async fn test_run_pipeline_builds_and_runs() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut config = config_for(&server);
        config.run_analysis = false;
        config.run_validation = false;

        let report = run_pipeline(config, "agent: hello", "call_direct").await.unwrap();

        assert_eq!(report.transcript_id, "call_direct");
        assert_eq!(report.formatted_transcript, "agent: hello");
        assert!(report.analysis.is_none());
    }

    #[test]
    fn test_config_from_lookup_needs_both_endpoints() {
        let full = |key: &str| match key {
            "OPENAI_API_KEY" => Some("sk-test".to_string()),
            "PAYMENT_STUDENT_ID" => Some("tenant-42".to_string()),
            _ => None,
        };
        let config = PipelineConfig::from_lookup(full).unwrap();
        assert!(config.run_analysis && config.run_validation);
        assert_eq!(config.payment.student_id, "tenant-42");

        let no_tenant = |key: &str| (key == "OPENAI_API_KEY").then(|| "sk-test".to_string());
        let err = PipelineConfig::from_lookup(no_tenant).unwrap_err();
        assert!(err.to_string().contains("PAYMENT_STUDENT_ID"));
    }
}
