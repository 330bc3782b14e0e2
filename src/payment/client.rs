use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::{FailureReason, PaymentCredentials, ToolInvocationArgs, ValidationResponse};

pub const DEFAULT_PAYMENT_API_URL: &str = "https://se-payment-verification-api.service.external.usea2.aws.prodigaltech.com/api/validate-payment";

/// Configuration for the payment validation endpoint
#[derive(Debug, Clone)]
pub struct PaymentApiConfig {
    /// Full URL of the `validate-payment` endpoint
    pub url: String,
    /// Tenant identity sent with every request
    pub student_id: String,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Extra attempts when the connection could not be established
    pub max_retries: u32,
    /// Pause before each retry
    pub retry_backoff_ms: u64,
}

impl PaymentApiConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let student_id = lookup("PAYMENT_STUDENT_ID")
            .context("PAYMENT_STUDENT_ID environment variable not set")?;

        let mut config = Self::new(DEFAULT_PAYMENT_API_URL, student_id);
        if let Some(url) = lookup("PAYMENT_API_URL") {
            config.url = url;
        }
        if let Some(timeout) = lookup("PAYMENT_API_TIMEOUT_SECS") {
            config.timeout_secs = timeout
                .parse()
                .context("PAYMENT_API_TIMEOUT_SECS must be a whole number of seconds")?;
        }
        if let Some(retries) = lookup("PAYMENT_API_MAX_RETRIES") {
            config.max_retries = retries
                .parse()
                .context("PAYMENT_API_MAX_RETRIES must be a non-negative integer")?;
        }
        Ok(config)
    }

    pub fn new(url: impl Into<String>, student_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            student_id: student_id.into(),
            timeout_secs: 30,
            max_retries: 1,
            retry_backoff_ms: 250,
        }
    }
}

/// Request body of `POST /api/validate-payment`
#[derive(Debug, Serialize)]
struct ValidatePaymentRequest<'a> {
    id: &'a str,
    student_id: &'a str,
    payment_valid: bool,
    failure_reason: FailureReason,
    credentials: &'a PaymentCredentials,
    amount: f64,
}

/// Thin client for the external payment validation endpoint
///
/// Always returns a [`ValidationResponse`]: HTTP answers of any status are
/// forwarded as-is, and a failed exchange is replaced by a synthesized 500.
pub struct PaymentValidationClient {
    client: Client,
    config: PaymentApiConfig,
}

impl PaymentValidationClient {
    pub fn new(config: PaymentApiConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &PaymentApiConfig {
        &self.config
    }

    /// Validate the arguments the model produced for the tool call
    pub async fn validate(&self, args: &ToolInvocationArgs) -> ValidationResponse {
        self.validate_payment(
            &args.transcript_id,
            args.payment_valid,
            args.failure_reason,
            &args.credentials,
            args.amount,
        )
        .await
    }

    pub async fn validate_payment(
        &self,
        transcript_id: &str,
        payment_valid: bool,
        failure_reason: FailureReason,
        credentials: &PaymentCredentials,
        amount: f64,
    ) -> ValidationResponse {
        let request = ValidatePaymentRequest {
            id: transcript_id,
            student_id: &self.config.student_id,
            payment_valid,
            failure_reason,
            credentials,
            amount,
        };

        debug!(
            "POST {} (id={}, failure_reason={}, card_number_len={}, has_cvv={})",
            self.config.url,
            transcript_id,
            failure_reason,
            credentials.card_number.len(),
            credentials.cvv.is_some()
        );

        let mut attempt = 0;
        let response = loop {
            match self.client.post(&self.config.url).json(&request).send().await {
                Ok(response) => break response,
                Err(e) if is_retryable(&e) && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(
                        "Payment API unreachable, retry {} of {}: {}",
                        attempt, self.config.max_retries, e
                    );
                    tokio::time::sleep(Duration::from_millis(self.config.retry_backoff_ms)).await;
                }
                Err(e) => {
                    warn!("Payment API request failed: {}", e);
                    return ValidationResponse::transport_failure(e.to_string());
                }
            }
        };

        let status_code = response.status().as_u16();
        match response.json::<serde_json::Value>().await {
            Ok(api_response) => {
                info!("Payment API answered with status {}", status_code);
                ValidationResponse::received(api_response, status_code)
            }
            Err(e) => {
                warn!(
                    "Payment API returned an unreadable body (status {}): {}",
                    status_code, e
                );
                ValidationResponse::transport_failure(e.to_string())
            }
        }
    }
}

/// Only a request that never reached the endpoint is safe to resend; a timeout
/// may fire after the payment was already submitted.
fn is_retryable(err: &reqwest::Error) -> bool {
    err.is_connect() && !err.is_timeout()
}
