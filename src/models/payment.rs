use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// Placeholder for required credential fields the caller never stated
pub const NOT_AVAILABLE: &str = "N/A";

/// Error message of the synthesized response for an unreachable endpoint
pub const API_REQUEST_FAILED: &str = "API request failed";

/// Why a payment attempt is expected to fail - fixed vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    ExpiredCard,
    InvalidCardLength,
    InvalidCvvLength,
    InvalidExpiryMonth,
    InvalidLuhn,
    MaskedCardNumber,
    DataMismatch,
    /// No attempt was made, or details were refused
    InvalidArgs,
    None,
}

impl FailureReason {
    pub const ALL: [FailureReason; 9] = [
        FailureReason::ExpiredCard,
        FailureReason::InvalidCardLength,
        FailureReason::InvalidCvvLength,
        FailureReason::InvalidExpiryMonth,
        FailureReason::InvalidLuhn,
        FailureReason::MaskedCardNumber,
        FailureReason::DataMismatch,
        FailureReason::InvalidArgs,
        FailureReason::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::ExpiredCard => "expired_card",
            FailureReason::InvalidCardLength => "invalid_card_length",
            FailureReason::InvalidCvvLength => "invalid_cvv_length",
            FailureReason::InvalidExpiryMonth => "invalid_expiry_month",
            FailureReason::InvalidLuhn => "invalid_luhn",
            FailureReason::MaskedCardNumber => "masked_card_number",
            FailureReason::DataMismatch => "data_mismatch",
            FailureReason::InvalidArgs => "invalid_args",
            FailureReason::None => "none",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Card details extracted from the call
///
/// Optional fields are either present with a value or absent from the JSON
/// entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PaymentCredentials {
    /// Name on the card, or "N/A"
    pub cardholder_name: String,
    /// Digits only, or "N/A"
    pub card_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_year: Option<u32>,
}

impl PaymentCredentials {
    /// Credentials with both required fields set to the placeholder
    pub fn unknown() -> Self {
        Self {
            cardholder_name: NOT_AVAILABLE.to_string(),
            card_number: NOT_AVAILABLE.to_string(),
            cvv: None,
            expiry_month: None,
            expiry_year: None,
        }
    }
}

/// Arguments of the `validate_payment_api_call` tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolInvocationArgs {
    pub transcript_id: String,
    pub payment_valid: bool,
    pub failure_reason: FailureReason,
    pub credentials: PaymentCredentials,
    pub amount: f64,
}

/// What the validation endpoint answered (or the synthesized substitute)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub api_response: serde_json::Value,
    pub status_code: u16,
    /// Set when no usable HTTP answer was obtained and the body was built locally
    #[serde(skip)]
    pub synthesized: bool,
}

impl ValidationResponse {
    /// An answer the endpoint actually sent
    pub fn received(api_response: serde_json::Value, status_code: u16) -> Self {
        Self {
            api_response,
            status_code,
            synthesized: false,
        }
    }

    /// Substitute for an exchange that produced no usable response
    pub fn transport_failure(details: impl Into<String>) -> Self {
        Self {
            api_response: serde_json::json!({
                "error": API_REQUEST_FAILED,
                "details": details.into(),
            }),
            status_code: 500,
            synthesized: true,
        }
    }
}

/// Model-extracted arguments merged with the validation endpoint's answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub extracted_data: ToolInvocationArgs,
    pub api_response: serde_json::Value,
    pub status_code: u16,
    #[serde(skip)]
    pub synthesized: bool,
}

/// How the validation endpoint judged the extracted payment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl ValidationOutcome {
    pub fn new(extracted_data: ToolInvocationArgs, response: ValidationResponse) -> Self {
        Self {
            extracted_data,
            api_response: response.api_response,
            status_code: response.status_code,
            synthesized: response.synthesized,
        }
    }

    pub fn verdict(&self) -> Verdict {
        let success = self
            .api_response
            .get("success")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if self.status_code == 200 && success {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        }
    }

    /// Classify an incorrect verdict; `None` when the payment was accepted
    pub fn failure_kind(&self) -> Option<ErrorKind> {
        if self.verdict() == Verdict::Correct {
            return None;
        }
        if self.synthesized {
            Some(ErrorKind::TransportFailure)
        } else {
            Some(ErrorKind::ApplicationFailure)
        }
    }
}
