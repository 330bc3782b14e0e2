use serde::{Deserialize, Serialize};

/// Overall customer mood over the call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentClass {
    Satisfied,
    Neutral,
    Frustrated,
    Hostile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSentiment {
    pub classification: SentimentClass,
    pub description: String,
}

/// Event categories the analysis prompt allows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Disclosure,
    OfferNegotiation,
    PaymentSetupAttempt,
    ConsumerFrustrationOrHostility,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampedEvent {
    /// "M:SS" offset into the call
    pub timestamp: String,
    pub event_type: EventType,
    pub description: String,
}

/// Structured call analysis produced by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub payment_attempted: bool,
    pub customer_intent: bool,
    pub customer_sentiment: CustomerSentiment,
    /// 2-3 sentence assessment of the agent
    pub agent_performance: String,
    #[serde(default)]
    pub timestamped_events: Vec<TimestampedEvent>,
}

/// Outcome of the analysis task
///
/// Any JSON document counts as success; `structured` is only filled when the
/// document also matches [`AnalysisResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// The model's JSON document as returned
    pub document: serde_json::Value,
    #[serde(skip)]
    pub structured: Option<AnalysisResult>,
    /// Deviations from the expected structure
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub schema_issues: Vec<String>,
}

impl AnalysisReport {
    pub fn payment_attempted(&self) -> Option<bool> {
        match &self.structured {
            Some(result) => Some(result.payment_attempted),
            None => self.document.get("payment_attempted")?.as_bool(),
        }
    }
}
