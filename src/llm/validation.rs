use serde_json::Value;

use crate::models::{AnalysisResult, ToolInvocationArgs};

const ANALYSIS_FIELDS: [&str; 5] = [
    "payment_attempted",
    "customer_intent",
    "customer_sentiment",
    "agent_performance",
    "timestamped_events",
];

const SENTIMENT_CLASSES: [&str; 4] = ["Satisfied", "Neutral", "Frustrated", "Hostile"];

const EVENT_TYPES: [&str; 4] = [
    "disclosure",
    "offer_negotiation",
    "payment_setup_attempt",
    "consumer_frustration_or_hostility",
];

const OPTIONAL_CREDENTIALS: [&str; 3] = ["cvv", "expiryMonth", "expiryYear"];

/// Check an analysis document against the expected structure
///
/// Never rejects: returns the typed result when the document matches, plus
/// every deviation found.
pub fn check_analysis_document(document: &Value) -> (Option<AnalysisResult>, Vec<String>) {
    let mut issues = Vec::new();

    let Some(obj) = document.as_object() else {
        issues.push("Analysis document is not a JSON object".to_string());
        return (None, issues);
    };

    for field in ANALYSIS_FIELDS {
        if !obj.contains_key(field) {
            issues.push(format!("Missing field `{}`", field));
        }
    }

    if let Some(class) = document
        .pointer("/customer_sentiment/classification")
        .and_then(Value::as_str)
    {
        if !SENTIMENT_CLASSES.contains(&class) {
            issues.push(format!("Unknown sentiment classification `{}`", class));
        }
    }

    if let Some(events) = obj.get("timestamped_events").and_then(Value::as_array) {
        for (i, event) in events.iter().enumerate() {
            if let Some(event_type) = event.get("event_type").and_then(Value::as_str) {
                if !EVENT_TYPES.contains(&event_type) {
                    issues.push(format!("Event {}: unknown event_type `{}`", i, event_type));
                }
            }
            if let Some(ts) = event.get("timestamp").and_then(Value::as_str) {
                if !is_minute_second(ts) {
                    issues.push(format!("Event {}: timestamp `{}` is not M:SS", i, ts));
                }
            }
        }
    }

    match serde_json::from_value::<AnalysisResult>(document.clone()) {
        Ok(result) => (Some(result), issues),
        Err(e) => {
            if issues.is_empty() {
                issues.push(e.to_string());
            }
            (None, issues)
        }
    }
}

/// "M:SS" with any number of minute digits and two second digits below 60
fn is_minute_second(ts: &str) -> bool {
    let Some((minutes, seconds)) = ts.split_once(':') else {
        return false;
    };
    !minutes.is_empty()
        && minutes.chars().all(|c| c.is_ascii_digit())
        && seconds.len() == 2
        && seconds.chars().all(|c| c.is_ascii_digit())
        && seconds < "60"
}

/// Parse and structurally validate the model's tool arguments
pub fn validate_tool_arguments(raw: &str) -> Result<ToolInvocationArgs, Vec<String>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| vec![format!("Tool arguments are not valid JSON: {}", e)])?;

    let mut errors = Vec::new();

    // Optional credentials must be absent rather than null or empty
    if let Some(credentials) = value.get("credentials").and_then(Value::as_object) {
        for key in OPTIONAL_CREDENTIALS {
            match credentials.get(key) {
                Some(Value::Null) => errors.push(format!("credentials.{} is null", key)),
                Some(Value::String(s)) if s.trim().is_empty() => {
                    errors.push(format!("credentials.{} is empty", key))
                }
                _ => {}
            }
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let args: ToolInvocationArgs = serde_json::from_value(value)
        .map_err(|e| vec![format!("Tool arguments do not match schema: {}", e)])?;

    let credentials = &args.credentials;
    if credentials.cardholder_name.trim().is_empty() {
        errors.push("credentials.cardholderName is empty".to_string());
    }
    if credentials.card_number.trim().is_empty() {
        errors.push("credentials.cardNumber is empty".to_string());
    } else if credentials
        .card_number
        .chars()
        .any(|c| c.is_whitespace() || c == '-')
    {
        errors.push("credentials.cardNumber contains separators".to_string());
    }
    if let Some(cvv) = &credentials.cvv {
        if cvv.chars().any(char::is_whitespace) {
            errors.push("credentials.cvv contains whitespace".to_string());
        }
    }
    if !args.amount.is_finite() {
        errors.push("amount is not a finite number".to_string());
    }

    if errors.is_empty() {
        Ok(args)
    } else {
        Err(errors)
    }
}
