use crate::models::FailureReason;

/// Build the single user message for the call analysis task
pub fn build_analysis_prompt(transcript: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("Analyze the following call transcript and extract the required information.\n\n");

    prompt.push_str("**CRITICAL INSTRUCTIONS:**\n");
    prompt.push_str("1. For the `agent_performance` field, provide a detailed assessment of 2-3 sentences. ");
    prompt.push_str("You MUST consider the agent's professionalism, patience, problem-solving skills, and communication clarity.\n");
    prompt.push_str("2. The timestamp for events MUST be in the \"M:SS\" format (e.g., \"0:45\", \"2:15\").\n");
    prompt.push_str("3. Your response MUST be a single, valid JSON object and nothing else.\n");
    prompt.push_str("4. Do NOT include any explanatory text, conversational wrappers, or markdown formatting like ```json.\n\n");

    prompt.push_str("**Transcript:**\n");
    prompt.push_str(transcript);
    prompt.push_str("\n\n");

    prompt.push_str("**Required JSON Structure:**\n");
    prompt.push_str(ANALYSIS_STRUCTURE);

    prompt
}

const ANALYSIS_STRUCTURE: &str = r#"{
  "payment_attempted": <Boolean>,
  "customer_intent": <Boolean>,
  "customer_sentiment": {
    "classification": "<"Satisfied"|"Neutral"|"Frustrated"|"Hostile">",
    "description": "<String>"
  },
  "agent_performance": "<A detailed 2-3 sentence assessment of the agent's performance>",
  "timestamped_events": [
    {
      "timestamp": "M:SS",
      "event_type": "<'disclosure'|'offer_negotiation'|'payment_setup_attempt'|'consumer_frustration_or_hostility'>",
      "description": "<String>"
    }
  ]
}
"#;

/// System prompt for the payment extraction task
pub fn build_payment_system_prompt() -> String {
    let reasons: Vec<String> = FailureReason::ALL
        .iter()
        .filter(|r| **r != FailureReason::None)
        .map(|r| format!("'{}'", r))
        .collect();

    format!(
        r#"You are an expert assistant extracting payment credential details from a call transcript with complete accuracy, then calling the payment validation tool.

CRITICAL DATA FORMATTING RULES:
1. Convert words to digits: every number spoken as words MUST be written as digits.
2. No dashes or spaces: card numbers must be a continuous string of digits.
3. Monetary values: the `amount` field must be a number. You MUST include cents as a decimal.
4. CVV is a string: the `cvv` code MUST be a string (e.g., "852").

CRITICAL LOGIC FOR MISSING DATA:
- The `credentials` object MUST contain `cardholderName` and `cardNumber`.
- If `cardholderName` or `cardNumber` is not mentioned in the transcript, use the string "N/A" as a placeholder.
- For the optional fields `cvv`, `expiryMonth` and `expiryYear`, if they are not mentioned, omit them entirely from the `credentials` object. Never send null or an empty string.

PROCESS:
1. Read the transcript and apply all formatting and missing-data rules.
2. Determine the `failure_reason`. If no payment attempt was made or details were refused, use 'invalid_args'. If an attempt was made with flawed data, use the specific reason (e.g., 'invalid_card_length').
3. Construct the tool call.

FAILURE REASONS (use only these):
{}. If no failure is apparent, use 'none'."#,
        reasons.join(", ")
    )
}

/// User message for the payment extraction task
pub fn build_payment_user_prompt(transcript_id: &str, transcript: &str) -> String {
    format!(
        "The transcript ID is '{}'.\n\nTranscript:\n{}",
        transcript_id, transcript
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_prompt_embeds_transcript() {
        let prompt = build_analysis_prompt("agent: hello\ncustomer: hi");
        assert!(prompt.contains("agent: hello\ncustomer: hi"));
        assert!(prompt.contains("\"M:SS\""));
        assert!(prompt.contains("\"payment_attempted\""));
        assert!(prompt.contains("consumer_frustration_or_hostility"));
    }

    #[test]
    fn test_payment_system_prompt_lists_every_reason() {
        let prompt = build_payment_system_prompt();
        for reason in FailureReason::ALL {
            assert!(prompt.contains(reason.as_str()), "missing {}", reason);
        }
        assert!(prompt.contains("\"N/A\""));
    }

    #[test]
    fn test_payment_user_prompt() {
        let prompt = build_payment_user_prompt("call_7", "agent: hi");
        assert_eq!(prompt, "The transcript ID is 'call_7'.\n\nTranscript:\nagent: hi");
    }
}
