use crate::llm::{FunctionDefinition, ToolDefinition};
use crate::models::FailureReason;

/// Name of the single tool advertised to the model
pub const VALIDATE_PAYMENT_TOOL: &str = "validate_payment_api_call";

/// Tool definition whose parameters mirror `ToolInvocationArgs`
pub fn validate_payment_tool() -> ToolDefinition {
    let reasons: Vec<&str> = FailureReason::ALL.iter().map(|r| r.as_str()).collect();

    ToolDefinition {
        tool_type: "function".to_string(),
        function: FunctionDefinition {
            name: VALIDATE_PAYMENT_TOOL.to_string(),
            description: "Validates the extracted payment credentials by calling the external payment verification API.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "transcript_id": {"type": "string"},
                    "payment_valid": {"type": "boolean"},
                    "failure_reason": {
                        "type": "string",
                        "enum": reasons
                    },
                    "credentials": {
                        "type": "object",
                        "properties": {
                            "cardholderName": {"type": "string"},
                            "cardNumber": {"type": "string"},
                            "cvv": {"type": "string"},
                            "expiryMonth": {"type": "integer"},
                            "expiryYear": {"type": "integer"}
                        },
                        "required": ["cardholderName", "cardNumber"]
                    },
                    "amount": {"type": "number"}
                },
                "required": ["transcript_id", "payment_valid", "failure_reason", "credentials", "amount"]
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_schema_shape() {
        let tool = validate_payment_tool();
        let json = serde_json::to_value(&tool).unwrap();

        assert_eq!(json["type"], "function");
        assert_eq!(json["function"]["name"], VALIDATE_PAYMENT_TOOL);

        let params = &json["function"]["parameters"];
        assert_eq!(params["required"].as_array().unwrap().len(), 5);
        assert_eq!(params["properties"]["failure_reason"]["enum"].as_array().unwrap().len(), 9);
        assert_eq!(
            params["properties"]["credentials"]["required"],
            serde_json::json!(["cardholderName", "cardNumber"])
        );
    }
}
