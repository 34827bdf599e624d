use super::{ErrorCode, Hint};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorHelp {
    pub code: String,
    pub summary: String,
    pub details_schema: serde_json::Value,
    pub hints: Vec<Hint>,
}

fn help(
    code: ErrorCode,
    summary: &str,
    details_schema: serde_json::Value,
    hint: &str,
) -> ErrorHelp {
    ErrorHelp {
        code: code.as_str().to_string(),
        summary: summary.to_string(),
        details_schema,
        hints: vec![Hint {
            message: hint.to_string(),
        }],
    }
}

pub fn explain(code: ErrorCode) -> ErrorHelp {
    match code {
        ErrorCode::ConfigMissingKey => help(
            code,
            "Missing required configuration key",
            serde_json::json!({"key":"string","source":"string?"}),
            "Set the key in the environment or pass the matching CLI flag",
        ),
        ErrorCode::ConfigInvalidValue => help(
            code,
            "Configuration value is invalid",
            serde_json::json!({"key":"string","value":"string?","problem":"string"}),
            "DEPLOYMENT_ID must be an integer; BRIDGE_SERVER_URL must be an http(s) URL",
        ),
        ErrorCode::ValidationInvalidArgument => help(
            code,
            "Command argument is invalid",
            serde_json::json!({"field":"string","problem":"string","id":"string?","tried":"string[]?"}),
            "Run the command with --help to see accepted values",
        ),
        ErrorCode::ValidationInvalidJson => help(
            code,
            "Input JSON is invalid",
            serde_json::json!({"error":"string","context":"string?"}),
            "Each event line must be a JSON object with an \"event\" tag",
        ),
        ErrorCode::ValidationUnknownErrorCode => help(
            code,
            "Error code is not recognized",
            serde_json::json!({"code":"string"}),
            "Run 'bridge-callback error' to list known codes",
        ),
        ErrorCode::CallbackRejected => help(
            code,
            "Bridge server answered the callback with a non-200 status",
            serde_json::json!({"url":"string","status":"number","body":"string"}),
            "A 404 usually means the deployment or step does not exist on the bridge server",
        ),
        ErrorCode::CallbackTransportFailed => help(
            code,
            "Callback request could not be delivered",
            serde_json::json!({"url":"string","error":"string","timeout":"boolean"}),
            "Check network reachability of the bridge server",
        ),
        ErrorCode::InternalIoError => help(
            code,
            "Local IO failed",
            serde_json::json!({"error":"string","context":"string?"}),
            "Check file paths and permissions",
        ),
        ErrorCode::InternalJsonError => help(
            code,
            "JSON serialization failed",
            serde_json::json!({"error":"string","context":"string?"}),
            "This is a bug; please report it with the failing input",
        ),
        ErrorCode::InternalUnexpected => help(
            code,
            "Unexpected internal error",
            serde_json::json!({"error":"string"}),
            "This is a bug; please report it",
        ),
    }
}
