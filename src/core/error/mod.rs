use serde::{Deserialize, Serialize};
use serde_json::Value;

mod codes;
mod help;

pub use codes::{all_codes, parse_code};
pub use help::{explain, ErrorHelp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigMissingKey,
    ConfigInvalidValue,

    ValidationInvalidArgument,
    ValidationInvalidJson,
    ValidationUnknownErrorCode,

    CallbackRejected,
    CallbackTransportFailed,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigMissingKey => "config.missing_key",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",
            ErrorCode::ValidationInvalidJson => "validation.invalid_json",
            ErrorCode::ValidationUnknownErrorCode => "validation.unknown_error_code",

            ErrorCode::CallbackRejected => "callback.rejected",
            ErrorCode::CallbackTransportFailed => "callback.transport_failed",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMissingKeyDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tried: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackRejectedDetails {
    pub url: String,
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackTransportDetails {
    pub url: String,
    pub error: String,
    pub timeout: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    pub retryable: Option<bool>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            retryable: None,
        }
    }

    pub fn config_missing_key(key: impl Into<String>, source: Option<String>) -> Self {
        let details = to_details(ConfigMissingKeyDetails {
            key: key.into(),
            source,
        });

        Self::new(
            ErrorCode::ConfigMissingKey,
            "Missing required configuration key",
            details,
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = to_details(ConfigInvalidValueDetails {
            key: key.into(),
            value,
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            details,
        )
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        id: Option<String>,
        tried: Option<Vec<String>>,
    ) -> Self {
        let details = to_details(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
            id,
            tried,
        });

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    pub fn validation_invalid_json(err: serde_json::Error, context: Option<String>) -> Self {
        let details = serde_json::json!({
            "error": err.to_string(),
            "context": context,
        });

        Self::new(ErrorCode::ValidationInvalidJson, "Invalid JSON", details)
    }

    pub fn validation_unknown_error_code(code: impl Into<String>) -> Self {
        let code = code.into();
        Self::new(
            ErrorCode::ValidationUnknownErrorCode,
            format!("Unknown error code '{}'", code),
            serde_json::json!({ "code": code }),
        )
        .with_hint("Run 'bridge-callback error' to list known codes")
    }

    pub fn callback_rejected(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        let details = to_details(CallbackRejectedDetails {
            url: url.into(),
            status,
            body: body.into(),
        });

        let mut err = Self::new(
            ErrorCode::CallbackRejected,
            format!("Bridge server rejected callback: HTTP {}", status),
            details,
        );
        err.retryable = Some(status >= 500);
        err
    }

    pub fn callback_transport(url: impl Into<String>, err: &reqwest::Error) -> Self {
        let details = to_details(CallbackTransportDetails {
            url: url.into(),
            error: err.to_string(),
            timeout: err.is_timeout(),
        });

        let mut out = Self::new(
            ErrorCode::CallbackTransportFailed,
            format!("Callback request failed: {}", err),
            details,
        );
        out.retryable = Some(true);
        out.with_hint("Check that BRIDGE_SERVER_URL points at a reachable bridge server")
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalIoErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalJsonErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_rejected_is_retryable_only_for_server_errors() {
        let err = Error::callback_rejected("http://bridge/api/v1/infra/callback", 503, "busy");
        assert_eq!(err.code, ErrorCode::CallbackRejected);
        assert_eq!(err.retryable, Some(true));
        assert_eq!(err.details["status"], 503);

        let err = Error::callback_rejected("http://bridge/api/v1/infra/callback", 404, "missing");
        assert_eq!(err.retryable, Some(false));
        assert_eq!(err.details["body"], "missing");
    }

    #[test]
    fn config_invalid_value_carries_key_and_problem() {
        let err = Error::config_invalid_value("DEPLOYMENT_ID", Some("abc".into()), "not an integer");
        assert_eq!(err.code.as_str(), "config.invalid_value");
        assert_eq!(err.details["key"], "DEPLOYMENT_ID");
        assert_eq!(err.details["value"], "abc");
    }

    #[test]
    fn unknown_error_code_has_hint() {
        let err = Error::validation_unknown_error_code("nope.nope");
        assert_eq!(err.hints.len(), 1);
        assert!(err.message.contains("nope.nope"));
    }
}
