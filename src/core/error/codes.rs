use super::ErrorCode;

pub fn all_codes() -> &'static [ErrorCode] {
    &[
        ErrorCode::ConfigMissingKey,
        ErrorCode::ConfigInvalidValue,
        ErrorCode::ValidationInvalidArgument,
        ErrorCode::ValidationInvalidJson,
        ErrorCode::ValidationUnknownErrorCode,
        ErrorCode::CallbackRejected,
        ErrorCode::CallbackTransportFailed,
        ErrorCode::InternalIoError,
        ErrorCode::InternalJsonError,
        ErrorCode::InternalUnexpected,
    ]
}

pub fn parse_code(code: &str) -> Option<ErrorCode> {
    all_codes()
        .iter()
        .copied()
        .find(|candidate| candidate.as_str() == code)
}
