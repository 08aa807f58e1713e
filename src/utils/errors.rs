use crate::api::ApiError;

/// Extract clean error message from database error strings
///
/// "error returned from database: 1406 (22001): Data too long for column 'pref_value'"
/// becomes "Data too long for column 'pref_value'"
pub fn extract_clean_error(error_msg: &str) -> String {
    if error_msg.contains("error returned from database:") {
        if let Some(last_colon) = error_msg.rfind(": ") {
            return error_msg[last_colon + 2..].trim().to_string();
        }
    }
    error_msg.to_string()
}

/// User-facing text for a prediction backend failure
///
/// Server-provided messages are shown as-is; transport failures get a hint
/// that the backend may be down.
pub fn api_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Server { message, .. } if err.status().is_some_and(|s| s >= 500) => {
            format!("⚠️ **Prediction service error**: {}", message)
        }
        ApiError::Server { message, .. } => format!("❌ {}", message),
        ApiError::Request(detail) => format!("⚠️ **Prediction service unreachable**: {}", detail),
        other => format!("❌ {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_prefix_is_removed() {
        assert_eq!(
            extract_clean_error("error returned from database: 1406 (22001): Data too long"),
            "Data too long"
        );
        assert_eq!(extract_clean_error("plain failure"), "plain failure");
    }

    #[test]
    fn test_server_message_is_preferred() {
        let err = ApiError::Server { status: 400, message: "Invalid interval".to_string() };
        assert_eq!(api_error_message(&err), "❌ Invalid interval");
        assert_eq!(
            api_error_message(&ApiError::EmptyPredictions),
            "❌ Invalid prediction data: predictions array missing or empty"
        );
        assert!(api_error_message(&ApiError::Request("timed out".into())).contains("timed out"));

        let err = ApiError::Server { status: 503, message: "Model is loading".to_string() };
        assert_eq!(api_error_message(&err), "⚠️ **Prediction service error**: Model is loading");
    }
}
