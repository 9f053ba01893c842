use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use super::app_error::AppError;

/// Body of every non-2xx response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorPayload {
    pub message: String,
    /// HTTP status code
    pub code: u16,
    /// e.g. `NOT_FOUND`, `MALFORMED_DOCUMENT`
    pub r#type: String,
    /// Set for errors tied to one stored entity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&AppError> for ErrorPayload {
    fn from(error: &AppError) -> Self {
        let details = match error {
            AppError::MalformedDocument { key, reason } => {
                Some(json!({ "entityKey": key, "reason": reason }))
            }
            _ => None,
        };

        ErrorPayload {
            message: error.to_string(),
            code: error.code().as_u16(),
            r#type: error.error_type(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_documents_name_the_entity() {
        let error = AppError::MalformedDocument {
            key: "0xabc".into(),
            reason: "missing field `leaderboard`".into(),
        };
        let payload = ErrorPayload::from(&error);

        assert_eq!(payload.code, 422);
        assert_eq!(payload.r#type, "MALFORMED_DOCUMENT");
        assert_eq!(payload.details.unwrap()["entityKey"], "0xabc");
    }

    #[test]
    fn other_errors_omit_details() {
        let payload = ErrorPayload::from(&AppError::NotFound("No valid leaderboard data found".into()));
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["code"], 404);
        assert_eq!(json["message"], "No valid leaderboard data found");
        assert!(json.get("details").is_none());
    }
}
