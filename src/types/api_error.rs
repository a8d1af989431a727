//! Standard error body returned by the gateway on any non-2xx response.

use serde::{Deserialize, Serialize};

/// `{ code, message, details? }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Machine-readable code such as `"UNAUTHORIZED"` or `"VALIDATION_FAILED"`.
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ApiError {
    /// Parse a raw response body. Bodies that do not match the standard shape yield `None`;
    /// the caller keeps the raw text either way.
    pub fn from_body(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    pub fn detail(&self, key: &str) -> Option<&serde_json::Value> {
        self.details.as_ref().and_then(|d| d.get(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_standard_shape_with_details() {
        let body = r#"{"code":"VALIDATION_FAILED","message":"bad input","details":{"field":"name"}}"#;
        let err = ApiError::from_body(body).unwrap();
        assert_eq!(err.code, "VALIDATION_FAILED");
        assert_eq!(err.message, "bad input");
        assert_eq!(err.detail("field"), Some(&serde_json::json!("name")));
    }

    #[test]
    fn test_details_are_optional() {
        let err = ApiError::from_body(r#"{"code":"INTERNAL","message":"boom"}"#).unwrap();
        assert!(err.details.is_none());
        let json = serde_json::to_value(&err).unwrap();
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_non_matching_bodies_are_rejected() {
        assert!(ApiError::from_body("").is_none());
        assert!(ApiError::from_body("<html>502</html>").is_none());
        assert!(ApiError::from_body(r#"{"error":{"message":"x"}}"#).is_none());
    }
}
