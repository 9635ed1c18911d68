use serde::{Deserialize, Serialize};

/// Unified API error response format consumed by the presentation layer.
///
/// The delivery core has no wire protocol of its own; whatever renders REST or
/// WebSocket responses serializes errors through this envelope so clients see
/// one stable shape across services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error title
    pub error: String,

    /// User-facing message
    pub message: String,

    /// HTTP status code
    pub status: u16,

    /// Error type used for client-side routing
    /// Possible values:
    /// - "validation_error" - input validation failed
    /// - "authorization_error" - caller lacks permission
    /// - "not_found_error" - resource does not exist
    /// - "conflict_error" - state conflict (e.g. regression request)
    /// - "server_error" - internal failure
    /// - "service_unavailable_error" - dependency unavailable
    pub error_type: String,

    /// Stable error code for client localization and tracking,
    /// e.g. "RECORD_NOT_FOUND", "INVALID_TRANSITION"
    pub code: String,

    /// Optional detail, only populated in development environments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// Request trace id for log correlation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,

    /// ISO 8601 timestamp
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str, status: u16, error_type: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status,
            error_type: error_type.to_string(),
            code: code.to_string(),
            details: None,
            trace_id: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_trace_id(mut self, trace_id: String) -> Self {
        self.trace_id = Some(trace_id);
        self
    }
}

/// Stable error codes for the delivery domain
pub mod error_codes {
    // Delivery tracking
    pub const RECORD_NOT_FOUND: &str = "RECORD_NOT_FOUND";
    pub const INVALID_TRANSITION: &str = "INVALID_TRANSITION";
    pub const DUPLICATE_RECIPIENT: &str = "DUPLICATE_RECIPIENT";
    pub const EMPTY_PARTICIPANT_SET: &str = "EMPTY_PARTICIPANT_SET";
    pub const DELIVERY_CONFLICT: &str = "DELIVERY_CONFLICT";

    // Messaging
    pub const CONVERSATION_NOT_FOUND: &str = "CONVERSATION_NOT_FOUND";
    pub const MESSAGE_NOT_FOUND: &str = "MESSAGE_NOT_FOUND";
    pub const NOT_CONVERSATION_MEMBER: &str = "NOT_CONVERSATION_MEMBER";

    // Request validation
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const FORBIDDEN: &str = "FORBIDDEN";

    // System
    pub const QUEUE_ERROR: &str = "QUEUE_ERROR";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
}

/// Standard error types
pub mod error_types {
    pub const VALIDATION_ERROR: &str = "validation_error";
    pub const AUTHORIZATION_ERROR: &str = "authorization_error";
    pub const NOT_FOUND_ERROR: &str = "not_found_error";
    pub const CONFLICT_ERROR: &str = "conflict_error";
    pub const SERVER_ERROR: &str = "server_error";
    pub const SERVICE_UNAVAILABLE_ERROR: &str = "service_unavailable_error";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_creation() {
        let error = ErrorResponse::new(
            "Not Found",
            "delivery record not found",
            404,
            error_types::NOT_FOUND_ERROR,
            error_codes::RECORD_NOT_FOUND,
        );

        assert_eq!(error.status, 404);
        assert_eq!(error.error_type, error_types::NOT_FOUND_ERROR);
        assert_eq!(error.code, error_codes::RECORD_NOT_FOUND);
    }

    #[test]
    fn test_error_response_with_details() {
        let error = ErrorResponse::new(
            "Conflict",
            "delivery state may not move backwards",
            409,
            error_types::CONFLICT_ERROR,
            error_codes::INVALID_TRANSITION,
        )
        .with_details("requested 'sent' while record is at 'delivered'".to_string());

        assert!(error.details.is_some());
    }
}
