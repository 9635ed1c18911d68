use crate::models::delivery::DeliveryState;
use error_types::{error_codes, error_types as kinds, ErrorResponse};
use thiserror::Error;
use uuid::Uuid;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error, Clone)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("forbidden")]
    Forbidden,

    #[error("conversation {conversation_id} not found")]
    ConversationNotFound { conversation_id: Uuid },

    #[error("message {message_id} not found")]
    MessageNotFound { message_id: Uuid },

    #[error("no delivery record for message {message_id} and recipient {recipient_id}")]
    RecordNotFound {
        message_id: Uuid,
        recipient_id: Uuid,
    },

    #[error("invalid transition: delivery state may not move from {from} to {to}")]
    InvalidTransition {
        from: DeliveryState,
        to: DeliveryState,
    },

    #[error("sender {user_id} listed as recipient of message {message_id}")]
    DuplicateRecipient { message_id: Uuid, user_id: Uuid },

    #[error("conversation {conversation_id} has no addressable recipients")]
    EmptyParticipantSet { conversation_id: Uuid },

    #[error("user {user_id} is not a member of conversation {conversation_id}")]
    NotConversationMember {
        conversation_id: Uuid,
        user_id: Uuid,
    },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("queue error: {0}")]
    Queue(String),

    #[error("internal server error")]
    Internal,
}

impl From<redis::RedisError> for AppError {
    fn from(e: redis::RedisError) -> Self {
        AppError::Queue(e.to_string())
    }
}

impl AppError {
    /// Returns HTTP status code for the presentation layer
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::BadRequest(_) | AppError::EmptyParticipantSet { .. } => 400,
            AppError::Forbidden | AppError::NotConversationMember { .. } => 403,
            AppError::ConversationNotFound { .. }
            | AppError::MessageNotFound { .. }
            | AppError::RecordNotFound { .. } => 404,
            AppError::InvalidTransition { .. } | AppError::Conflict(_) => 409,
            AppError::Queue(_) => 503,
            AppError::Config(_) | AppError::DuplicateRecipient { .. } | AppError::Internal => 500,
        }
    }

    /// Stable error code for client localization and tracking
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => error_codes::CONFIG_ERROR,
            AppError::BadRequest(_) => error_codes::BAD_REQUEST,
            AppError::EmptyParticipantSet { .. } => error_codes::EMPTY_PARTICIPANT_SET,
            AppError::Forbidden => error_codes::FORBIDDEN,
            AppError::ConversationNotFound { .. } => error_codes::CONVERSATION_NOT_FOUND,
            AppError::MessageNotFound { .. } => error_codes::MESSAGE_NOT_FOUND,
            AppError::RecordNotFound { .. } => error_codes::RECORD_NOT_FOUND,
            AppError::InvalidTransition { .. } => error_codes::INVALID_TRANSITION,
            AppError::DuplicateRecipient { .. } => error_codes::DUPLICATE_RECIPIENT,
            AppError::NotConversationMember { .. } => error_codes::NOT_CONVERSATION_MEMBER,
            AppError::Conflict(_) => error_codes::DELIVERY_CONFLICT,
            AppError::Queue(_) => error_codes::QUEUE_ERROR,
            AppError::Internal => error_codes::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self.status_code() {
            400 => kinds::VALIDATION_ERROR,
            403 => kinds::AUTHORIZATION_ERROR,
            404 => kinds::NOT_FOUND_ERROR,
            409 => kinds::CONFLICT_ERROR,
            503 => kinds::SERVICE_UNAVAILABLE_ERROR,
            _ => kinds::SERVER_ERROR,
        }
    }

    /// Serialize into the shared API error envelope
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse::new(
            self.error_type(),
            &self.to_string(),
            self.status_code(),
            self.error_type(),
            self.error_code(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let err = AppError::RecordNotFound {
            message_id: Uuid::new_v4(),
            recipient_id: Uuid::new_v4(),
        };
        assert_eq!(err.status_code(), 404);

        let err = AppError::InvalidTransition {
            from: DeliveryState::Delivered,
            to: DeliveryState::Sent,
        };
        assert_eq!(err.status_code(), 409);

        let err = AppError::DuplicateRecipient {
            message_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
        };
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_to_response_carries_stable_code() {
        let err = AppError::EmptyParticipantSet {
            conversation_id: Uuid::new_v4(),
        };
        let response = err.to_response();
        assert_eq!(response.status, 400);
        assert_eq!(response.code, error_codes::EMPTY_PARTICIPANT_SET);
    }
}
