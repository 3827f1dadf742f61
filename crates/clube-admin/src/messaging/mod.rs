//! Outbound WhatsApp messages, relayed through the club web app which owns
//! the provider credentials.

mod http;
pub mod router;

pub use http::HttpMessageGateway;
pub use router::messaging_router;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const MIN_PHONE_DIGITS: usize = 10;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MessagingError {
    #[error("invalid message: {0}")]
    Validation(String),
    #[error("message provider returned {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("message relay unreachable: {0}")]
    Transport(String),
}

impl IntoResponse for MessagingError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            MessagingError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation"),
            MessagingError::Rejected { .. } => (StatusCode::BAD_GATEWAY, "rejected"),
            MessagingError::Transport(_) => (StatusCode::BAD_GATEWAY, "transport"),
        };
        let body = Json(json!({ "error": self.to_string(), "kind": kind }));
        (status, body).into_response()
    }
}

/// A text message addressed to a phone number with country and area code.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutgoingMessage {
    pub phone: String,
    pub message: String,
}

impl OutgoingMessage {
    /// Keeps only the digits of the phone and rejects empty text.
    pub fn validated(self) -> Result<Self, MessagingError> {
        let phone: String = self.phone.chars().filter(char::is_ascii_digit).collect();
        if phone.len() < MIN_PHONE_DIGITS {
            return Err(MessagingError::Validation(format!(
                "phone '{}' needs at least {MIN_PHONE_DIGITS} digits including area code",
                self.phone
            )));
        }
        if self.message.trim().is_empty() {
            return Err(MessagingError::Validation(
                "message must not be empty".to_string(),
            ));
        }
        Ok(Self {
            phone,
            message: self.message,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delivery {
    pub phone: String,
    /// Whatever the relay answered, passed through untouched.
    pub provider_response: Value,
}

#[async_trait]
pub trait MessageGateway: Send + Sync {
    async fn send_text(&self, message: &OutgoingMessage) -> Result<Delivery, MessagingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(phone: &str, text: &str) -> OutgoingMessage {
        OutgoingMessage {
            phone: phone.to_string(),
            message: text.to_string(),
        }
    }

    #[test]
    fn phone_is_reduced_to_digits() {
        let validated = message("+55 (16) 99999-9999", "Olá")
            .validated()
            .expect("valid message");
        assert_eq!(validated.phone, "5516999999999");
    }

    #[test]
    fn short_phones_and_blank_text_are_rejected() {
        assert!(matches!(
            message("9999-9999", "Olá").validated(),
            Err(MessagingError::Validation(_))
        ));
        assert!(matches!(
            message("5516999999999", "   ").validated(),
            Err(MessagingError::Validation(_))
        ));
    }

    #[test]
    fn errors_map_to_http_statuses() {
        let rejected = MessagingError::Rejected {
            status: 401,
            body: "invalid token".to_string(),
        };
        assert_eq!(rejected.into_response().status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            MessagingError::Validation("x".to_string())
                .into_response()
                .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
