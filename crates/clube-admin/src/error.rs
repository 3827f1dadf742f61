use crate::config::ConfigError;
use crate::gateway::GatewayError;
use crate::messaging::MessagingError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Failures surfaced by the decision services.
///
/// A `DataAccess` error is never folded into a denial or an empty tally: callers
/// must be able to tell "lookup failed" apart from "access refused".
#[derive(Debug, thiserror::Error)]
pub enum ClubError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
    #[error("data access failed: {cause}")]
    DataAccess { cause: String },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid input: {0}")]
    Validation(String),
}

impl ClubError {
    /// Maps an empty single-row lookup onto the entity that was being resolved.
    pub fn lookup(entity: &'static str, id: &str) -> impl FnOnce(GatewayError) -> ClubError {
        let id = id.to_string();
        move |err| match err {
            GatewayError::NotFound { .. } => ClubError::NotFound { entity, id },
            other => ClubError::from(other),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ClubError::NotFound { .. } => StatusCode::NOT_FOUND,
            ClubError::DataAccess { .. } => StatusCode::BAD_GATEWAY,
            ClubError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            ClubError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl From<GatewayError> for ClubError {
    fn from(value: GatewayError) -> Self {
        match value {
            GatewayError::NotFound { table } => ClubError::NotFound {
                entity: table,
                id: "<query>".to_string(),
            },
            GatewayError::DataAccess { cause } => ClubError::DataAccess { cause },
        }
    }
}

impl IntoResponse for ClubError {
    fn into_response(self) -> Response {
        let kind = match &self {
            ClubError::NotFound { .. } => "not_found",
            ClubError::DataAccess { .. } => "data_access",
            ClubError::Configuration(_) => "configuration",
            ClubError::Validation(_) => "validation",
        };
        let body = Json(json!({ "error": self.to_string(), "kind": kind }));
        (self.status_code(), body).into_response()
    }
}

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Club(ClubError),
    Messaging(MessagingError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Club(err) => write!(f, "{}", err),
            AppError::Messaging(err) => write!(f, "messaging error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Club(err) => Some(err),
            AppError::Messaging(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Club(err) => err.into_response(),
            AppError::Messaging(err) => err.into_response(),
            other => {
                let body = Json(json!({ "error": other.to_string() }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ClubError> for AppError {
    fn from(value: ClubError) -> Self {
        Self::Club(value)
    }
}

impl From<GatewayError> for AppError {
    fn from(value: GatewayError) -> Self {
        Self::Club(value.into())
    }
}

impl From<MessagingError> for AppError {
    fn from(value: MessagingError) -> Self {
        Self::Messaging(value)
    }
}
