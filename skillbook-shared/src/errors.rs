use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{service}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Booking errors
/// - E2xxx: Payment errors
/// - E3xxx: Classroom errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    BadRequest,
    ServiceUnavailable,
    UpstreamTimeout,

    // Booking (E1xxx)
    TeacherNotFound,
    LearnerNotFound,
    BookingNotFound,
    SlotUnavailable,
    SlotTakenAfterPayment,
    InvalidTimeFormat,
    InvalidAvailabilityWindow,
    AvailabilityRuleNotFound,
    AvailabilityExceptionNotFound,
    DateOutOfHorizon,

    // Payment (E2xxx)
    PaymentOrderFailed,
    PaymentVerificationFailed,
    PaymentGatewayUnavailable,

    // Classroom (E3xxx)
    ClassNotFound,
    ClassNotStarted,
    NotClassParticipant,
    RoomProvisionFailed,
    BookingNotSynced,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::BadRequest => "E0006",
            Self::ServiceUnavailable => "E0007",
            Self::UpstreamTimeout => "E0008",

            // Booking
            Self::TeacherNotFound => "E1001",
            Self::LearnerNotFound => "E1002",
            Self::BookingNotFound => "E1003",
            Self::SlotUnavailable => "E1004",
            Self::SlotTakenAfterPayment => "E1005",
            Self::InvalidTimeFormat => "E1006",
            Self::InvalidAvailabilityWindow => "E1007",
            Self::AvailabilityRuleNotFound => "E1008",
            Self::AvailabilityExceptionNotFound => "E1009",
            Self::DateOutOfHorizon => "E1010",

            // Payment
            Self::PaymentOrderFailed => "E2001",
            Self::PaymentVerificationFailed => "E2002",
            Self::PaymentGatewayUnavailable => "E2003",

            // Classroom
            Self::ClassNotFound => "E3001",
            Self::ClassNotStarted => "E3002",
            Self::NotClassParticipant => "E3003",
            Self::RoomProvisionFailed => "E3004",
            Self::BookingNotSynced => "E3005",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError | Self::RoomProvisionFailed => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable | Self::PaymentGatewayUnavailable => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::ValidationError | Self::BadRequest | Self::InvalidTimeFormat
            | Self::InvalidAvailabilityWindow | Self::DateOutOfHorizon
            | Self::PaymentOrderFailed => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::TeacherNotFound | Self::LearnerNotFound
            | Self::BookingNotFound | Self::AvailabilityRuleNotFound
            | Self::AvailabilityExceptionNotFound | Self::ClassNotFound
            | Self::ClassNotStarted | Self::BookingNotSynced => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::NotClassParticipant => StatusCode::FORBIDDEN,
            Self::SlotUnavailable | Self::SlotTakenAfterPayment => StatusCode::CONFLICT,
            Self::PaymentVerificationFailed => StatusCode::PAYMENT_REQUIRED,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Upstream HTTP failure, distinguishing timeouts from other transport
    /// errors so callers can surface them separately.
    pub fn upstream(err: reqwest::Error, gateway: &str) -> Self {
        if err.is_timeout() {
            Self::new(
                ErrorCode::UpstreamTimeout,
                format!("{gateway} request timed out"),
            )
        } else {
            Self::new(
                ErrorCode::ServiceUnavailable,
                format!("{gateway} request failed: {err}"),
            )
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message, details } => {
                let status = code.status_code();
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                (status, resp)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                match err {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        ApiErrorResponse::new("E0003", "resource not found"),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new("E0001", "database error"),
                    ),
                }
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new("E0002", msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_codes_map_to_409() {
        assert_eq!(
            ErrorCode::SlotTakenAfterPayment.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(ErrorCode::SlotUnavailable.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn upstream_timeout_is_a_gateway_timeout() {
        assert_eq!(
            ErrorCode::UpstreamTimeout.status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn failed_verification_is_payment_required() {
        assert_eq!(
            ErrorCode::PaymentVerificationFailed.status_code(),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(ErrorCode::PaymentVerificationFailed.code(), "E2002");
    }

    #[test]
    fn known_errors_keep_their_code_string() {
        let err = AppError::new(ErrorCode::ClassNotStarted, "not yet");
        match err {
            AppError::Known { code, .. } => assert_eq!(code.code(), "E3002"),
            _ => panic!("expected a known error"),
        }
    }
}
