use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Seat unavailable: {0}")]
    SeatUnavailable(String),

    #[error("Invalid seat: {0}")]
    InvalidSeat(String),

    #[error("Showtime not bookable: {0}")]
    ShowtimeNotBookable(String),

    #[error("Invalid promo code: {0}")]
    InvalidPromoCode(String),

    #[error("Illegal transition: {0}")]
    IllegalTransition(String),

    #[error("Booking not confirmed: {0}")]
    NotConfirmed(String),

    #[error("Already checked in: {0}")]
    AlreadyCheckedIn(String),

    #[error("Payment signature mismatch: {0}")]
    SignatureMismatch(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::SeatUnavailable(_)
            | AppError::InvalidSeat(_)
            | AppError::ShowtimeNotBookable(_)
            | AppError::InvalidPromoCode(_)
            | AppError::IllegalTransition(_)
            | AppError::NotConfirmed(_)
            | AppError::AlreadyCheckedIn(_) => StatusCode::CONFLICT,
            AppError::SignatureMismatch(_) => StatusCode::BAD_REQUEST,
            AppError::ExternalServiceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) => "AUTH_ERROR",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::SeatUnavailable(_) => "SEAT_UNAVAILABLE",
            AppError::InvalidSeat(_) => "INVALID_SEAT",
            AppError::ShowtimeNotBookable(_) => "SHOWTIME_NOT_BOOKABLE",
            AppError::InvalidPromoCode(_) => "INVALID_PROMO_CODE",
            AppError::IllegalTransition(_) => "ILLEGAL_TRANSITION",
            AppError::NotConfirmed(_) => "NOT_CONFIRMED",
            AppError::AlreadyCheckedIn(_) => "ALREADY_CHECKED_IN",
            AppError::SignatureMismatch(_) => "SIGNATURE_MISMATCH",
            AppError::ExternalServiceError(_) => "EXTERNAL_SERVICE_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn log(&self) {
        match self {
            // Expected outcomes of racing buyers; noisy at error level
            AppError::SeatUnavailable(msg)
            | AppError::InvalidSeat(msg)
            | AppError::ShowtimeNotBookable(msg)
            | AppError::InvalidPromoCode(msg)
            | AppError::IllegalTransition(msg)
            | AppError::NotConfirmed(msg)
            | AppError::AlreadyCheckedIn(msg) => {
                warn!(error = ?self, message = %msg, "Booking conflict rejected");
            }
            AppError::SignatureMismatch(msg) => {
                error!(error = ?self, message = %msg, "Payment signature verification failed");
            }
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::ExternalServiceError(msg)
            | AppError::InternalServerError(msg) => {
                error!(error = ?self, message = %msg, "Application error");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Only expose high-level message to the client
        let public_message = match &self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::SeatUnavailable(msg)
            | AppError::InvalidSeat(msg)
            | AppError::ShowtimeNotBookable(msg)
            | AppError::InvalidPromoCode(msg)
            | AppError::IllegalTransition(msg)
            | AppError::NotConfirmed(msg)
            | AppError::AlreadyCheckedIn(msg)
            | AppError::ExternalServiceError(msg)
            | AppError::InternalServerError(msg) => msg.clone(),
            AppError::SignatureMismatch(_) => "Payment verification failed".to_string(),
        };

        // Do not expose internal details in the API response
        let details = None;

        error_response(code, public_message, details, status)
    }
}
