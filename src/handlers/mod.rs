use axum::extract::{Path, State};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Booking, BookingStatus};
use crate::routes::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

/// Identity supplied by the external auth boundary. This service trusts the
/// headers; token validation happened upstream.
#[derive(Debug, Clone, Copy)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok())
            .ok_or_else(|| {
                AppError::AuthError("Missing or invalid x-user-id header".to_string())
            })?;

        let role = match parts.headers.get("x-user-role").and_then(|v| v.to_str().ok()) {
            Some("admin") => Role::Admin,
            _ => Role::User,
        };

        Ok(Principal { user_id, role })
    }
}

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "boxoffice-api",
    };

    success(payload, "Health check successful").into_response()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BookingPayload {
    id: Uuid,
    booking_ref_id: Option<String>,
    showtime_id: Uuid,
    seats: Vec<String>,
    status: BookingStatus,
    original_amount: Decimal,
    discount_amount: Decimal,
    total_amount: Decimal,
    promo_code: Option<String>,
    is_checked_in: bool,
    created_at: DateTime<Utc>,
}

impl From<Booking> for BookingPayload {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            booking_ref_id: booking.booking_ref_id,
            showtime_id: booking.showtime_id,
            seats: booking.seats,
            status: booking.status,
            original_amount: booking.original_amount,
            discount_amount: booking.discount_amount,
            total_amount: booking.total_amount,
            promo_code: booking.promo_code,
            is_checked_in: booking.is_checked_in,
            created_at: booking.created_at,
        }
    }
}

pub async fn get_seat_map(
    State(state): State<AppState>,
    Path(showtime_id): Path<Uuid>,
    viewer: Option<Principal>,
) -> Result<Response, AppError> {
    let view = state
        .seat_maps
        .seat_map(showtime_id, viewer.map(|p| p.user_id))?;
    Ok(success(view, "Seat map fetched").into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    showtime_id: Uuid,
    seats: Vec<String>,
    promo_code: Option<String>,
}

pub async fn create_booking(
    State(state): State<AppState>,
    principal: Principal,
    Json(body): Json<CreateBookingRequest>,
) -> Result<Response, AppError> {
    let booking = state.reservations.create_pending_booking(
        body.showtime_id,
        principal.user_id,
        body.seats,
        body.promo_code,
    )?;
    Ok(created(BookingPayload::from(booking), "Booking created").into_response())
}

pub async fn get_booking(
    State(state): State<AppState>,
    principal: Principal,
    Path(booking_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let booking = state
        .bookings
        .get(booking_id)
        .ok_or_else(|| AppError::NotFound(format!("Booking '{}' was not found", booking_id)))?;

    if booking.user_id != principal.user_id && !principal.is_admin() {
        return Err(AppError::Forbidden(
            "You do not own this booking".to_string(),
        ));
    }

    Ok(success(BookingPayload::from(booking), "Booking fetched").into_response())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderPayload {
    order_ref: String,
    amount: Decimal,
    currency: String,
}

pub async fn create_payment_order(
    State(state): State<AppState>,
    principal: Principal,
    Path(booking_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let order = state
        .payments
        .create_order(booking_id, principal.user_id, principal.is_admin())
        .await?;
    Ok(created(
        OrderPayload {
            order_ref: order.order_ref,
            amount: order.amount,
            currency: order.currency,
        },
        "Payment order created",
    )
    .into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    order_ref: String,
    payment_ref: String,
    signature: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyPaymentPayload {
    success: bool,
    booking_ref_id: String,
}

pub async fn verify_payment(
    State(state): State<AppState>,
    principal: Principal,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<VerifyPaymentRequest>,
) -> Result<Response, AppError> {
    let outcome = state.payments.verify_payment(
        booking_id,
        &body.order_ref,
        &body.payment_ref,
        &body.signature,
        principal.user_id,
        principal.is_admin(),
    )?;
    Ok(success(
        VerifyPaymentPayload {
            success: outcome.success,
            booking_ref_id: outcome.booking_ref_id,
        },
        "Payment verified",
    )
    .into_response())
}

pub async fn cancel_booking(
    State(state): State<AppState>,
    principal: Principal,
    Path(booking_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let booking =
        state
            .reservations
            .cancel_booking(booking_id, principal.user_id, principal.is_admin())?;
    Ok(success(BookingPayload::from(booking), "Booking cancelled").into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    booking_ref_id: String,
    operator_id: Uuid,
}

pub async fn check_in(
    State(state): State<AppState>,
    principal: Principal,
    Json(body): Json<CheckInRequest>,
) -> Result<Response, AppError> {
    if !principal.is_admin() {
        return Err(AppError::Forbidden(
            "Check-in requires an operator role".to_string(),
        ));
    }

    let booking = state
        .checkin
        .check_in(&body.booking_ref_id, body.operator_id)?;
    Ok(success(BookingPayload::from(booking), "Booking checked in").into_response())
}
