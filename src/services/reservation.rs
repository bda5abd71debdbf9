use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::models::booking::generate_reference;
use crate::models::{Booking, BookingStatus};
use crate::services::promo::PromoService;
use crate::store::{BookingStore, InventoryStore};
use crate::utils::error::AppError;

/// Confirmed bookings can be cancelled by their owner only up to this long
/// before the showtime starts. Administrative cancellation is unconditional.
const CONFIRMED_CANCEL_CUTOFF_HOURS: i64 = 2;

/// Turns a seat selection into a held, payment-gated booking and owns the
/// cancellation paths. Seat mutual exclusion itself lives in the inventory
/// store; this service sequences the steps around it and unwinds on failure.
pub struct ReservationService {
    inventory: Arc<InventoryStore>,
    bookings: Arc<BookingStore>,
    promos: Arc<PromoService>,
}

impl ReservationService {
    pub fn new(
        inventory: Arc<InventoryStore>,
        bookings: Arc<BookingStore>,
        promos: Arc<PromoService>,
    ) -> Self {
        Self {
            inventory,
            bookings,
            promos,
        }
    }

    pub fn create_pending_booking(
        &self,
        showtime_id: Uuid,
        user_id: Uuid,
        seats: Vec<String>,
        promo_code: Option<String>,
    ) -> Result<Booking, AppError> {
        self.create_pending_booking_at(showtime_id, user_id, seats, promo_code, Utc::now())
    }

    pub fn create_pending_booking_at(
        &self,
        showtime_id: Uuid,
        user_id: Uuid,
        seats: Vec<String>,
        promo_code: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Booking, AppError> {
        if seats.is_empty() {
            return Err(AppError::ValidationError(
                "At least one seat must be selected".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for seat_id in &seats {
            if !seen.insert(seat_id.as_str()) {
                return Err(AppError::ValidationError(format!(
                    "Seat '{}' was selected more than once",
                    seat_id
                )));
            }
        }

        let booking_id = Uuid::new_v4();
        self.inventory
            .try_hold(showtime_id, &seats, booking_id, user_id, now)?;

        // The hold is taken; any failure past this point must release it so
        // no partial state survives the call.
        match self.price_and_store(booking_id, showtime_id, user_id, &seats, promo_code, now) {
            Ok(booking) => Ok(booking),
            Err(err) => {
                self.inventory.release_held(showtime_id, &seats, booking_id);
                Err(err)
            }
        }
    }

    fn price_and_store(
        &self,
        booking_id: Uuid,
        showtime_id: Uuid,
        user_id: Uuid,
        seats: &[String],
        promo_code: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Booking, AppError> {
        let showtime = self.inventory.showtime(showtime_id).ok_or_else(|| {
            AppError::NotFound(format!("Showtime '{}' was not found", showtime_id))
        })?;
        let screen = self
            .inventory
            .screen(showtime.screen_id)
            .ok_or_else(|| AppError::InternalServerError("Screen layout missing".to_string()))?;

        let mut original_amount = Decimal::ZERO;
        for seat_id in seats {
            let kind = screen.seat_kind(seat_id).ok_or_else(|| {
                AppError::InvalidSeat(format!("Seat '{}' does not exist on this screen", seat_id))
            })?;
            let price = showtime.price_of(kind).ok_or_else(|| {
                AppError::InvalidSeat(format!("Seat '{}' has no configured price", seat_id))
            })?;
            original_amount += price;
        }

        let (promo_code, discount_amount) = match promo_code.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(raw) => {
                let (code, discount) = self.promos.evaluate(raw, original_amount, now)?;
                (Some(code), discount)
            }
            None => (None, Decimal::ZERO),
        };

        let mut booking = Booking::new(
            booking_id,
            user_id,
            showtime_id,
            seats.to_vec(),
            original_amount,
            discount_amount,
            promo_code,
            now,
        );

        if booking.total_amount.is_zero() {
            // Fully discounted: nothing to pay, so the hold is promoted and
            // the booking confirmed in the same operation.
            self.inventory.promote(showtime_id, seats, booking_id, now)?;
            booking.transition(BookingStatus::Confirmed)?;
            booking.booking_ref_id = Some(generate_reference());
            if let Some(code) = &booking.promo_code {
                self.promos.record_use(code);
            }
        }

        self.bookings.insert(booking.clone());

        info!(
            booking_id = %booking.id,
            showtime_id = %showtime_id,
            seats = ?seats,
            status = ?booking.status,
            total = %booking.total_amount,
            "Booking created"
        );

        Ok(booking)
    }

    /// Cancels a booking on behalf of `actor_id`. Dispatches on the current
    /// status: pending bookings release their holds, confirmed bookings
    /// return their seats to the pool subject to the cutoff.
    pub fn cancel_booking(
        &self,
        booking_id: Uuid,
        actor_id: Uuid,
        is_admin: bool,
    ) -> Result<Booking, AppError> {
        let now = Utc::now();
        let current = self
            .bookings
            .get(booking_id)
            .ok_or_else(|| AppError::NotFound(format!("Booking '{}' was not found", booking_id)))?;

        if current.user_id != actor_id && !is_admin {
            return Err(AppError::Forbidden(
                "You do not own this booking".to_string(),
            ));
        }

        match current.status {
            BookingStatus::PaymentPending | BookingStatus::Cancelled => {
                self.cancel_pending_booking(booking_id)
            }
            BookingStatus::Confirmed => self.cancel_confirmed_booking_at(booking_id, is_admin, now),
            BookingStatus::CheckedIn | BookingStatus::PaymentFailed => {
                Err(AppError::IllegalTransition(format!(
                    "booking {} cannot be cancelled from {:?}",
                    booking_id, current.status
                )))
            }
        }
    }

    /// Releases a pending booking's holds and cancels it. Idempotent: an
    /// already-cancelled booking is returned unchanged. This also covers
    /// TTL-lapsed pending bookings, which are treated as already cancelled.
    pub fn cancel_pending_booking(&self, booking_id: Uuid) -> Result<Booking, AppError> {
        let (booking, released) = self.bookings.update(booking_id, |booking| {
            match booking.status {
                BookingStatus::Cancelled => Ok((booking.clone(), false)),
                BookingStatus::PaymentPending => {
                    booking.transition(BookingStatus::Cancelled)?;
                    Ok((booking.clone(), true))
                }
                _ => Err(AppError::IllegalTransition(format!(
                    "booking {} cannot be cancelled from {:?}",
                    booking.id, booking.status
                ))),
            }
        })?;

        if released {
            self.inventory
                .release_held(booking.showtime_id, &booking.seats, booking_id);
            info!(booking_id = %booking_id, "Pending booking cancelled, holds released");
        }

        Ok(booking)
    }

    fn cancel_confirmed_booking_at(
        &self,
        booking_id: Uuid,
        is_admin: bool,
        now: DateTime<Utc>,
    ) -> Result<Booking, AppError> {
        let current = self
            .bookings
            .get(booking_id)
            .ok_or_else(|| AppError::NotFound(format!("Booking '{}' was not found", booking_id)))?;
        let showtime = self.inventory.showtime(current.showtime_id).ok_or_else(|| {
            AppError::NotFound(format!("Showtime '{}' was not found", current.showtime_id))
        })?;

        if !is_admin && now + Duration::hours(CONFIRMED_CANCEL_CUTOFF_HOURS) > showtime.start_time {
            return Err(AppError::Forbidden(format!(
                "Confirmed bookings can only be cancelled more than {} hours before the showtime",
                CONFIRMED_CANCEL_CUTOFF_HOURS
            )));
        }

        let (booking, released) = self.bookings.update(booking_id, |booking| {
            match booking.status {
                BookingStatus::Cancelled => Ok((booking.clone(), false)),
                BookingStatus::Confirmed => {
                    booking.transition(BookingStatus::Cancelled)?;
                    Ok((booking.clone(), true))
                }
                _ => Err(AppError::IllegalTransition(format!(
                    "booking {} cannot be cancelled from {:?}",
                    booking.id, booking.status
                ))),
            }
        })?;

        if released {
            self.inventory
                .release_booked(booking.showtime_id, &booking.seats);
            info!(booking_id = %booking_id, "Confirmed booking cancelled, seats returned to pool");
        }

        Ok(booking)
    }
}
