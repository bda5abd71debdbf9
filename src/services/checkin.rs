use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::models::{Booking, BookingStatus};
use crate::store::BookingStore;
use crate::utils::error::AppError;

/// Venue-entry validation: consumes a confirmed booking's reference exactly
/// once and records who admitted it.
pub struct CheckinService {
    bookings: Arc<BookingStore>,
}

impl CheckinService {
    pub fn new(bookings: Arc<BookingStore>) -> Self {
        Self { bookings }
    }

    pub fn check_in(&self, booking_ref: &str, operator_id: Uuid) -> Result<Booking, AppError> {
        let now = Utc::now();
        let booking = self.bookings.get_by_reference(booking_ref).ok_or_else(|| {
            AppError::NotFound(format!("No booking with reference '{}'", booking_ref))
        })?;

        let checked_in = self.bookings.update(booking.id, |booking| {
            if booking.is_checked_in {
                return Err(AppError::AlreadyCheckedIn(format!(
                    "Booking '{}' was already checked in",
                    booking_ref
                )));
            }
            match booking.status {
                BookingStatus::Confirmed => {
                    booking.transition(BookingStatus::CheckedIn)?;
                    booking.is_checked_in = true;
                    booking.checked_in_at = Some(now);
                    booking.checked_in_by = Some(operator_id);
                    Ok(booking.clone())
                }
                BookingStatus::CheckedIn => Err(AppError::AlreadyCheckedIn(format!(
                    "Booking '{}' was already checked in",
                    booking_ref
                ))),
                other => Err(AppError::NotConfirmed(format!(
                    "Booking '{}' is {:?}, only confirmed bookings can check in",
                    booking_ref, other
                ))),
            }
        })?;

        info!(
            booking_ref = %booking_ref,
            operator_id = %operator_id,
            "Booking checked in"
        );

        Ok(checked_in)
    }
}
