use dashmap::DashMap;
use uuid::Uuid;

use crate::models::{Booking, BookingStatus};
use crate::utils::error::AppError;

/// Bookings are never deleted, only transitioned; the map only ever grows.
/// Confirmed bookings are additionally indexed by their reference code for
/// venue-entry lookup.
pub struct BookingStore {
    bookings: DashMap<Uuid, Booking>,
    by_reference: DashMap<String, Uuid>,
}

impl BookingStore {
    pub fn new() -> Self {
        Self {
            bookings: DashMap::new(),
            by_reference: DashMap::new(),
        }
    }

    pub fn insert(&self, booking: Booking) {
        if let Some(reference) = booking.booking_ref_id.clone() {
            self.by_reference.insert(reference, booking.id);
        }
        self.bookings.insert(booking.id, booking);
    }

    pub fn get(&self, id: Uuid) -> Option<Booking> {
        self.bookings.get(&id).map(|b| b.clone())
    }

    pub fn get_by_reference(&self, reference: &str) -> Option<Booking> {
        let id = *self.by_reference.get(reference)?;
        self.get(id)
    }

    /// Runs `f` while holding the booking's entry mutably, so status checks
    /// and the transition they guard are a single atomic step.
    pub fn update<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Booking) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut entry = self
            .bookings
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Booking '{}' was not found", id)))?;
        f(entry.value_mut())
    }

    pub fn index_reference(&self, reference: String, id: Uuid) {
        self.by_reference.insert(reference, id);
    }

    /// Cancels a booking the sweep found with lapsed holds. Only pending
    /// bookings move; anything else already raced past the sweep.
    pub fn expire(&self, id: Uuid) -> bool {
        self.bookings
            .get_mut(&id)
            .map(|mut entry| {
                let booking = entry.value_mut();
                if booking.status == BookingStatus::PaymentPending {
                    booking.status = BookingStatus::Cancelled;
                    true
                } else {
                    false
                }
            })
            .unwrap_or(false)
    }
}

impl Default for BookingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn booking() -> Booking {
        Booking::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            vec!["A1".to_string()],
            Decimal::from(250),
            Decimal::ZERO,
            None,
            Utc::now(),
        )
    }

    #[test]
    fn test_reference_index_roundtrip() {
        let store = BookingStore::new();
        let b = booking();
        let id = b.id;
        store.insert(b);

        store.index_reference("BK-TEST1234".to_string(), id);
        assert_eq!(store.get_by_reference("BK-TEST1234").unwrap().id, id);
        assert!(store.get_by_reference("BK-MISSING1").is_none());
    }

    #[test]
    fn test_expire_only_moves_pending() {
        let store = BookingStore::new();
        let b = booking();
        let id = b.id;
        store.insert(b);

        assert!(store.expire(id));
        assert_eq!(store.get(id).unwrap().status, BookingStatus::Cancelled);
        // Second expiry is a no-op.
        assert!(!store.expire(id));
    }

    #[test]
    fn test_update_missing_booking() {
        let store = BookingStore::new();
        let err = store.update(Uuid::new_v4(), |_| Ok(())).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
