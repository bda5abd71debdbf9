use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::models::{Screen, SeatHold, SeatKind, Showtime};
use crate::utils::error::AppError;

/// Seat-inventory arena keyed by showtime id.
///
/// All mutations of one showtime's booked/held sets run while holding that
/// showtime's map entry mutably, which makes `try_hold`, `promote` and the
/// release operations linearizable per showtime. The guard is held only for
/// the check-and-mark step; pricing, payment and anything else that can wait
/// happens outside it.
pub struct InventoryStore {
    screens: DashMap<Uuid, Screen>,
    showtimes: DashMap<Uuid, Showtime>,
    hold_ttl: Duration,
}

impl InventoryStore {
    pub fn new(hold_ttl: Duration) -> Self {
        Self {
            screens: DashMap::new(),
            showtimes: DashMap::new(),
            hold_ttl,
        }
    }

    pub fn hold_ttl(&self) -> Duration {
        self.hold_ttl
    }

    /// Venue management owns screens and showtimes; this service only reads
    /// them apart from the seat-set fields.
    pub fn insert_screen(&self, screen: Screen) {
        self.screens.insert(screen.id, screen);
    }

    pub fn insert_showtime(&self, showtime: Showtime) {
        self.showtimes.insert(showtime.id, showtime);
    }

    pub fn screen(&self, id: Uuid) -> Option<Screen> {
        self.screens.get(&id).map(|s| s.clone())
    }

    pub fn showtime(&self, id: Uuid) -> Option<Showtime> {
        self.showtimes.get(&id).map(|s| s.clone())
    }

    fn showtime_or_not_found(
        &self,
        id: Uuid,
    ) -> Result<dashmap::mapref::one::RefMut<'_, Uuid, Showtime>, AppError> {
        self.showtimes
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Showtime '{}' was not found", id)))
    }

    /// All-or-nothing hold over the full seat set.
    ///
    /// If any requested seat is booked, or held by another live booking, the
    /// call fails without side effects. Seats already held by `booking_id`
    /// are refreshed rather than rejected, so retrying a failed request is
    /// safe. Expired holds count as free.
    pub fn try_hold(
        &self,
        showtime_id: Uuid,
        seats: &[String],
        booking_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        // The layout is static, so it is read before entering the critical
        // section.
        let screen_id = self
            .showtime(showtime_id)
            .ok_or_else(|| AppError::NotFound(format!("Showtime '{}' was not found", showtime_id)))?
            .screen_id;
        let screen = self
            .screen(screen_id)
            .ok_or_else(|| AppError::InternalServerError("Screen layout missing".to_string()))?;

        let mut entry = self.showtime_or_not_found(showtime_id)?;
        let showtime = entry.value_mut();

        if !showtime.is_bookable(now) {
            return Err(AppError::ShowtimeNotBookable(
                "This showtime is no longer open for booking".to_string(),
            ));
        }

        for seat_id in seats {
            match screen.seat_kind(seat_id) {
                None => {
                    return Err(AppError::InvalidSeat(format!(
                        "Seat '{}' does not exist on this screen",
                        seat_id
                    )))
                }
                Some(SeatKind::Unavailable) => {
                    return Err(AppError::InvalidSeat(format!(
                        "Seat '{}' is not sellable",
                        seat_id
                    )))
                }
                Some(_) => {}
            }
        }

        for seat_id in seats {
            if showtime.booked.contains(seat_id) {
                return Err(AppError::SeatUnavailable(
                    "One or more selected seats were just taken".to_string(),
                ));
            }
            if let Some(hold) = showtime.held.get(seat_id) {
                if hold.booking_id != booking_id && !hold.is_expired(now, self.hold_ttl) {
                    return Err(AppError::SeatUnavailable(
                        "One or more selected seats were just taken".to_string(),
                    ));
                }
            }
        }

        for seat_id in seats {
            showtime.held.insert(
                seat_id.clone(),
                SeatHold {
                    booking_id,
                    user_id,
                    held_at: now,
                },
            );
        }

        Ok(())
    }

    /// Moves a booking's holds to the booked set on payment confirmation.
    ///
    /// Strict: every seat must still be held by `booking_id` and unexpired,
    /// otherwise nothing is promoted. A lapsed hold may already belong to
    /// another buyer, so a partial promotion would oversell.
    pub fn promote(
        &self,
        showtime_id: Uuid,
        seats: &[String],
        booking_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut entry = self.showtime_or_not_found(showtime_id)?;
        let showtime = entry.value_mut();

        for seat_id in seats {
            match showtime.held.get(seat_id) {
                Some(hold) if hold.booking_id == booking_id && !hold.is_expired(now, self.hold_ttl) => {}
                _ => {
                    return Err(AppError::SeatUnavailable(
                        "The seat hold lapsed before payment completed".to_string(),
                    ))
                }
            }
        }

        for seat_id in seats {
            showtime.held.remove(seat_id);
            showtime.booked.insert(seat_id.clone());
        }

        Ok(())
    }

    /// Drops the holds a booking owns. Seats held by other bookings are left
    /// alone, so repeated or concurrent invocation is harmless.
    pub fn release_held(&self, showtime_id: Uuid, seats: &[String], booking_id: Uuid) {
        if let Some(mut entry) = self.showtimes.get_mut(&showtime_id) {
            let showtime = entry.value_mut();
            for seat_id in seats {
                if showtime
                    .held
                    .get(seat_id)
                    .is_some_and(|hold| hold.booking_id == booking_id)
                {
                    showtime.held.remove(seat_id);
                }
            }
        }
    }

    /// Returns booked seats to the available pool (confirmed-booking
    /// cancellation).
    pub fn release_booked(&self, showtime_id: Uuid, seats: &[String]) {
        if let Some(mut entry) = self.showtimes.get_mut(&showtime_id) {
            let showtime = entry.value_mut();
            for seat_id in seats {
                showtime.booked.remove(seat_id);
            }
        }
    }

    /// Removes every expired hold and reports the owning bookings, so the
    /// sweep can cancel them. Deduplicated per (showtime, booking).
    pub fn reap_expired(&self, now: DateTime<Utc>) -> Vec<(Uuid, Uuid)> {
        let mut reaped = Vec::new();
        for mut entry in self.showtimes.iter_mut() {
            let showtime_id = *entry.key();
            let showtime = entry.value_mut();
            let expired: Vec<String> = showtime
                .held
                .iter()
                .filter(|(_, hold)| hold.is_expired(now, self.hold_ttl))
                .map(|(seat_id, _)| seat_id.clone())
                .collect();
            for seat_id in expired {
                if let Some(hold) = showtime.held.remove(&seat_id) {
                    if !reaped.contains(&(showtime_id, hold.booking_id)) {
                        reaped.push((showtime_id, hold.booking_id));
                    }
                }
            }
        }
        reaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Program, Seat, SeatRow};
    use rust_decimal::Decimal;
    use std::collections::HashMap;

    fn store_with_showtime(ttl_minutes: i64) -> (InventoryStore, Uuid) {
        let store = InventoryStore::new(Duration::minutes(ttl_minutes));
        let screen_id = Uuid::new_v4();
        let showtime_id = Uuid::new_v4();
        store.insert_screen(Screen {
            id: screen_id,
            venue_id: Uuid::new_v4(),
            name: "Audi 1".to_string(),
            rows: vec![SeatRow {
                row_id: "A".to_string(),
                seats: (1..=4)
                    .map(|n| Seat {
                        seat_number: n,
                        kind: SeatKind::Regular,
                    })
                    .collect(),
            }],
        });
        store.insert_showtime(Showtime {
            id: showtime_id,
            program: Program::Movie {
                movie_id: Uuid::new_v4(),
                title: "Interstellar".to_string(),
            },
            venue_id: Uuid::new_v4(),
            screen_id,
            screen_name: "Audi 1".to_string(),
            start_time: Utc::now() + Duration::hours(6),
            end_time: Utc::now() + Duration::hours(9),
            is_active: true,
            total_seats: 4,
            booked: Default::default(),
            held: Default::default(),
            prices: HashMap::from([(SeatKind::Regular, Decimal::from(250))]),
            created_at: Utc::now(),
        });
        (store, showtime_id)
    }

    fn seats(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_hold_is_all_or_nothing() {
        let (store, showtime_id) = store_with_showtime(15);
        let now = Utc::now();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        store
            .try_hold(showtime_id, &seats(&["A1"]), first, Uuid::new_v4(), now)
            .unwrap();

        let err = store
            .try_hold(showtime_id, &seats(&["A1", "A2"]), second, Uuid::new_v4(), now)
            .unwrap_err();
        assert!(matches!(err, AppError::SeatUnavailable(_)));

        // The losing request must leave no residual hold on A2.
        let showtime = store.showtime(showtime_id).unwrap();
        assert!(showtime.held.contains_key("A1"));
        assert!(!showtime.held.contains_key("A2"));
    }

    #[test]
    fn test_retry_by_same_booking_is_noop() {
        let (store, showtime_id) = store_with_showtime(15);
        let now = Utc::now();
        let booking = Uuid::new_v4();
        let user = Uuid::new_v4();

        store
            .try_hold(showtime_id, &seats(&["A1", "A2"]), booking, user, now)
            .unwrap();
        store
            .try_hold(showtime_id, &seats(&["A1", "A2"]), booking, user, now)
            .unwrap();

        assert_eq!(store.showtime(showtime_id).unwrap().held.len(), 2);
    }

    #[test]
    fn test_unknown_seat_rejected() {
        let (store, showtime_id) = store_with_showtime(15);
        let err = store
            .try_hold(
                showtime_id,
                &seats(&["Z9"]),
                Uuid::new_v4(),
                Uuid::new_v4(),
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidSeat(_)));
    }

    #[test]
    fn test_expired_hold_is_free_for_the_taking() {
        let (store, showtime_id) = store_with_showtime(0);
        let now = Utc::now();
        let stale = Uuid::new_v4();
        let fresh = Uuid::new_v4();

        store
            .try_hold(showtime_id, &seats(&["A1"]), stale, Uuid::new_v4(), now)
            .unwrap();
        // TTL of zero: the hold is expired the moment it lands.
        store
            .try_hold(showtime_id, &seats(&["A1"]), fresh, Uuid::new_v4(), now)
            .unwrap();

        let showtime = store.showtime(showtime_id).unwrap();
        assert_eq!(showtime.held.get("A1").unwrap().booking_id, fresh);
    }

    #[test]
    fn test_promote_moves_held_to_booked() {
        let (store, showtime_id) = store_with_showtime(15);
        let now = Utc::now();
        let booking = Uuid::new_v4();

        store
            .try_hold(showtime_id, &seats(&["A1", "A2"]), booking, Uuid::new_v4(), now)
            .unwrap();
        store
            .promote(showtime_id, &seats(&["A1", "A2"]), booking, now)
            .unwrap();

        let showtime = store.showtime(showtime_id).unwrap();
        assert!(showtime.held.is_empty());
        assert!(showtime.booked.contains("A1") && showtime.booked.contains("A2"));
    }

    #[test]
    fn test_promote_refuses_foreign_or_missing_hold() {
        let (store, showtime_id) = store_with_showtime(15);
        let now = Utc::now();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        store
            .try_hold(showtime_id, &seats(&["A1"]), owner, Uuid::new_v4(), now)
            .unwrap();

        let err = store
            .promote(showtime_id, &seats(&["A1"]), other, now)
            .unwrap_err();
        assert!(matches!(err, AppError::SeatUnavailable(_)));

        // Nothing was promoted.
        let showtime = store.showtime(showtime_id).unwrap();
        assert!(showtime.booked.is_empty());
    }

    #[test]
    fn test_release_held_only_touches_own_holds() {
        let (store, showtime_id) = store_with_showtime(15);
        let now = Utc::now();
        let mine = Uuid::new_v4();
        let theirs = Uuid::new_v4();

        store
            .try_hold(showtime_id, &seats(&["A1"]), mine, Uuid::new_v4(), now)
            .unwrap();
        store
            .try_hold(showtime_id, &seats(&["A2"]), theirs, Uuid::new_v4(), now)
            .unwrap();

        store.release_held(showtime_id, &seats(&["A1", "A2"]), mine);
        store.release_held(showtime_id, &seats(&["A1", "A2"]), mine);

        let showtime = store.showtime(showtime_id).unwrap();
        assert!(!showtime.held.contains_key("A1"));
        assert!(showtime.held.contains_key("A2"));
    }

    #[test]
    fn test_reap_expired_reports_owning_bookings() {
        let (store, showtime_id) = store_with_showtime(0);
        let now = Utc::now();
        let booking = Uuid::new_v4();

        store
            .try_hold(showtime_id, &seats(&["A1", "A2"]), booking, Uuid::new_v4(), now)
            .unwrap();

        let reaped = store.reap_expired(now + Duration::seconds(1));
        assert_eq!(reaped, vec![(showtime_id, booking)]);
        assert!(store.showtime(showtime_id).unwrap().held.is_empty());

        // Second sweep finds nothing.
        assert!(store.reap_expired(now + Duration::seconds(2)).is_empty());
    }

    #[test]
    fn test_past_showtime_not_bookable() {
        let (store, showtime_id) = store_with_showtime(15);
        let err = store
            .try_hold(
                showtime_id,
                &seats(&["A1"]),
                Uuid::new_v4(),
                Uuid::new_v4(),
                Utc::now() + Duration::hours(7),
            )
            .unwrap_err();
        assert!(matches!(err, AppError::ShowtimeNotBookable(_)));
    }
}
