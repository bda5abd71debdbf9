use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::models::screen::SeatKind;

/// What is being screened. Exactly one of movie or event; the title is
/// denormalized from the catalog service for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Program {
    Movie { movie_id: Uuid, title: String },
    Event { event_id: Uuid, title: String },
}

/// A temporary claim on a seat, pending payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatHold {
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub held_at: DateTime<Utc>,
}

impl SeatHold {
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now >= self.held_at + ttl
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Showtime {
    pub id: Uuid,
    pub program: Program,
    pub venue_id: Uuid,
    pub screen_id: Uuid,
    pub screen_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_active: bool,
    pub total_seats: u32,
    /// Permanently sold seat ids. Disjoint from `held`.
    pub booked: HashSet<String>,
    /// Live holds keyed by seat id. Mutated only under the per-showtime
    /// critical section in the inventory store.
    pub held: HashMap<String, SeatHold>,
    pub prices: HashMap<SeatKind, Decimal>,
    pub created_at: DateTime<Utc>,
}

impl Showtime {
    pub fn is_bookable(&self, now: DateTime<Utc>) -> bool {
        self.is_active && now < self.start_time
    }

    pub fn price_of(&self, kind: SeatKind) -> Option<Decimal> {
        self.prices.get(&kind).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_expiry_boundary() {
        let now = Utc::now();
        let hold = SeatHold {
            booking_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            held_at: now,
        };
        let ttl = Duration::minutes(15);
        assert!(!hold.is_expired(now, ttl));
        assert!(!hold.is_expired(now + Duration::minutes(14), ttl));
        assert!(hold.is_expired(now + Duration::minutes(15), ttl));
    }
}
