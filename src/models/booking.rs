use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::error::AppError;

/// Client-visible booking lifecycle. Transitions are validated centrally by
/// `BookingStatus::can_transition`; no call site re-derives legality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    PaymentPending,
    Confirmed,
    Cancelled,
    CheckedIn,
    PaymentFailed,
}

impl BookingStatus {
    pub fn can_transition(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (PaymentPending, Confirmed)
                | (PaymentPending, Cancelled)
                | (PaymentPending, PaymentFailed)
                | (Confirmed, CheckedIn)
                | (Confirmed, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BookingStatus::Cancelled | BookingStatus::PaymentFailed | BookingStatus::CheckedIn
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    /// Human-facing reference, assigned once the booking confirms.
    pub booking_ref_id: Option<String>,
    pub user_id: Uuid,
    pub showtime_id: Uuid,
    pub seats: Vec<String>,
    pub status: BookingStatus,
    pub original_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub promo_code: Option<String>,
    pub order_ref: Option<String>,
    pub payment_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub checked_in_by: Option<Uuid>,
}

impl Booking {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: Uuid,
        user_id: Uuid,
        showtime_id: Uuid,
        seats: Vec<String>,
        original_amount: Decimal,
        discount_amount: Decimal,
        promo_code: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            booking_ref_id: None,
            user_id,
            showtime_id,
            seats,
            status: BookingStatus::PaymentPending,
            original_amount,
            discount_amount,
            total_amount: original_amount - discount_amount,
            promo_code,
            order_ref: None,
            payment_ref: None,
            created_at,
            is_checked_in: false,
            checked_in_at: None,
            checked_in_by: None,
        }
    }

    /// The stored status is the sole source of truth for legality.
    pub fn transition(&mut self, next: BookingStatus) -> Result<(), AppError> {
        if self.status.can_transition(next) {
            self.status = next;
            Ok(())
        } else {
            Err(AppError::IllegalTransition(format!(
                "booking {} cannot move from {:?} to {:?}",
                self.id, self.status, next
            )))
        }
    }
}

// 0/O and 1/I are excluded so references survive being read over the phone.
const REFERENCE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const REFERENCE_LEN: usize = 8;

/// Generates a booking reference like `BK-7GX2M9QD`.
pub fn generate_reference() -> String {
    let mut rng = rand::thread_rng();
    let body: String = (0..REFERENCE_LEN)
        .map(|_| REFERENCE_CHARSET[rng.gen_range(0..REFERENCE_CHARSET.len())] as char)
        .collect();
    format!("BK-{}", body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        use BookingStatus::*;
        assert!(PaymentPending.can_transition(Confirmed));
        assert!(PaymentPending.can_transition(Cancelled));
        assert!(PaymentPending.can_transition(PaymentFailed));
        assert!(Confirmed.can_transition(CheckedIn));
        assert!(Confirmed.can_transition(Cancelled));
    }

    #[test]
    fn test_terminal_states_admit_nothing() {
        use BookingStatus::*;
        for terminal in [Cancelled, PaymentFailed, CheckedIn] {
            assert!(terminal.is_terminal());
            for next in [PaymentPending, Confirmed, Cancelled, CheckedIn, PaymentFailed] {
                assert!(!terminal.can_transition(next));
            }
        }
    }

    #[test]
    fn test_pending_cannot_check_in() {
        assert!(!BookingStatus::PaymentPending.can_transition(BookingStatus::CheckedIn));
    }

    #[test]
    fn test_transition_rejects_and_preserves_status() {
        let mut booking = Booking::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            vec!["A1".to_string()],
            Decimal::from(250),
            Decimal::ZERO,
            None,
            Utc::now(),
        );
        booking.transition(BookingStatus::Confirmed).unwrap();
        let err = booking.transition(BookingStatus::PaymentFailed).unwrap_err();
        assert!(matches!(err, AppError::IllegalTransition(_)));
        assert_eq!(booking.status, BookingStatus::Confirmed);
    }

    #[test]
    fn test_reference_shape() {
        let reference = generate_reference();
        assert!(reference.starts_with("BK-"));
        assert_eq!(reference.len(), 3 + REFERENCE_LEN);
        assert!(!reference.contains('0'));
        assert!(!reference.contains('O'));
    }
}
