use chrono::Utc;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::models::booking::generate_reference;
use crate::models::{Booking, BookingStatus};
use crate::services::gateway::{GatewayOrder, PaymentGateway};
use crate::services::promo::PromoService;
use crate::store::{BookingStore, InventoryStore};
use crate::utils::error::AppError;

/// Keyed digest binding an order/payment pair to the gateway shared secret.
/// The gateway computes the same value when it signs its confirmation
/// callback.
pub fn sign(secret: &str, order_ref: &str, payment_ref: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(b"|");
    hasher.update(order_ref.as_bytes());
    hasher.update(b"|");
    hasher.update(payment_ref.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct VerifyOutcome {
    pub success: bool,
    pub booking_ref_id: String,
}

enum ConfirmOutcome {
    Confirmed(Booking),
    /// A concurrent verification with the same payment already confirmed.
    Replay(Booking),
}

/// Boundary to the external payment gateway: opens orders and consumes the
/// signed confirmation, promoting the seat hold into a sale.
pub struct PaymentService {
    inventory: Arc<InventoryStore>,
    bookings: Arc<BookingStore>,
    promos: Arc<PromoService>,
    gateway: Arc<dyn PaymentGateway>,
    key_secret: String,
    currency: String,
}

impl PaymentService {
    pub fn new(
        inventory: Arc<InventoryStore>,
        bookings: Arc<BookingStore>,
        promos: Arc<PromoService>,
        gateway: Arc<dyn PaymentGateway>,
        key_secret: String,
        currency: String,
    ) -> Self {
        Self {
            inventory,
            bookings,
            promos,
            gateway,
            key_secret,
            currency,
        }
    }

    /// Opens an order with the gateway for a pending booking. Idempotent: a
    /// booking that already carries an order reference gets it back without
    /// a second gateway call.
    pub async fn create_order(
        &self,
        booking_id: Uuid,
        actor_id: Uuid,
        is_admin: bool,
    ) -> Result<GatewayOrder, AppError> {
        let booking = self
            .bookings
            .get(booking_id)
            .ok_or_else(|| AppError::NotFound(format!("Booking '{}' was not found", booking_id)))?;

        if booking.user_id != actor_id && !is_admin {
            return Err(AppError::Forbidden(
                "You do not own this booking".to_string(),
            ));
        }
        if booking.status != BookingStatus::PaymentPending {
            return Err(AppError::IllegalTransition(format!(
                "booking {} is {:?}, a payment order requires PaymentPending",
                booking_id, booking.status
            )));
        }
        if booking.total_amount.is_zero() {
            return Err(AppError::ValidationError(
                "This booking is fully discounted and needs no payment".to_string(),
            ));
        }
        if self.expire_if_stale(&booking) {
            return Err(AppError::IllegalTransition(format!(
                "booking {} lapsed before payment and was cancelled",
                booking_id
            )));
        }

        if let Some(order_ref) = booking.order_ref.clone() {
            return Ok(GatewayOrder {
                order_ref,
                amount: booking.total_amount,
                currency: self.currency.clone(),
            });
        }

        let order = self
            .gateway
            .create_order(booking.total_amount, &self.currency, &booking_id.to_string())
            .await?;

        self.bookings.update(booking_id, |booking| {
            if booking.order_ref.is_none() {
                booking.order_ref = Some(order.order_ref.clone());
            }
            Ok(())
        })?;

        info!(booking_id = %booking_id, order_ref = %order.order_ref, "Payment order created");

        Ok(order)
    }

    /// Consumes the gateway's signed confirmation.
    ///
    /// On a valid signature the hold becomes a sale, the booking confirms
    /// and gets its reference, and promo usage is recorded. On a mismatch
    /// the booking fails and its holds are released; the call is never
    /// retried automatically. Re-verifying an already confirmed booking
    /// with the same payment reference returns the original result.
    pub fn verify_payment(
        &self,
        booking_id: Uuid,
        order_ref: &str,
        payment_ref: &str,
        signature: &str,
        actor_id: Uuid,
        is_admin: bool,
    ) -> Result<VerifyOutcome, AppError> {
        let now = Utc::now();
        let booking = self
            .bookings
            .get(booking_id)
            .ok_or_else(|| AppError::NotFound(format!("Booking '{}' was not found", booking_id)))?;

        if booking.user_id != actor_id && !is_admin {
            return Err(AppError::Forbidden(
                "You do not own this booking".to_string(),
            ));
        }

        if booking.status == BookingStatus::Confirmed
            && booking.payment_ref.as_deref() == Some(payment_ref)
        {
            return Ok(VerifyOutcome {
                success: true,
                booking_ref_id: booking.booking_ref_id.clone().unwrap_or_default(),
            });
        }
        if booking.status != BookingStatus::PaymentPending {
            return Err(AppError::IllegalTransition(format!(
                "booking {} is {:?} and cannot be verified",
                booking_id, booking.status
            )));
        }
        match booking.order_ref.as_deref() {
            Some(stored) if stored == order_ref => {}
            _ => {
                return Err(AppError::ValidationError(
                    "Order reference does not match this booking".to_string(),
                ))
            }
        }

        let expected = sign(&self.key_secret, order_ref, payment_ref);
        if expected != signature {
            let failed = self.bookings.update(booking_id, |booking| {
                match booking.status {
                    BookingStatus::PaymentPending => {
                        booking.transition(BookingStatus::PaymentFailed)?;
                        Ok(true)
                    }
                    _ => Ok(false),
                }
            })?;
            if failed {
                self.inventory
                    .release_held(booking.showtime_id, &booking.seats, booking_id);
            }
            error!(
                booking_id = %booking_id,
                order_ref = %order_ref,
                payment_ref = %payment_ref,
                "Payment signature mismatch, booking failed and holds released"
            );
            return Err(AppError::SignatureMismatch(
                "signature did not match the order/payment pair".to_string(),
            ));
        }

        if self.expire_if_stale(&booking) {
            return Err(AppError::SeatUnavailable(
                "The seat hold lapsed before payment completed".to_string(),
            ));
        }

        // Promote before the status flip: a lapsed or stolen hold must fail
        // the verification, not confirm a booking without seats.
        if let Err(err) =
            self.inventory
                .promote(booking.showtime_id, &booking.seats, booking_id, now)
        {
            if self.bookings.expire(booking_id) {
                self.inventory
                    .release_held(booking.showtime_id, &booking.seats, booking_id);
            }
            return Err(err);
        }

        let reference = generate_reference();
        let outcome = self.bookings.update(booking_id, |booking| {
            match booking.status {
                BookingStatus::PaymentPending => {
                    booking.transition(BookingStatus::Confirmed)?;
                    booking.payment_ref = Some(payment_ref.to_string());
                    booking.booking_ref_id = Some(reference.clone());
                    Ok(ConfirmOutcome::Confirmed(booking.clone()))
                }
                BookingStatus::Confirmed
                    if booking.payment_ref.as_deref() == Some(payment_ref) =>
                {
                    Ok(ConfirmOutcome::Replay(booking.clone()))
                }
                _ => Err(AppError::IllegalTransition(format!(
                    "booking {} moved to {:?} during verification",
                    booking.id, booking.status
                ))),
            }
        });

        match outcome {
            Ok(ConfirmOutcome::Confirmed(confirmed)) => {
                self.bookings.index_reference(reference.clone(), booking_id);
                if let Some(code) = &confirmed.promo_code {
                    self.promos.record_use(code);
                }
                info!(
                    booking_id = %booking_id,
                    booking_ref = %reference,
                    payment_ref = %payment_ref,
                    "Payment verified, booking confirmed"
                );
                Ok(VerifyOutcome {
                    success: true,
                    booking_ref_id: reference,
                })
            }
            Ok(ConfirmOutcome::Replay(existing)) => Ok(VerifyOutcome {
                success: true,
                booking_ref_id: existing.booking_ref_id.unwrap_or_default(),
            }),
            Err(err) => {
                // A concurrent cancel won the status race after our
                // promotion; hand the seats back.
                self.inventory
                    .release_booked(booking.showtime_id, &booking.seats);
                Err(err)
            }
        }
    }

    /// A pending booking past its hold TTL counts as already cancelled.
    /// Performs the lazy cancellation; reports true whenever the booking is
    /// stale, even if a concurrent sweep got to it first.
    fn expire_if_stale(&self, booking: &Booking) -> bool {
        let now = Utc::now();
        if now < booking.created_at + self.inventory.hold_ttl() {
            return false;
        }
        if self.bookings.expire(booking.id) {
            self.inventory
                .release_held(booking.showtime_id, &booking.seats, booking.id);
            info!(booking_id = %booking.id, "Stale pending booking cancelled lazily");
        }
        true
    }
}
