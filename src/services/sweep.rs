use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::{BookingStore, InventoryStore};

/// One sweep pass: drops every expired hold and cancels the pending
/// bookings that owned them. Returns how many bookings were cancelled.
///
/// Safe to run concurrently with explicit cancels and payment verification;
/// every step is a no-op when the other side already won.
pub fn sweep_once(inventory: &InventoryStore, bookings: &BookingStore) -> usize {
    let reaped = inventory.reap_expired(Utc::now());
    if reaped.is_empty() {
        return 0;
    }

    let mut cancelled = 0;
    for (showtime_id, booking_id) in &reaped {
        if bookings.expire(*booking_id) {
            cancelled += 1;
            debug!(
                booking_id = %booking_id,
                showtime_id = %showtime_id,
                "Expired hold swept, booking cancelled"
            );
        }
    }

    info!(
        holds = reaped.len(),
        cancelled, "Hold sweep released stale reservations"
    );
    cancelled
}

/// The authoritative backstop for abandoned payments: clients closing a
/// payment dialog only sometimes manage to send a cancel, the sweep always
/// runs.
pub fn spawn_hold_sweeper(
    inventory: Arc<InventoryStore>,
    bookings: Arc<BookingStore>,
    interval_secs: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(tokio::time::Duration::from_secs(interval_secs.max(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            sweep_once(&inventory, &bookings);
        }
    })
}
