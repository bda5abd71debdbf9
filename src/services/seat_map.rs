use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{SeatKind, SeatMapRow, SeatMapSeat, SeatMapView, SeatViewStatus};
use crate::store::InventoryStore;
use crate::utils::error::AppError;

/// Assembles the derived seat map: static screen layout merged with the
/// showtime's live booked/held sets. Read-only; works on a snapshot, so a
/// concurrent hold may appear a beat late. Holds are re-validated at
/// reservation time, so staleness here is harmless.
pub struct SeatMapService {
    inventory: Arc<InventoryStore>,
}

impl SeatMapService {
    pub fn new(inventory: Arc<InventoryStore>) -> Self {
        Self { inventory }
    }

    pub fn seat_map(&self, showtime_id: Uuid, viewer: Option<Uuid>) -> Result<SeatMapView, AppError> {
        let showtime = self.inventory.showtime(showtime_id).ok_or_else(|| {
            AppError::NotFound(format!("Showtime '{}' was not found", showtime_id))
        })?;
        let screen = self
            .inventory
            .screen(showtime.screen_id)
            .ok_or_else(|| AppError::InternalServerError("Screen layout missing".to_string()))?;

        let now = Utc::now();
        let ttl = self.inventory.hold_ttl();

        let rows = screen
            .rows
            .iter()
            .map(|row| SeatMapRow {
                row_id: row.row_id.clone(),
                seats: row
                    .seats
                    .iter()
                    .map(|seat| {
                        let seat_id = row.seat_id(seat);
                        let status = if seat.kind == SeatKind::Unavailable {
                            SeatViewStatus::Blocked
                        } else if showtime.booked.contains(&seat_id) {
                            SeatViewStatus::Booked
                        } else {
                            match showtime.held.get(&seat_id) {
                                Some(hold) if !hold.is_expired(now, ttl) => {
                                    if viewer == Some(hold.user_id) {
                                        SeatViewStatus::Selected
                                    } else {
                                        SeatViewStatus::HeldByOthers
                                    }
                                }
                                _ => SeatViewStatus::Available,
                            }
                        };
                        SeatMapSeat {
                            seat_number: seat.seat_number,
                            kind: seat.kind,
                            status,
                        }
                    })
                    .collect(),
            })
            .collect();

        Ok(SeatMapView {
            showtime_id,
            screen_id: screen.id,
            screen_name: showtime.screen_name.clone(),
            rows,
        })
    }
}
