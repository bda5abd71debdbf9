use serde::Serialize;
use uuid::Uuid;

use crate::models::screen::SeatKind;

/// Computed availability of one seat, from the viewer's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeatViewStatus {
    Available,
    /// Held by another buyer's in-flight booking; unavailable for selection.
    HeldByOthers,
    Booked,
    /// Held by the viewer's own in-flight booking.
    Selected,
    /// Layout position that is never sold.
    Blocked,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatMapSeat {
    pub seat_number: u32,
    #[serde(rename = "type")]
    pub kind: SeatKind,
    pub status: SeatViewStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatMapRow {
    pub row_id: String,
    pub seats: Vec<SeatMapSeat>,
}

/// Derived view: static layout merged with live booked/held sets. Never
/// persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatMapView {
    pub showtime_id: Uuid,
    pub screen_id: Uuid,
    pub screen_name: String,
    pub rows: Vec<SeatMapRow>,
}
