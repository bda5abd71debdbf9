use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Seat category used for pricing and availability. `Unavailable` marks
/// layout positions that are never sold (gaps, wheelchair bays, broken rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeatKind {
    Regular,
    Premium,
    Recliner,
    Unavailable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub seat_number: u32,
    pub kind: SeatKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatRow {
    pub row_id: String,
    pub seats: Vec<Seat>,
}

impl SeatRow {
    /// Canonical seat identifier, unique within a screen: row id + number.
    pub fn seat_id(&self, seat: &Seat) -> String {
        format!("{}{}", self.row_id, seat.seat_number)
    }
}

/// Static per-screen layout. Administered by venue management; this service
/// only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screen {
    pub id: Uuid,
    pub venue_id: Uuid,
    pub name: String,
    pub rows: Vec<SeatRow>,
}

impl Screen {
    /// Resolves a seat identifier against the layout. Row ids may be longer
    /// than one character, so the match is prefix + numeric remainder.
    pub fn seat_kind(&self, seat_id: &str) -> Option<SeatKind> {
        for row in &self.rows {
            if let Some(rest) = seat_id.strip_prefix(row.row_id.as_str()) {
                if let Ok(number) = rest.parse::<u32>() {
                    if let Some(seat) = row.seats.iter().find(|s| s.seat_number == number) {
                        return Some(seat.kind);
                    }
                }
            }
        }
        None
    }

    /// Number of sellable seats in the layout.
    pub fn sellable_seats(&self) -> u32 {
        self.rows
            .iter()
            .flat_map(|row| row.seats.iter())
            .filter(|seat| seat.kind != SeatKind::Unavailable)
            .count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> Screen {
        Screen {
            id: Uuid::new_v4(),
            venue_id: Uuid::new_v4(),
            name: "Audi 1".to_string(),
            rows: vec![
                SeatRow {
                    row_id: "A".to_string(),
                    seats: vec![
                        Seat { seat_number: 1, kind: SeatKind::Regular },
                        Seat { seat_number: 2, kind: SeatKind::Unavailable },
                    ],
                },
                SeatRow {
                    row_id: "AA".to_string(),
                    seats: vec![Seat { seat_number: 1, kind: SeatKind::Premium }],
                },
            ],
        }
    }

    #[test]
    fn test_seat_kind_lookup() {
        let screen = screen();
        assert_eq!(screen.seat_kind("A1"), Some(SeatKind::Regular));
        assert_eq!(screen.seat_kind("A2"), Some(SeatKind::Unavailable));
        assert_eq!(screen.seat_kind("AA1"), Some(SeatKind::Premium));
        assert_eq!(screen.seat_kind("B1"), None);
        assert_eq!(screen.seat_kind("A99"), None);
    }

    #[test]
    fn test_sellable_seats_skips_unavailable() {
        assert_eq!(screen().sellable_seats(), 2);
    }
}
