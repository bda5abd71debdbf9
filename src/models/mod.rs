pub mod booking;
pub mod promo;
pub mod screen;
pub mod seat_map;
pub mod showtime;

pub use booking::{Booking, BookingStatus};
pub use promo::{DiscountKind, PromoCode};
pub use screen::{Screen, Seat, SeatKind, SeatRow};
pub use seat_map::{SeatMapRow, SeatMapSeat, SeatMapView, SeatViewStatus};
pub use showtime::{Program, SeatHold, Showtime};
