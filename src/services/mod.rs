pub mod checkin;
pub mod gateway;
pub mod payment;
pub mod promo;
pub mod reservation;
pub mod seat_map;
pub mod sweep;

pub use checkin::CheckinService;
pub use gateway::{GatewayOrder, MockGateway, PaymentGateway};
pub use payment::{PaymentService, VerifyOutcome};
pub use promo::PromoService;
pub use reservation::ReservationService;
pub use seat_map::SeatMapService;
pub use sweep::spawn_hold_sweeper;
