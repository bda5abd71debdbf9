use axum::{
    routing::{get, post},
    Router,
};
use chrono::Duration;
use std::sync::Arc;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::{
    cancel_booking, check_in, create_booking, create_payment_order, get_booking, get_seat_map,
    health_check, verify_payment,
};
use crate::services::{
    CheckinService, PaymentGateway, PaymentService, PromoService, ReservationService,
    SeatMapService,
};
use crate::store::{BookingStore, InventoryStore, PromoStore};

#[derive(Clone)]
pub struct AppState {
    pub inventory: Arc<InventoryStore>,
    pub bookings: Arc<BookingStore>,
    pub promos: Arc<PromoStore>,
    pub seat_maps: Arc<SeatMapService>,
    pub reservations: Arc<ReservationService>,
    pub payments: Arc<PaymentService>,
    pub checkin: Arc<CheckinService>,
}

impl AppState {
    pub fn new(config: &Config, gateway: Arc<dyn PaymentGateway>) -> Self {
        let inventory = Arc::new(InventoryStore::new(Duration::minutes(
            config.hold_ttl_minutes,
        )));
        let bookings = Arc::new(BookingStore::new());
        let promos = Arc::new(PromoStore::new());

        let promo_service = Arc::new(PromoService::new(promos.clone()));
        let seat_maps = Arc::new(SeatMapService::new(inventory.clone()));
        let reservations = Arc::new(ReservationService::new(
            inventory.clone(),
            bookings.clone(),
            promo_service.clone(),
        ));
        let payments = Arc::new(PaymentService::new(
            inventory.clone(),
            bookings.clone(),
            promo_service,
            gateway,
            config.payment_key_secret.clone(),
            config.currency.clone(),
        ));
        let checkin = Arc::new(CheckinService::new(bookings.clone()));

        Self {
            inventory,
            bookings,
            promos,
            seat_maps,
            reservations,
            payments,
            checkin,
        }
    }
}

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/showtimes/:id/seat-map", get(get_seat_map))
        .route("/bookings", post(create_booking))
        .route("/bookings/:id", get(get_booking))
        .route("/bookings/:id/order", post(create_payment_order))
        .route("/bookings/:id/verify", post(verify_payment))
        .route("/bookings/:id/cancel", post(cancel_booking))
        .route("/check-in", post(check_in))
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
        .with_state(state)
}
