use axum::Router;
use chrono::{Duration, Utc};
use dotenvy::dotenv;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use uuid::Uuid;

use boxoffice_server::config::Config;
use boxoffice_server::models::{
    DiscountKind, Program, PromoCode, Screen, Seat, SeatKind, SeatRow, Showtime,
};
use boxoffice_server::routes::{create_routes, AppState};
use boxoffice_server::services::{spawn_hold_sweeper, MockGateway};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    let state = AppState::new(&config, MockGateway::shared());

    if config.seed_demo_data {
        seed_demo_data(&state);
    }

    let _sweeper = spawn_hold_sweeper(
        state.inventory.clone(),
        state.bookings.clone(),
        config.sweep_interval_secs,
    );
    tracing::info!(
        hold_ttl_minutes = config.hold_ttl_minutes,
        sweep_interval_secs = config.sweep_interval_secs,
        "Hold-expiry sweeper started"
    );

    let app: Router = create_routes(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}

/// Installs one screen, one showtime and two promo codes so the API is
/// drivable without the external catalog services.
fn seed_demo_data(state: &AppState) {
    let screen_id = Uuid::new_v4();
    let showtime_id = Uuid::new_v4();
    let venue_id = Uuid::new_v4();

    let rows: Vec<SeatRow> = ["A", "B", "C", "D"]
        .iter()
        .map(|row_id| SeatRow {
            row_id: row_id.to_string(),
            seats: (1..=8)
                .map(|seat_number| Seat {
                    seat_number,
                    kind: match *row_id {
                        "A" => SeatKind::Recliner,
                        "B" => SeatKind::Premium,
                        _ => SeatKind::Regular,
                    },
                })
                .collect(),
        })
        .collect();

    let screen = Screen {
        id: screen_id,
        venue_id,
        name: "Audi 1".to_string(),
        rows,
    };
    let total_seats = screen.sellable_seats();
    state.inventory.insert_screen(screen);

    state.inventory.insert_showtime(Showtime {
        id: showtime_id,
        program: Program::Movie {
            movie_id: Uuid::new_v4(),
            title: "Interstellar".to_string(),
        },
        venue_id,
        screen_id,
        screen_name: "Audi 1".to_string(),
        start_time: Utc::now() + Duration::hours(24),
        end_time: Utc::now() + Duration::hours(27),
        is_active: true,
        total_seats,
        booked: Default::default(),
        held: Default::default(),
        prices: HashMap::from([
            (SeatKind::Regular, Decimal::from(250)),
            (SeatKind::Premium, Decimal::from(400)),
            (SeatKind::Recliner, Decimal::from(650)),
        ]),
        created_at: Utc::now(),
    });

    state.promos.insert(PromoCode {
        code: "WELCOME10".to_string(),
        kind: DiscountKind::Percentage,
        value: Decimal::from(10),
        min_purchase_amount: Decimal::from(200),
        max_discount_amount: Some(Decimal::from(100)),
        valid_from: None,
        valid_until: None,
        max_uses: None,
        use_count: 0,
        is_active: true,
    });
    state.promos.insert(PromoCode {
        code: "FLAT50".to_string(),
        kind: DiscountKind::Fixed,
        value: Decimal::from(50),
        min_purchase_amount: Decimal::from(500),
        max_discount_amount: None,
        valid_from: None,
        valid_until: None,
        max_uses: Some(100),
        use_count: 0,
        is_active: true,
    });

    tracing::info!(
        showtime_id = %showtime_id,
        screen_id = %screen_id,
        "Demo data seeded (promo codes WELCOME10, FLAT50)"
    );
}
