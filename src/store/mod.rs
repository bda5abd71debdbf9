pub mod bookings;
pub mod inventory;
pub mod promos;

pub use bookings::BookingStore;
pub use inventory::InventoryStore;
pub use promos::PromoStore;
