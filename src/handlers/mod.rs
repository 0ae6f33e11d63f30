pub mod admin;
pub mod bookings;
pub mod health;
pub mod inquiries;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// JSON API routes. Static files and middleware are layered on in `main`.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/book", post(bookings::create_booking))
        .route("/api/booked-slots", get(bookings::booked_slots))
        .route("/api/cancel-booking", post(bookings::cancel_booking))
        .route("/api/admin/bookings", get(admin::get_bookings))
        .route("/api/contact", post(inquiries::submit_contact))
        .route("/api/subscribe", post(inquiries::subscribe))
        .with_state(state)
}
