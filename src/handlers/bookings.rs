use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{CancelRequest, NewBooking, Slot};
use crate::services::bookings;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingCreated {
    message: &'static str,
    booking_id: i64,
    cancel_token: String,
}

// POST /api/book
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewBooking>, JsonRejection>,
) -> Result<Json<BookingCreated>, AppError> {
    let Json(payload) = payload?;
    let booking = bookings::create_booking(&state, payload).await?;

    Ok(Json(BookingCreated {
        message: "Booking successful",
        booking_id: booking.id,
        cancel_token: booking.cancel_token,
    }))
}

// GET /api/booked-slots
pub async fn booked_slots(State(state): State<Arc<AppState>>) -> Json<Vec<Slot>> {
    Json(bookings::list_open_slots(&state).await)
}

// POST /api/cancel-booking
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CancelRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(payload) = payload?;
    bookings::cancel_booking(&state, payload).await?;
    Ok(Json(
        serde_json::json!({ "message": "Appointment cancelled successfully" }),
    ))
}
