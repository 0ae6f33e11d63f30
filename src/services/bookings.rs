use chrono::Utc;

use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, CancelRequest, NewBooking, Slot};
use crate::services::notifications::messages;
use crate::services::{optional, required};
use crate::state::AppState;

/// Reserve a slot. Fails with `SlotConflict` when another booking that is not
/// cancelled already holds the same `(date, time)`.
///
/// The returned booking carries the cancel token; this is the only time it is
/// handed out.
pub async fn create_booking(state: &AppState, req: NewBooking) -> Result<Booking, AppError> {
    let name = required("name", &req.name)?.to_string();
    let email = required("email", &req.email)?.to_string();
    let date = required("date", &req.date)?.to_string();
    let time = required("time", &req.time)?.to_string();
    let phone = optional(req.phone);
    let service = optional(req.service);

    let booking = state
        .store
        .update(move |doc| {
            if doc.bookings.iter().any(|b| b.occupies(&date, &time)) {
                tracing::info!(date = %date, time = %time, "slot already taken");
                return Err(AppError::SlotConflict);
            }

            let now = Utc::now();
            let booking = Booking {
                id: doc.next_id(now.timestamp_millis()),
                cancel_token: uuid::Uuid::new_v4().to_string(),
                name,
                email,
                phone,
                service,
                date,
                time,
                status: BookingStatus::Confirmed,
                created_at: now,
            };
            doc.bookings.push(booking.clone());
            Ok(booking)
        })
        .await?;

    tracing::info!(
        id = booking.id,
        name = %booking.name,
        date = %booking.date,
        time = %booking.time,
        "booking confirmed"
    );

    state.notifications.dispatch(messages::new_booking_alert(
        &state.config.receiver_email,
        &booking,
    ));
    if state.config.send_confirmations {
        let link = state.config.cancel_link(&booking.cancel_token);
        state
            .notifications
            .dispatch(messages::booking_confirmation(&booking, &link));
    }

    Ok(booking)
}

/// Slots held by bookings that are not cancelled, read fresh from the store.
pub async fn list_open_slots(state: &AppState) -> Vec<Slot> {
    state
        .store
        .read()
        .await
        .bookings
        .iter()
        .filter(|b| b.holds_slot())
        .map(Booking::slot)
        .collect()
}

/// Every booking regardless of status. Callers must gate access.
pub async fn list_all_bookings(state: &AppState) -> Vec<Booking> {
    state.store.read().await.bookings
}

/// Cancel by token, falling back to id. Cancelling an already cancelled
/// booking succeeds again without changing anything.
pub async fn cancel_booking(state: &AppState, req: CancelRequest) -> Result<Booking, AppError> {
    let token = optional(req.token);
    let id = req.id;
    if token.is_none() && id.is_none() {
        return Err(AppError::InvalidInput(
            "A cancel token or booking id is required".to_string(),
        ));
    }

    let booking = state
        .store
        .update(move |doc| {
            let by_token = token
                .as_deref()
                .and_then(|t| doc.bookings.iter().position(|b| b.cancel_token == t));
            let index = by_token
                .or_else(|| {
                    id.as_ref()
                        .and_then(|id| doc.bookings.iter().position(|b| id.matches(b.id)))
                })
                .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;

            let booking = &mut doc.bookings[index];
            booking.status = BookingStatus::Cancelled;
            Ok(booking.clone())
        })
        .await?;

    tracing::info!(
        id = booking.id,
        date = %booking.date,
        time = %booking.time,
        "booking cancelled"
    );

    state.notifications.dispatch(messages::cancellation_alert(
        &state.config.receiver_email,
        &booking,
    ));

    Ok(booking)
}
