use chrono::Utc;

use crate::errors::AppError;
use crate::models::{Contact, NewContact, NewSubscriber};
use crate::services::notifications::messages;
use crate::services::{optional, required};
use crate::state::AppState;

pub async fn submit_contact(state: &AppState, req: NewContact) -> Result<Contact, AppError> {
    let first_name = required("firstName", &req.first_name)?.to_string();
    let last_name = optional(req.last_name);
    let email = optional(req.email);
    let service = optional(req.service);
    let message = optional(req.message);

    let contact = state
        .store
        .update(move |doc| {
            let now = Utc::now();
            let contact = Contact {
                id: doc.next_id(now.timestamp_millis()),
                first_name,
                last_name,
                email,
                service,
                message,
                created_at: now,
            };
            doc.contacts.push(contact.clone());
            Ok(contact)
        })
        .await?;

    tracing::info!(id = contact.id, first_name = %contact.first_name, "contact inquiry stored");

    state
        .notifications
        .dispatch(messages::inquiry_alert(&state.config.receiver_email, &contact));

    Ok(contact)
}

/// Returns `true` when the address was newly added.
pub async fn subscribe(state: &AppState, req: NewSubscriber) -> Result<bool, AppError> {
    let email = required("email", &req.email)?.to_string();

    let added = state
        .store
        .update(move |doc| {
            if doc.subscribers.contains(&email) {
                return Ok(false);
            }
            doc.subscribers.push(email);
            Ok(true)
        })
        .await?;

    if added {
        tracing::info!("new subscriber added");
    }
    Ok(added)
}
