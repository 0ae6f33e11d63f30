use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::errors::AppError;
use crate::models::{NewContact, NewSubscriber};
use crate::services::inquiries;
use crate::state::AppState;

// POST /api/contact
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewContact>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(payload) = payload?;
    inquiries::submit_contact(&state, payload).await?;
    Ok(Json(serde_json::json!({ "message": "Sent" })))
}

// POST /api/subscribe
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewSubscriber>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(payload) = payload?;
    inquiries::subscribe(&state, payload).await?;
    Ok(Json(serde_json::json!({ "message": "Done" })))
}
