//! Event catalog and slot endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{BookingId, EventId, Money};
use reservation::EventRecord;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::auth::AuthUser;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub price: i64,
    pub total_slots: u32,
}

#[derive(Deserialize)]
pub struct SlotRequest {
    pub booking_id: BookingId,
    pub event_id: EventId,
}

// -- Response types --

#[derive(Serialize)]
pub struct EventResponse {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub total_slots: u32,
    pub occupied_slots: u32,
}

#[derive(Serialize)]
pub struct OccupyResponse {
    pub held: bool,
}

fn to_response(event: &EventRecord, occupied_slots: u32) -> EventResponse {
    EventResponse {
        id: event.id.to_string(),
        name: event.name.clone(),
        price: event.price.cents(),
        total_slots: event.total_slots,
        occupied_slots,
    }
}

// -- Handlers --

/// POST /events — add an event to the catalog.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    AuthUser(_user_id): AuthUser,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    let event = state
        .pool
        .create_event(&req.name, Money::from_cents(req.price), req.total_slots)
        .await?;

    Ok((StatusCode::CREATED, Json(to_response(&event, 0))))
}

/// GET /events — list catalog events.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    let events = state.pool.list_events().await?;

    let mut responses = Vec::with_capacity(events.len());
    for event in &events {
        let occupied = state.pool.occupied_count(event.id).await?;
        responses.push(to_response(event, occupied));
    }
    Ok(Json(responses))
}

/// GET /events/:id — load an event by ID.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<EventResponse>, ApiError> {
    let event_id = parse_event_id(&id)?;
    let event = state
        .pool
        .get_event(event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Event {id} not found")))?;
    let occupied = state.pool.occupied_count(event_id).await?;

    Ok(Json(to_response(&event, occupied)))
}

/// POST /events/occupy — attempt to occupy a slot.
///
/// The response only acknowledges the attempt; the authoritative outcome
/// reaches the orchestrator through the reservation callback.
#[tracing::instrument(skip(state, req))]
pub async fn occupy(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<SlotRequest>,
) -> Result<Json<OccupyResponse>, ApiError> {
    let held = state
        .pool
        .occupy(req.event_id, req.booking_id, user_id)
        .await?;
    Ok(Json(OccupyResponse { held }))
}

/// POST /events/cancel — release the slot held by a booking.
#[tracing::instrument(skip(state, req))]
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    AuthUser(_user_id): AuthUser,
    Json(req): Json<SlotRequest>,
) -> Result<StatusCode, ApiError> {
    state.pool.cancel(req.event_id, req.booking_id).await?;
    Ok(StatusCode::OK)
}

fn parse_event_id(id: &str) -> Result<EventId, ApiError> {
    let uuid =
        Uuid::parse_str(id).map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    Ok(EventId::from_uuid(uuid))
}
