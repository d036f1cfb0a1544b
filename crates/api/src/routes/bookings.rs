//! Booking endpoints and outcome callback receivers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use booking::Booking;
use common::{BookingId, EventId};
use ledger::PaymentOutcome;
use reservation::ReservationOutcome;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::auth::AuthUser;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub event_id: EventId,
}

// -- Response types --

#[derive(Serialize)]
pub struct BookingAcceptedResponse {
    pub booking_id: String,
    pub status: String,
}

#[derive(Serialize)]
pub struct BookingResponse {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    pub price: Option<i64>,
    pub status: String,
}

fn to_response(booking: &Booking) -> BookingResponse {
    BookingResponse {
        id: booking.id.to_string(),
        user_id: booking.user_id.to_string(),
        event_id: booking.event_id.to_string(),
        price: booking.price.map(|p| p.cents()),
        status: booking.status.to_string(),
    }
}

// -- Handlers --

/// POST /bookings — create a booking and start the saga.
///
/// Responds as soon as the booking is accepted for processing; whatever
/// happens afterwards is visible through the booking's status and the
/// notification side channel, never through this response.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingAcceptedResponse>), ApiError> {
    let booking = state
        .orchestrator
        .create_booking(user_id, req.event_id)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(BookingAcceptedResponse {
            booking_id: booking.id.to_string(),
            status: booking.status.to_string(),
        }),
    ))
}

/// GET /bookings — list all bookings.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let bookings = state.orchestrator.list_bookings().await?;
    Ok(Json(bookings.iter().map(to_response).collect()))
}

/// GET /bookings/:id — load a booking by ID.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking_id = parse_booking_id(&id)?;
    let booking = state
        .orchestrator
        .get_booking(booking_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Booking {id} not found")))?;

    Ok(Json(to_response(&booking)))
}

/// POST /bookings/callback/reservation — reservation outcome callback.
#[tracing::instrument(skip(state, outcome))]
pub async fn reservation_callback(
    State(state): State<Arc<AppState>>,
    AuthUser(_user_id): AuthUser,
    Json(outcome): Json<ReservationOutcome>,
) -> Result<StatusCode, ApiError> {
    state.orchestrator.reservation_outcome(outcome).await?;
    Ok(StatusCode::OK)
}

/// POST /bookings/callback/payment — payment outcome callback.
#[tracing::instrument(skip(state, outcome))]
pub async fn payment_callback(
    State(state): State<Arc<AppState>>,
    AuthUser(_user_id): AuthUser,
    Json(outcome): Json<PaymentOutcome>,
) -> Result<StatusCode, ApiError> {
    state.orchestrator.payment_outcome(outcome).await?;
    Ok(StatusCode::OK)
}

fn parse_booking_id(id: &str) -> Result<BookingId, ApiError> {
    let uuid =
        Uuid::parse_str(id).map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    Ok(BookingId::from_uuid(uuid))
}
