//! Ledger account endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::{BookingId, Money};
use ledger::{ApplyOutcome, PaymentOutcome, WithdrawOutcome};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::auth::{AuthUser, RequestToken};
use crate::callbacks::PaymentSender;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct DepositRequest {
    pub delta: i64,
}

#[derive(Deserialize)]
pub struct WithdrawRequest {
    pub booking_id: BookingId,
    pub amount: i64,
}

// -- Response types --

#[derive(Serialize)]
pub struct BalanceResponse {
    pub balance: i64,
}

// -- Handlers --

/// GET /account/balance — the user's committed balance.
#[tracing::instrument(skip(state))]
pub async fn balance(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state.ledger.balance(user_id).await?;
    Ok(Json(BalanceResponse {
        balance: balance.cents(),
    }))
}

/// POST /account/reserve — reserve the idempotency token from
/// `X-Request-Id` as a pending entry.
///
/// Reserving an already-reserved token is accepted as a no-op.
#[tracing::instrument(skip(state))]
pub async fn reserve(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    RequestToken(token): RequestToken,
) -> Result<StatusCode, ApiError> {
    state.ledger.reserve_token(user_id, token).await?;
    Ok(StatusCode::OK)
}

/// POST /account/deposit — commit a deposit under the token from
/// `X-Request-Id`.
#[tracing::instrument(skip(state, req))]
pub async fn deposit(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    RequestToken(token): RequestToken,
    Json(req): Json<DepositRequest>,
) -> Result<StatusCode, ApiError> {
    match state
        .ledger
        .apply(user_id, token, Money::from_cents(req.delta))
        .await?
    {
        ApplyOutcome::Applied => Ok(StatusCode::OK),
        ApplyOutcome::NoMatchingReservation => Err(ApiError::Conflict(
            "no matching reservation for token".to_string(),
        )),
    }
}

/// POST /account/withdraw — commit a withdrawal under the token from
/// `X-Request-Id`.
///
/// The outcome is reported synchronously to the caller and also delivered
/// asynchronously through the payment callback, which is what the saga
/// orchestrator acts on.
#[tracing::instrument(skip(state, req))]
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    RequestToken(token): RequestToken,
    Json(req): Json<WithdrawRequest>,
) -> Result<StatusCode, ApiError> {
    let amount = Money::from_cents(req.amount);
    let outcome = state.ledger.withdraw(user_id, token, amount).await?;

    let callback = match outcome {
        WithdrawOutcome::Applied => PaymentOutcome::succeeded(req.booking_id, user_id, amount),
        WithdrawOutcome::InsufficientFunds | WithdrawOutcome::NoMatchingReservation => {
            PaymentOutcome::failed(req.booking_id, user_id, amount)
        }
    };
    if let Err(e) = state.payments.send(callback).await {
        tracing::error!(error = %e, "failed to deliver payment outcome callback");
    }

    match outcome {
        WithdrawOutcome::Applied => Ok(StatusCode::OK),
        WithdrawOutcome::InsufficientFunds => {
            Err(ApiError::Conflict("insufficient funds".to_string()))
        }
        WithdrawOutcome::NoMatchingReservation => Err(ApiError::Conflict(
            "no matching reservation for token".to_string(),
        )),
    }
}
