//! Cart API route handlers.
//!
//! All endpoints return JSON. State is the shared `Arc<CartSession>`.
//! Input errors never surface as 5xx: bad selections come back as 422
//! payloads and malformed stake amounts are coerced to zero, mirroring
//! how the cart itself recovers locally.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::cart::stats::CartStatistics;
use crate::engine::coordinator::SubmissionOutcome;
use crate::engine::{CartSession, SlipView};
use crate::types::{BetMode, Selection};

/// Shared state accessible by all route handlers.
pub type AppState = Arc<CartSession>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub slips: Vec<SlipView>,
    pub mode: BetMode,
}

#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub can_submit: bool,
    pub has_unstaked_slips: bool,
    pub is_submitting: bool,
}

#[derive(Debug, Deserialize)]
pub struct ModeUpdate {
    pub mode: BetMode,
}

#[derive(Debug, Deserialize)]
pub struct StakeUpdate {
    /// Lenient by contract: a missing or non-numeric amount is treated
    /// as zero, never as a request error.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct FailedLegResponse {
    pub leg: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub outcome: &'static str,
    pub attempted: usize,
    pub placed: usize,
    pub failed: Vec<FailedLegResponse>,
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let amount = match value {
        serde_json::Value::Number(n) => n.to_string().parse().unwrap_or(Decimal::ZERO),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    };
    Ok(amount)
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

pub async fn get_cart(State(session): State<AppState>) -> Json<CartResponse> {
    Json(CartResponse {
        slips: session.slips().await,
        mode: session.bet_mode().await,
    })
}

pub async fn get_statistics(State(session): State<AppState>) -> Json<CartStatistics> {
    Json(session.statistics().await)
}

pub async fn get_validation(State(session): State<AppState>) -> Json<ValidationResponse> {
    let validation = session.validation().await;
    Json(ValidationResponse {
        can_submit: validation.can_submit,
        has_unstaked_slips: validation.has_unstaked_slips,
        is_submitting: session.is_submitting(),
    })
}

pub async fn add_slip(
    State(session): State<AppState>,
    Json(selection): Json<Selection>,
) -> (StatusCode, Json<serde_json::Value>) {
    match session.add_selection(selection).await {
        Ok(id) => (StatusCode::CREATED, Json(serde_json::json!({ "id": id }))),
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}

pub async fn update_stake(
    State(session): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<StakeUpdate>,
) -> StatusCode {
    session.set_slip_stake(id, update.amount).await;
    StatusCode::NO_CONTENT
}

/// Idempotent: deleting an absent slip is still 204.
pub async fn delete_slip(State(session): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    session.remove_slip(id).await;
    StatusCode::NO_CONTENT
}

pub async fn set_mode(
    State(session): State<AppState>,
    Json(update): Json<ModeUpdate>,
) -> Json<serde_json::Value> {
    session.set_bet_mode(update.mode).await;
    // Report the applied mode: the switch is a no-op below two slips
    Json(serde_json::json!({ "mode": session.bet_mode().await }))
}

pub async fn clear_cart(State(session): State<AppState>) -> StatusCode {
    session.clear_cart().await;
    StatusCode::NO_CONTENT
}

pub async fn submit(State(session): State<AppState>) -> Json<SubmitResponse> {
    let (outcome, report) = match session.submit_bets().await {
        SubmissionOutcome::NotReady => ("not_ready", None),
        SubmissionOutcome::InFlight => ("in_flight", None),
        SubmissionOutcome::Placed(report) => ("placed", Some(report)),
        SubmissionOutcome::Rejected(report) => ("rejected", Some(report)),
    };

    let (attempted, placed, failed) = report
        .map(|r| {
            let failed = r
                .failed
                .into_iter()
                .map(|l| FailedLegResponse {
                    leg: l.description,
                    reason: l.reason,
                })
                .collect();
            (r.attempted, r.placed, failed)
        })
        .unwrap_or((0, 0, Vec::new()));

    Json(SubmitResponse {
        outcome,
        attempted,
        placed,
        failed,
    })
}

pub async fn health() -> &'static str {
    "ok"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
