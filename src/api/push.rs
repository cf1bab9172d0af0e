//! Push notification endpoints.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde_json::Value;

use crate::error::Result;
use crate::provider::{push_payload, Target};
use crate::scheduling::{self, DelayAmount, ScheduleError, DEFAULT_DELAY_SECONDS};
use crate::server::AppState;

use super::models::{
    CancelResponse, DelayedPushRequest, PushRequest, SegmentPushRequest, SendResponse,
    StatusResponse,
};
use super::validate::{present, require_fields};

/// Send a push notification immediately.
#[tracing::instrument(name = "api.send_push", skip(state, request))]
pub async fn send_push(
    State(state): State<AppState>,
    Json(request): Json<PushRequest>,
) -> Result<Json<SendResponse>> {
    forward_push(&state, request, None, "Push notification sent").await
}

/// Send a push notification after a delay, or at a recipient-local time.
#[tracing::instrument(name = "api.send_delayed_push", skip(state, request))]
pub async fn send_delayed_push(
    State(state): State<AppState>,
    Json(request): Json<DelayedPushRequest>,
) -> Result<Json<SendResponse>> {
    let unit = request.delay_unit.as_deref().unwrap_or("seconds");
    if !scheduling::is_valid_unit(unit) {
        return Err(ScheduleError::InvalidUnit(unit.to_string()).into());
    }

    let amount = request
        .delay_amount
        .unwrap_or(DelayAmount::Duration(DEFAULT_DELAY_SECONDS));
    let directive = scheduling::normalize(&amount, unit, Utc::now)?;

    forward_push(
        &state,
        request.push,
        Some(directive),
        "Push notification scheduled",
    )
    .await
}

/// Send a push notification to every user in a named segment.
#[tracing::instrument(name = "api.send_segment_push", skip(state, request))]
pub async fn send_segment_push(
    State(state): State<AppState>,
    Json(request): Json<SegmentPushRequest>,
) -> Result<Json<SendResponse>> {
    require_fields(&[
        ("segment", present(&request.segment)),
        ("title", present(&request.title)),
        ("body", present(&request.body)),
    ])?;

    let target = Target::Segment(request.segment.unwrap_or_default());
    let payload = push_payload(
        &state.settings.onesignal.app_id,
        &target,
        request.title.as_deref().unwrap_or_default(),
        request.body.as_deref().unwrap_or_default(),
        request.data,
        None,
    );

    let response = state.gateway.create_notification(&payload).await?;
    Ok(Json(send_response(
        "Push notification sent to segment",
        &response,
        &target,
        None,
    )))
}

/// Fetch delivery status for a notification by provider-assigned id.
#[tracing::instrument(name = "api.push_status", skip(state))]
pub async fn push_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>> {
    let notification = state.gateway.notification_status(&id).await?;
    Ok(Json(StatusResponse {
        success: true,
        notification,
    }))
}

/// Cancel a scheduled, not-yet-delivered notification.
#[tracing::instrument(name = "api.cancel_push", skip(state))]
pub async fn cancel_push(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CancelResponse>> {
    state.gateway.cancel_notification(&id).await?;
    Ok(Json(CancelResponse {
        success: true,
        message: format!("Notification {id} cancelled"),
    }))
}

async fn forward_push(
    state: &AppState,
    request: PushRequest,
    directive: Option<scheduling::SendDirective>,
    message: &str,
) -> Result<Json<SendResponse>> {
    require_fields(&[
        ("title", present(&request.title)),
        ("body", present(&request.body)),
        (
            "userId or segment",
            present(&request.user_id) || present(&request.segment),
        ),
    ])?;

    let target = Target::resolve(request.user_id.as_deref(), request.segment.as_deref());
    let payload = push_payload(
        &state.settings.onesignal.app_id,
        &target,
        request.title.as_deref().unwrap_or_default(),
        request.body.as_deref().unwrap_or_default(),
        request.data,
        directive.as_ref(),
    );

    let response = state.gateway.create_notification(&payload).await?;
    Ok(Json(send_response(
        message,
        &response,
        &target,
        directive.as_ref(),
    )))
}

fn send_response(
    message: &str,
    provider_response: &Value,
    target: &Target,
    directive: Option<&scheduling::SendDirective>,
) -> SendResponse {
    SendResponse {
        success: true,
        message: message.to_string(),
        notification_id: provider_response
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string),
        recipients: provider_response.get("recipients").and_then(Value::as_u64),
        target: Some(target.summary()),
        scheduled_for: directive.map(scheduling::SendDirective::summary),
    }
}
