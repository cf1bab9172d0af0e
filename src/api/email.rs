//! Transactional email endpoints.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::provider::{email_payload, segment_email_payload};
use crate::scheduling::{self, DelayAmount, ScheduleError, SendDirective, DEFAULT_DELAY_SECONDS};
use crate::server::AppState;

use super::models::{DelayedEmailRequest, EmailRequest, SegmentEmailRequest, SendResponse};
use super::validate::{is_valid_email, present, require_fields};

/// Send a transactional email immediately.
#[tracing::instrument(name = "api.send_email", skip(state, request))]
pub async fn send_email(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<SendResponse>> {
    forward_email(&state, request, None, "Email sent").await
}

/// Send a transactional email after a delay, or at a recipient-local time.
#[tracing::instrument(name = "api.send_delayed_email", skip(state, request))]
pub async fn send_delayed_email(
    State(state): State<AppState>,
    Json(request): Json<DelayedEmailRequest>,
) -> Result<Json<SendResponse>> {
    let unit = request.delay_unit.as_deref().unwrap_or("seconds");
    if !scheduling::is_valid_unit(unit) {
        return Err(ScheduleError::InvalidUnit(unit.to_string()).into());
    }

    let amount = request
        .delay_amount
        .unwrap_or(DelayAmount::Duration(DEFAULT_DELAY_SECONDS));
    let directive = scheduling::normalize(&amount, unit, Utc::now)?;

    forward_email(&state, request.email, Some(directive), "Email scheduled").await
}

/// Send an email to every subscribed user in a named segment.
#[tracing::instrument(name = "api.send_segment_email", skip(state, request))]
pub async fn send_segment_email(
    State(state): State<AppState>,
    Json(request): Json<SegmentEmailRequest>,
) -> Result<Json<SendResponse>> {
    require_fields(&[
        ("segment", present(&request.segment)),
        ("subject", present(&request.subject)),
        ("body", present(&request.body)),
    ])?;

    let segment = request.segment.unwrap_or_default();
    let payload = segment_email_payload(
        &state.settings.onesignal.app_id,
        &segment,
        request.subject.as_deref().unwrap_or_default(),
        request.body.as_deref().unwrap_or_default(),
        request.custom_data,
        None,
    );

    let response = state.gateway.create_notification(&payload).await?;
    Ok(Json(SendResponse {
        success: true,
        message: "Email sent to segment".to_string(),
        notification_id: provider_id(&response),
        recipients: response.get("recipients").and_then(Value::as_u64),
        target: Some(format!("segment \"{segment}\"")),
        scheduled_for: None,
    }))
}

async fn forward_email(
    state: &AppState,
    request: EmailRequest,
    directive: Option<SendDirective>,
    message: &str,
) -> Result<Json<SendResponse>> {
    let recipients = request
        .email
        .as_ref()
        .map(|r| r.to_vec())
        .unwrap_or_default();

    require_fields(&[
        ("email", !recipients.is_empty()),
        ("subject", present(&request.subject)),
        ("body", present(&request.body)),
    ])?;

    for address in &recipients {
        if !is_valid_email(address) {
            return Err(AppError::Validation(format!(
                "Invalid email address: {address}"
            )));
        }
    }

    let payload = email_payload(
        &state.settings.onesignal.app_id,
        &recipients,
        request.user_id.as_deref(),
        request.subject.as_deref().unwrap_or_default(),
        request.body.as_deref().unwrap_or_default(),
        request.custom_data,
        directive.as_ref(),
    );

    let response = state.gateway.create_notification(&payload).await?;
    Ok(Json(SendResponse {
        success: true,
        message: message.to_string(),
        notification_id: provider_id(&response),
        recipients: response
            .get("recipients")
            .and_then(Value::as_u64)
            .or(Some(recipients.len() as u64)),
        target: None,
        scheduled_for: directive.as_ref().map(SendDirective::summary),
    }))
}

fn provider_id(response: &Value) -> Option<String> {
    response
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
}
