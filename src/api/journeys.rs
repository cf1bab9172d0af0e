//! User graph and journey endpoints.
//!
//! Journeys run provider-side; this service only creates user records and
//! flips the segment tags that admit users into them.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::provider::{tag_patch_payload, user_payload};
use crate::server::AppState;

use super::models::{
    ConnectionResponse, CreateUserRequest, JourneyResponse, TriggerJourneyRequest, UserResponse,
};
use super::validate::{is_valid_email, present, require_fields};

/// Diagnostic dual-path connectivity probe against the provider.
#[tracing::instrument(name = "api.test_connection", skip(state))]
pub async fn test_connection(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.gateway.probe_connectivity().await;

    let status = if report.reachable {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    let body = ConnectionResponse {
        success: report.reachable,
        message: report
            .via
            .map(|via| format!("Connected to OneSignal via {via}")),
        error: (!report.reachable)
            .then(|| "OneSignal is unreachable with the configured credentials".to_string()),
        via: report.via,
        attempts: report.attempts,
        hint: report.hint,
    };

    (status, Json(body))
}

/// Create a user record in the provider's user graph.
#[tracing::instrument(name = "api.create_user", skip(state, request))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>> {
    require_fields(&[
        ("externalId", present(&request.external_id)),
        ("email", present(&request.email)),
        ("firstName", present(&request.first_name)),
    ])?;

    let email = request.email.as_deref().unwrap_or_default();
    if !is_valid_email(email) {
        return Err(AppError::Validation(format!(
            "Invalid email address: {email}"
        )));
    }

    let external_id = request.external_id.as_deref().unwrap_or_default();
    let payload = user_payload(
        external_id,
        Some(email),
        request.first_name.as_deref().unwrap_or_default(),
        request.company_name.as_deref(),
    );

    let user = state.gateway.create_user(&payload).await?;
    Ok(Json(UserResponse {
        success: true,
        message: format!("User {external_id} created"),
        user,
    }))
}

/// Patch one segment tag on one user record, admitting them into a journey.
#[tracing::instrument(
    name = "api.trigger_journey",
    skip(state, request),
    fields(segment_tag = %request.segment_tag)
)]
pub async fn trigger_journey(
    State(state): State<AppState>,
    Json(request): Json<TriggerJourneyRequest>,
) -> Result<Json<JourneyResponse>> {
    require_fields(&[("externalId", present(&request.external_id))])?;

    let external_id = request.external_id.unwrap_or_default();
    let payload = tag_patch_payload(&request.segment_tag, &request.segment_value);
    state
        .gateway
        .update_user_tags(&external_id, &payload)
        .await?;

    let mut tags = Map::new();
    tags.insert(
        request.segment_tag.clone(),
        Value::String(request.segment_value.clone()),
    );

    Ok(Json(JourneyResponse {
        success: true,
        message: format!(
            "Tag {}={} applied to user {external_id}",
            request.segment_tag, request.segment_value
        ),
        external_id,
        tags,
    }))
}
