use std::time::Duration;

use reqwest::header;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::OneSignalConfig;

use super::payload::{CreateUserPayload, TagPatchPayload};

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("OneSignal {0} is not configured")]
    MissingCredential(&'static str),

    #[error("OneSignal API error (HTTP {status})")]
    Api { status: u16, errors: Vec<String> },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ProviderError {
    /// First provider-reported error detail, or the transport error text.
    pub fn detail(&self) -> String {
        match self {
            ProviderError::Api { status, errors } => errors
                .first()
                .cloned()
                .unwrap_or_else(|| format!("OneSignal returned HTTP {status}")),
            other => other.to_string(),
        }
    }
}

/// Client for the OneSignal REST API.
///
/// Bound to one app id and one API key at construction; safe to share across
/// concurrent requests. Every call is a single round trip with no retry.
#[derive(Debug, Clone)]
pub struct ProviderGateway {
    pub(super) http: reqwest::Client,
    pub(super) api_url: String,
    pub(super) legacy_api_url: String,
    pub(super) app_id: String,
    pub(super) api_key: String,
}

impl ProviderGateway {
    pub fn new(cfg: &OneSignalConfig) -> Result<Self, ProviderError> {
        if cfg.app_id.trim().is_empty() {
            return Err(ProviderError::MissingCredential("app_id"));
        }
        if cfg.api_key.trim().is_empty() {
            return Err(ProviderError::MissingCredential("api_key"));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            api_url: cfg.api_url.trim_end_matches('/').to_string(),
            legacy_api_url: cfg.legacy_api_url.trim_end_matches('/').to_string(),
            app_id: cfg.app_id.clone(),
            api_key: cfg.api_key.clone(),
        })
    }

    pub(super) fn auth_header(&self) -> String {
        format!("Key {}", self.api_key)
    }

    /// Create a push or email notification; returns the provider response
    /// (id, recipient count, ...).
    pub async fn create_notification<P: Serialize>(
        &self,
        payload: &P,
    ) -> Result<Value, ProviderError> {
        let url = format!("{}/notifications", self.api_url);
        self.execute(self.http.post(url).json(payload)).await
    }

    /// Fetch the delivery status of a notification by provider-assigned id.
    pub async fn notification_status(&self, id: &str) -> Result<Value, ProviderError> {
        let url = format!("{}/notifications/{id}", self.api_url);
        self.execute(self.http.get(url).query(&[("app_id", &self.app_id)]))
            .await
    }

    /// Cancel a scheduled, not-yet-delivered notification.
    pub async fn cancel_notification(&self, id: &str) -> Result<Value, ProviderError> {
        let url = format!("{}/notifications/{id}", self.api_url);
        self.execute(self.http.delete(url).query(&[("app_id", &self.app_id)]))
            .await
    }

    pub async fn create_user(
        &self,
        payload: &CreateUserPayload,
    ) -> Result<Value, ProviderError> {
        let url = format!("{}/apps/{}/users", self.api_url, self.app_id);
        self.execute(self.http.post(url).json(payload)).await
    }

    /// Patch tags on one user record, addressed by external id.
    pub async fn update_user_tags(
        &self,
        external_id: &str,
        payload: &TagPatchPayload,
    ) -> Result<Value, ProviderError> {
        let url = format!(
            "{}/apps/{}/users/by/external_id/{external_id}",
            self.api_url, self.app_id
        );
        self.execute(self.http.patch(url).json(payload)).await
    }

    /// Diagnostic: fetch the app record the gateway is configured for.
    pub async fn app_info(&self) -> Result<Value, ProviderError> {
        let url = format!("{}/apps/{}", self.api_url, self.app_id);
        self.execute(self.http.get(url)).await
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Value, ProviderError> {
        let response = request
            .header(header::AUTHORIZATION, self.auth_header())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            tracing::debug!(status = status.as_u16(), "OneSignal call succeeded");
            if body.trim().is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)));
        }

        let errors = extract_errors(&body, status.as_u16());
        tracing::warn!(
            status = status.as_u16(),
            error = %errors.first().map(String::as_str).unwrap_or(""),
            "OneSignal call failed"
        );
        Err(ProviderError::Api {
            status: status.as_u16(),
            errors,
        })
    }
}

/// Pull the provider's error-detail array out of a non-2xx body.
///
/// OneSignal reports `{"errors": [...]}` where entries are strings or
/// objects; anything unparseable falls back to the raw body text.
fn extract_errors(body: &str, status: u16) -> Vec<String> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let errors = parsed
        .as_ref()
        .and_then(|v| v.get("errors"))
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .map(|entry| match entry {
                    Value::String(s) => s.clone(),
                    Value::Object(obj) => obj
                        .get("message")
                        .or_else(|| obj.get("title"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| entry.to_string()),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
        });

    match errors {
        Some(list) if !list.is_empty() => list,
        _ if !body.trim().is_empty() => vec![body.trim().to_string()],
        _ => vec![format!("OneSignal returned HTTP {status}")],
    }
}
