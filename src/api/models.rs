//! Request and response models for the gateway API.
//!
//! Inbound fields follow the caller contract (camelCase); every field is
//! optional at the serde level so handlers can report missing fields as a
//! 400 instead of a deserialization failure.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::provider::ProbeAttempt;
use crate::scheduling::DelayAmount;

/// One email address or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Recipients::One(addr) => vec![addr.clone()],
            Recipients::Many(list) => list.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushRequest {
    pub user_id: Option<String>,
    pub segment: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub data: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayedPushRequest {
    #[serde(flatten)]
    pub push: PushRequest,
    pub delay_amount: Option<DelayAmount>,
    pub delay_unit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentPushRequest {
    pub segment: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub data: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    pub email: Option<Recipients>,
    pub subject: Option<String>,
    pub body: Option<String>,
    /// Optional alias linking the email to a user's external id.
    pub user_id: Option<String>,
    pub custom_data: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayedEmailRequest {
    #[serde(flatten)]
    pub email: EmailRequest,
    pub delay_amount: Option<DelayAmount>,
    pub delay_unit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentEmailRequest {
    pub segment: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub custom_data: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub external_id: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub company_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerJourneyRequest {
    pub external_id: Option<String>,
    #[serde(default = "default_segment_tag")]
    pub segment_tag: String,
    #[serde(default = "default_segment_value")]
    pub segment_value: String,
}

fn default_segment_tag() -> String {
    "new_users".to_string()
}

fn default_segment_value() -> String {
    "true".to_string()
}

/// Success envelope for notification and email sends.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipients: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub success: bool,
    pub notification: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub success: bool,
    pub message: String,
    pub user: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyResponse {
    pub success: bool,
    pub message: String,
    pub external_id: String,
    pub tags: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<&'static str>,
    pub attempts: Vec<ProbeAttempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recipients_accepts_one_or_many() {
        let one: Recipients = serde_json::from_value(json!("a@b.co")).unwrap();
        assert_eq!(one.to_vec(), vec!["a@b.co".to_string()]);

        let many: Recipients =
            serde_json::from_value(json!(["a@b.co", "c@d.co"])).unwrap();
        assert_eq!(many.to_vec().len(), 2);
    }

    #[test]
    fn test_delayed_push_request_flattens() {
        let request: DelayedPushRequest = serde_json::from_value(json!({
            "userId": "u1",
            "title": "T",
            "body": "B",
            "delayAmount": 5,
            "delayUnit": "minutes"
        }))
        .unwrap();

        assert_eq!(request.push.user_id.as_deref(), Some("u1"));
        assert_eq!(request.delay_unit.as_deref(), Some("minutes"));
        assert!(matches!(
            request.delay_amount,
            Some(DelayAmount::Duration(5))
        ));
    }

    #[test]
    fn test_journey_request_defaults() {
        let request: TriggerJourneyRequest =
            serde_json::from_value(json!({"externalId": "u1"})).unwrap();
        assert_eq!(request.segment_tag, "new_users");
        assert_eq!(request.segment_value, "true");
    }

    #[test]
    fn test_send_response_omits_absent_fields() {
        let response = SendResponse {
            success: true,
            message: "ok".to_string(),
            notification_id: None,
            recipients: None,
            target: None,
            scheduled_for: None,
        };
        let wire = serde_json::to_value(&response).unwrap();
        assert_eq!(wire, json!({"success": true, "message": "ok"}));
    }
}
