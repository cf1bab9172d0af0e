//! OneSignal wire-format payloads.
//!
//! Field names here are the provider's API contract; they must serialize
//! exactly as OneSignal expects them.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::scheduling::SendDirective;

/// Segment used when a request names neither a user nor a segment.
pub const DEFAULT_SEGMENT: &str = "Subscribed Users";

/// Tag subscriptions of type `Email` are keyed by this literal on the wire.
const EMAIL_SUBSCRIPTION_TYPE: &str = "Email";

/// Resolved delivery target for a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Address one user by their stable external identifier.
    ExternalUser(String),
    /// Address a provider-managed segment by name.
    Segment(String),
}

impl Target {
    /// Resolve a target from optional caller fields.
    ///
    /// Precedence: external user id > segment name > [`DEFAULT_SEGMENT`].
    /// Blank strings count as absent.
    pub fn resolve(user_id: Option<&str>, segment: Option<&str>) -> Self {
        if let Some(id) = user_id.filter(|s| !s.trim().is_empty()) {
            return Target::ExternalUser(id.to_string());
        }
        if let Some(name) = segment.filter(|s| !s.trim().is_empty()) {
            return Target::Segment(name.to_string());
        }
        Target::Segment(DEFAULT_SEGMENT.to_string())
    }

    pub fn summary(&self) -> String {
        match self {
            Target::ExternalUser(id) => format!("user {id}"),
            Target::Segment(name) => format!("segment \"{name}\""),
        }
    }
}

/// Language-keyed text block. OneSignal requires headings and contents keyed
/// by language even when only English is used.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LocalizedText {
    pub en: String,
}

impl LocalizedText {
    pub fn english(text: impl Into<String>) -> Self {
        Self { en: text.into() }
    }
}

/// Scheduling fields merged into a notification payload. The two shapes are
/// mutually exclusive on the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ScheduleFields {
    SendAfter {
        send_after: String,
    },
    TimeOfDay {
        delayed_option: &'static str,
        delivery_time_of_day: String,
    },
}

impl From<&SendDirective> for ScheduleFields {
    fn from(directive: &SendDirective) -> Self {
        match directive {
            SendDirective::SendAfter(ts) => ScheduleFields::SendAfter {
                send_after: SendDirective::send_after_rfc3339(ts),
            },
            SendDirective::TimeOfDay(time) => ScheduleFields::TimeOfDay {
                delayed_option: "timezone",
                delivery_time_of_day: time.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PushPayload {
    pub app_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_external_user_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included_segments: Option<Vec<String>>,
    pub headings: LocalizedText,
    pub contents: LocalizedText,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub schedule: Option<ScheduleFields>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailPayload {
    pub app_id: String,
    pub email_subject: String,
    pub email_body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_email_tokens: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included_segments: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_external_user_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub schedule: Option<ScheduleFields>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserIdentity {
    pub external_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserProperties {
    pub tags: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailSubscription {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateUserPayload {
    pub identity: UserIdentity,
    pub properties: UserProperties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriptions: Option<Vec<EmailSubscription>>,
}

/// Single tag key/value patch, addressed by external id at the URL level.
#[derive(Debug, Clone, Serialize)]
pub struct TagPatchPayload {
    pub properties: UserProperties,
}

fn non_empty(data: Option<Map<String, Value>>) -> Option<Map<String, Value>> {
    data.filter(|map| !map.is_empty())
}

pub fn push_payload(
    app_id: &str,
    target: &Target,
    title: &str,
    body: &str,
    data: Option<Map<String, Value>>,
    schedule: Option<&SendDirective>,
) -> PushPayload {
    let (user_ids, segments) = match target {
        Target::ExternalUser(id) => (Some(vec![id.clone()]), None),
        Target::Segment(name) => (None, Some(vec![name.clone()])),
    };

    PushPayload {
        app_id: app_id.to_string(),
        include_external_user_ids: user_ids,
        included_segments: segments,
        headings: LocalizedText::english(title),
        contents: LocalizedText::english(body),
        data: non_empty(data),
        schedule: schedule.map(ScheduleFields::from),
    }
}

pub fn email_payload(
    app_id: &str,
    recipients: &[String],
    user_id: Option<&str>,
    subject: &str,
    body: &str,
    data: Option<Map<String, Value>>,
    schedule: Option<&SendDirective>,
) -> EmailPayload {
    EmailPayload {
        app_id: app_id.to_string(),
        email_subject: subject.to_string(),
        email_body: body.to_string(),
        include_email_tokens: Some(recipients.to_vec()),
        included_segments: None,
        include_external_user_ids: user_id
            .filter(|s| !s.trim().is_empty())
            .map(|id| vec![id.to_string()]),
        data: non_empty(data),
        schedule: schedule.map(ScheduleFields::from),
    }
}

pub fn segment_email_payload(
    app_id: &str,
    segment: &str,
    subject: &str,
    body: &str,
    data: Option<Map<String, Value>>,
    schedule: Option<&SendDirective>,
) -> EmailPayload {
    EmailPayload {
        app_id: app_id.to_string(),
        email_subject: subject.to_string(),
        email_body: body.to_string(),
        include_email_tokens: None,
        included_segments: Some(vec![segment.to_string()]),
        include_external_user_ids: None,
        data: non_empty(data),
        schedule: schedule.map(ScheduleFields::from),
    }
}

pub fn user_payload(
    external_id: &str,
    email: Option<&str>,
    first_name: &str,
    company_name: Option<&str>,
) -> CreateUserPayload {
    let mut tags = Map::new();
    tags.insert("first_name".to_string(), Value::String(first_name.to_string()));
    if let Some(company) = company_name.filter(|s| !s.trim().is_empty()) {
        tags.insert("company".to_string(), Value::String(company.to_string()));
    }

    let subscriptions = email.filter(|s| !s.trim().is_empty()).map(|token| {
        vec![EmailSubscription {
            kind: EMAIL_SUBSCRIPTION_TYPE,
            token: token.to_string(),
        }]
    });

    CreateUserPayload {
        identity: UserIdentity {
            external_id: external_id.to_string(),
        },
        properties: UserProperties { tags },
        subscriptions,
    }
}

pub fn tag_patch_payload(tag: &str, value: &str) -> TagPatchPayload {
    let mut tags = Map::new();
    tags.insert(tag.to_string(), Value::String(value.to_string()));
    TagPatchPayload {
        properties: UserProperties { tags },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn data_map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_target_precedence_user_wins() {
        let target = Target::resolve(Some("u1"), Some("Beta Testers"));
        assert_eq!(target, Target::ExternalUser("u1".to_string()));
    }

    #[test]
    fn test_target_defaults_to_subscribed_users() {
        assert_eq!(
            Target::resolve(None, None),
            Target::Segment(DEFAULT_SEGMENT.to_string())
        );
        // Blank strings count as absent
        assert_eq!(
            Target::resolve(Some("  "), Some("")),
            Target::Segment(DEFAULT_SEGMENT.to_string())
        );
    }

    #[test]
    fn test_push_payload_emits_one_targeting_mode() {
        let target = Target::resolve(Some("u1"), Some("Beta Testers"));
        let payload = push_payload("app-1", &target, "Title", "Body", None, None);
        let wire = serde_json::to_value(&payload).unwrap();

        assert_eq!(wire["include_external_user_ids"], json!(["u1"]));
        assert!(wire.get("included_segments").is_none());
    }

    #[test]
    fn test_push_payload_language_keyed_text() {
        let target = Target::Segment("VIP".to_string());
        let payload = push_payload("app-1", &target, "Hello", "World", None, None);
        let wire = serde_json::to_value(&payload).unwrap();

        assert_eq!(wire["headings"], json!({"en": "Hello"}));
        assert_eq!(wire["contents"], json!({"en": "World"}));
        assert_eq!(wire["included_segments"], json!(["VIP"]));
    }

    #[test]
    fn test_empty_data_omitted_entirely() {
        let target = Target::Segment(DEFAULT_SEGMENT.to_string());
        let payload = push_payload(
            "app-1",
            &target,
            "T",
            "B",
            Some(Map::new()),
            None,
        );
        let wire = serde_json::to_value(&payload).unwrap();
        assert!(wire.get("data").is_none());

        let payload = push_payload(
            "app-1",
            &target,
            "T",
            "B",
            Some(data_map(json!({"k": "v"}))),
            None,
        );
        let wire = serde_json::to_value(&payload).unwrap();
        assert_eq!(wire["data"], json!({"k": "v"}));
    }

    #[test]
    fn test_send_after_merge() {
        let ts = chrono::Utc.with_ymd_and_hms(2024, 6, 1, 12, 5, 0).unwrap();
        let directive = SendDirective::SendAfter(ts);
        let target = Target::ExternalUser("u1".to_string());
        let payload = push_payload("app-1", &target, "T", "B", None, Some(&directive));
        let wire = serde_json::to_value(&payload).unwrap();

        assert_eq!(wire["send_after"], json!("2024-06-01T12:05:00Z"));
        assert!(wire.get("delayed_option").is_none());
        assert!(wire.get("delivery_time_of_day").is_none());
    }

    #[test]
    fn test_time_of_day_merge() {
        let directive = SendDirective::TimeOfDay("9:00AM".to_string());
        let target = Target::ExternalUser("u1".to_string());
        let payload = push_payload("app-1", &target, "T", "B", None, Some(&directive));
        let wire = serde_json::to_value(&payload).unwrap();

        assert_eq!(wire["delayed_option"], json!("timezone"));
        assert_eq!(wire["delivery_time_of_day"], json!("9:00AM"));
        assert!(wire.get("send_after").is_none());
    }

    #[test]
    fn test_email_payload_tokens_and_alias() {
        let recipients = vec!["a@b.co".to_string(), "c@d.co".to_string()];
        let payload = email_payload(
            "app-1",
            &recipients,
            Some("u1"),
            "Subject",
            "<p>Body</p>",
            None,
            None,
        );
        let wire = serde_json::to_value(&payload).unwrap();

        assert_eq!(wire["include_email_tokens"], json!(["a@b.co", "c@d.co"]));
        assert_eq!(wire["include_external_user_ids"], json!(["u1"]));
        assert_eq!(wire["email_subject"], json!("Subject"));
        assert_eq!(wire["email_body"], json!("<p>Body</p>"));
        assert!(wire.get("data").is_none());
    }

    #[test]
    fn test_segment_email_payload() {
        let payload =
            segment_email_payload("app-1", "Newsletter", "S", "B", None, None);
        let wire = serde_json::to_value(&payload).unwrap();

        assert_eq!(wire["included_segments"], json!(["Newsletter"]));
        assert!(wire.get("include_email_tokens").is_none());
    }

    #[test]
    fn test_user_payload_email_subscription_optional() {
        let payload = user_payload("u1", Some("a@b.co"), "Ada", Some("Acme"));
        let wire = serde_json::to_value(&payload).unwrap();

        assert_eq!(wire["identity"], json!({"external_id": "u1"}));
        assert_eq!(
            wire["properties"],
            json!({"tags": {"first_name": "Ada", "company": "Acme"}})
        );
        assert_eq!(
            wire["subscriptions"],
            json!([{"type": "Email", "token": "a@b.co"}])
        );

        let payload = user_payload("u2", None, "Grace", None);
        let wire = serde_json::to_value(&payload).unwrap();
        assert!(wire.get("subscriptions").is_none());
        assert_eq!(wire["properties"], json!({"tags": {"first_name": "Grace"}}));
    }

    #[test]
    fn test_tag_patch_touches_single_tag() {
        let payload = tag_patch_payload("new_users", "true");
        let wire = serde_json::to_value(&payload).unwrap();
        assert_eq!(wire, json!({"properties": {"tags": {"new_users": "true"}}}));
    }
}
