//! OneSignal integration: wire-format payloads, the HTTP gateway, and
//! connectivity diagnostics.

mod gateway;
mod payload;
mod probe;

pub use gateway::{ProviderError, ProviderGateway};
pub use payload::{
    email_payload, push_payload, segment_email_payload, tag_patch_payload, user_payload,
    CreateUserPayload, EmailPayload, LocalizedText, PushPayload, ScheduleFields,
    TagPatchPayload, Target, DEFAULT_SEGMENT,
};
pub use probe::{ProbeAttempt, ProbeReport};
