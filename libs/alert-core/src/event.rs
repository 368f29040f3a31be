use chrono::{DateTime, Utc};
use serde_json::Value;

pub const DEFAULT_EVENT_NAME: &str = "GetObject";
pub const DEFAULT_EVENT_SOURCE: &str = "s3.amazonaws.com";
const EVENT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Flat view of the CloudTrail record carried in an EventBridge event's
/// `detail`. Every field is already defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedEvent {
    pub event_name: String,
    pub event_source: String,
    pub account_id: String,
    pub event_time: String,
    pub bucket: Option<String>,
    pub key: Option<String>,
    pub source_ip: Option<String>,
    pub user_agent: String,
    pub identity_type: String,
    pub identity_arn: Option<String>,
    pub access_key_id: Option<String>,
}

// Empty strings, nulls and values of the wrong type all count as absent.
fn str_field<'a>(record: Option<&'a Value>, name: &str) -> Option<&'a str> {
    record?
        .get(name)?
        .as_str()
        .filter(|value| !value.is_empty())
}

fn object_field<'a>(record: Option<&'a Value>, name: &str) -> Option<&'a Value> {
    record?.get(name).filter(|value| value.is_object())
}

fn owned_or(value: Option<&str>, default: &str) -> String {
    value.unwrap_or(default).to_string()
}

/// Percent-decodes an object key as it appears in CloudTrail.
/// `+` is kept literally and invalid UTF-8 is replaced, so this never fails.
pub fn decode_object_key(key: &str) -> String {
    let bytes = urlencoding::decode_binary(key.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

pub fn extract(raw: &Value) -> ExtractedEvent {
    extract_at(raw, Utc::now())
}

/// Same as [`extract`] but with the clock used for a missing `eventTime`
/// supplied by the caller.
pub fn extract_at(raw: &Value, now: DateTime<Utc>) -> ExtractedEvent {
    let detail = object_field(Some(raw), "detail");
    let request = object_field(detail, "requestParameters");
    let identity = object_field(detail, "userIdentity");

    let key = str_field(request, "key")
        .or_else(|| str_field(object_field(request, "object"), "key"))
        .map(decode_object_key)
        .filter(|key| !key.is_empty());

    let event_time = match str_field(detail, "eventTime") {
        Some(time) => time.to_string(),
        None => now.format(EVENT_TIME_FORMAT).to_string(),
    };

    ExtractedEvent {
        event_name: owned_or(str_field(detail, "eventName"), DEFAULT_EVENT_NAME),
        event_source: owned_or(str_field(detail, "eventSource"), DEFAULT_EVENT_SOURCE),
        account_id: owned_or(str_field(detail, "recipientAccountId"), ""),
        event_time,
        bucket: str_field(request, "bucketName").map(str::to_string),
        key,
        source_ip: str_field(detail, "sourceIPAddress").map(str::to_string),
        user_agent: owned_or(str_field(detail, "userAgent"), "-"),
        identity_type: owned_or(str_field(identity, "type"), "-"),
        identity_arn: str_field(identity, "arn").map(str::to_string),
        access_key_id: str_field(identity, "accessKeyId").map(str::to_string),
    }
}
