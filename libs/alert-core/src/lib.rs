//! Turns a CloudTrail `GetObject` event into a masked Slack alert.
//!
//! The pipeline is extract -> classify -> redact + format. Nothing in here
//! does I/O or reads the environment; configuration comes in as a
//! [`NotifyConfig`] built once by the caller.

pub mod classifier;
pub mod config;
pub mod event;
pub mod message;
pub mod redaction;

use chrono::{DateTime, Utc};
use serde_json::Value;

pub use classifier::{Caller, Classification, Principal, classify};
pub use config::NotifyConfig;
pub use event::{ExtractedEvent, extract, extract_at};
pub use message::{Alert, format_alert};
pub use redaction::RedactionPolicy;

pub fn build_alert(raw: &Value, config: &NotifyConfig) -> Alert {
    build_alert_at(raw, config, Utc::now())
}

pub fn build_alert_at(raw: &Value, config: &NotifyConfig, now: DateTime<Utc>) -> Alert {
    let event = extract_at(raw, now);

    let principal = Principal {
        identity_type: Some(event.identity_type.as_str()),
        arn: event.identity_arn.as_deref(),
    };
    let classification = classify(&principal, &event.user_agent, config);

    tracing::debug!(
        "Classified {} on {:?} as {:?} (rule: {:?})",
        event.event_name,
        event.bucket,
        classification.caller,
        classification.rule
    );

    format_alert(&event, &classification, config)
}
